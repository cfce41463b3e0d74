use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use comfy_table::{presets, Table};
use time::OffsetDateTime;
use tracing::{error, info};

use wagman_client::{help_rows, sim, Command, CommandClient, UsageTable};
use wagman_telemetry::{load_config, MetricsHub, PollState, Poller, PollerConfig, TracingSink};
use wagman_transport::{Connector, SerialConnector, SerialLink};

#[derive(Parser, Debug)]
#[command(
    name = "wagman",
    version,
    about = "Wagman power controller client",
    disable_help_subcommand = true
)]
struct Cli {
    /// Link backend
    #[arg(long, value_enum, default_value_t = Backend::Serial, global = true)]
    backend: Backend,
    /// YAML config file (device, baud, timeout, attempts)
    #[arg(long, global = true)]
    config: Option<String>,
    /// Serial device path (overrides config)
    #[arg(long, global = true)]
    device: Option<String>,
    /// Baud rate (overrides config)
    #[arg(long, global = true)]
    baud: Option<u32>,
    /// Per-line read timeout in milliseconds; 0 waits forever
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Backend {
    Serial,
    Mock,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a command (e.g. `call stop! 3`) and print the reply body
    Call {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Show the device's commands with their usage
    #[command(alias = "?")]
    Help,
    /// Poll telemetry and log one record
    Log {
        /// Also print the record as JSON on stdout
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
        /// Print poll metrics (Prometheus text format) when done
        #[arg(long, action = ArgAction::SetTrue)]
        metrics: bool,
        /// Attempt budget (overrides config)
        #[arg(long)]
        max_attempts: Option<u32>,
    },
    /// Set the device RTC to the host's UTC time
    SyncDate,
    /// List serial ports
    Ports,
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    if let Commands::Ports = cli.command {
        return list_ports();
    }
    let cfg = resolve_config(&cli)?;
    match cli.backend {
        Backend::Serial => {
            let client = CommandClient::new(SerialConnector::new(cfg.link_config()));
            dispatch(client, &cli.command, &cfg)
        }
        Backend::Mock => dispatch(CommandClient::new(sim::simulated_wagman()), &cli.command, &cfg),
    }
}

fn setup_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,wagman=info"));
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn resolve_config(cli: &Cli) -> Result<PollerConfig> {
    let mut cfg = match &cli.config {
        Some(path) => load_config(path)?,
        None => PollerConfig::default(),
    };
    if let Some(device) = &cli.device {
        cfg.device = device.clone();
    }
    if let Some(baud) = cli.baud {
        cfg.baud = baud;
    }
    if let Some(ms) = cli.timeout_ms {
        cfg.read_timeout_ms = (ms > 0).then_some(ms);
    }
    if let Commands::Log {
        max_attempts: Some(n),
        ..
    } = cli.command
    {
        cfg.max_attempts = n;
    }
    Ok(cfg)
}

fn dispatch<C: Connector>(
    client: CommandClient<C>,
    command: &Commands,
    cfg: &PollerConfig,
) -> Result<()> {
    match command {
        Commands::Call { words } => call(&client, words),
        Commands::Help => help(&client),
        Commands::Log { json, metrics, .. } => log(client, cfg, *json, *metrics),
        Commands::SyncDate => sync_date(&client),
        Commands::Ports => list_ports(),
    }
}

fn call<C: Connector>(client: &CommandClient<C>, words: &[String]) -> Result<()> {
    let (name, args) = words
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("no command given"))?;
    let cmd = Command::with_args(name.clone(), args.iter().cloned());
    for line in client.invoke(&cmd)? {
        println!("{}", line?);
    }
    Ok(())
}

fn help<C: Connector>(client: &CommandClient<C>) -> Result<()> {
    let rows = help_rows(client, &UsageTable::builtin())?;
    let mut table = Table::new();
    table
        .load_preset(presets::ASCII_FULL)
        .set_header(vec!["syntax", "description"]);
    for row in rows {
        table.add_row(vec![row.syntax, row.description]);
    }
    println!("{table}");
    Ok(())
}

fn log<C: Connector>(
    client: CommandClient<C>,
    cfg: &PollerConfig,
    json: bool,
    print_metrics: bool,
) -> Result<()> {
    let hub = MetricsHub::new().map_err(anyhow::Error::msg)?;
    let mut poller = Poller::new(client, TracingSink)
        .with_max_attempts(cfg.max_attempts)
        .with_retry_delay(cfg.retry_delay())
        .with_metrics(hub.clone());
    match poller.run() {
        PollState::Done(record) => {
            if json {
                println!("{}", serde_json::to_string(record)?);
            }
        }
        PollState::GaveUp => {
            error!(
                attempts = cfg.max_attempts,
                "no telemetry record after exhausting attempts"
            );
        }
        PollState::Attempting(_) => {}
    }
    if print_metrics {
        print!("{}", hub.encode_text());
    }
    Ok(())
}

fn sync_date<C: Connector>(client: &CommandClient<C>) -> Result<()> {
    let now = OffsetDateTime::now_utc();
    let cmd = Command::set_date(now);
    for line in client.call(&cmd)? {
        println!("{line}");
    }
    info!(request = %cmd, "device clock set");
    Ok(())
}

fn list_ports() -> Result<()> {
    for port in SerialLink::list()? {
        println!("{}\t{}", port.name, port.driver);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn call_keeps_bang_commands_and_args() {
        let cli = Cli::try_parse_from(["wagman", "call", "stop!", "3"]).unwrap();
        match cli.command {
            Commands::Call { words } => assert_eq!(words, vec!["stop!", "3"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn flags_override_config_defaults() {
        let cli = Cli::try_parse_from([
            "wagman",
            "--device",
            "/dev/ttyACM0",
            "--timeout-ms",
            "0",
            "log",
            "--max-attempts",
            "3",
        ])
        .unwrap();
        let cfg = resolve_config(&cli).unwrap();
        assert_eq!(cfg.device, "/dev/ttyACM0");
        assert_eq!(cfg.read_timeout_ms, None);
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.baud, 115_200);
    }

    #[test]
    fn mock_backend_round_trip() {
        let client = CommandClient::new(sim::simulated_wagman());
        assert!(call(&client, &["id".to_string()]).is_ok());
        assert!(help(&client).is_ok());
        let cfg = PollerConfig::default();
        assert!(log(client, &cfg, false, false).is_ok());
    }
}
