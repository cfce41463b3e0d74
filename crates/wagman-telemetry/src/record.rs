use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use wagman_client::transport::Connector;
use wagman_client::{compact, Command, CommandClient};

/// Keys of the rendered record, in output order.
pub const FIELD_ORDER: [&str; 9] = [
    "id",
    "version",
    "uptime",
    "date",
    "current",
    "therm",
    "heartbeat",
    "fails",
    "media",
];

/// One complete telemetry snapshot. Only ever built when every field was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub id: String,
    pub version: String,
    pub uptime: String,
    pub date: String,
    pub current: String,
    pub therm: String,
    pub heartbeat: String,
    pub fails: String,
    pub media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

impl TelemetryRecord {
    /// `(key, value)` pairs in [`FIELD_ORDER`].
    pub fn fields(&self) -> [(&'static str, &str); 9] {
        [
            ("id", self.id.as_str()),
            ("version", self.version.as_str()),
            ("uptime", self.uptime.as_str()),
            ("date", self.date.as_str()),
            ("current", self.current.as_str()),
            ("therm", self.therm.as_str()),
            ("heartbeat", self.heartbeat.as_str()),
            ("fails", self.fails.as_str()),
            ("media", self.media.as_str()),
        ]
    }

    /// One `key=value` line per field.
    pub fn render(&self) -> String {
        self.fields()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Clone, Copy, Debug)]
enum Shape {
    Joined,
    Lowercase,
    Compact,
}

fn fetch<C: Connector>(
    client: &CommandClient<C>,
    commands: &[Command],
    shape: Shape,
) -> wagman_client::Result<String> {
    let mut parts = Vec::with_capacity(commands.len());
    for cmd in commands {
        let body = client.call(cmd)?.join(" ");
        let value = match shape {
            Shape::Joined => body.trim().to_string(),
            Shape::Lowercase => body.trim().to_lowercase(),
            Shape::Compact => compact(&body),
        };
        parts.push(value);
    }
    Ok(parts.join(" "))
}

/// Run one full pass over the telemetry commands.
///
/// Commands are issued strictly in order, each frame closed before the next request. The first
/// failure aborts the pass and nothing fetched so far survives.
pub fn fetch_record<C: Connector>(
    client: &CommandClient<C>,
) -> wagman_client::Result<TelemetryRecord> {
    Ok(TelemetryRecord {
        id: fetch(client, &[Command::new("id")], Shape::Lowercase)?,
        version: fetch(client, &[Command::new("ver")], Shape::Compact)?,
        uptime: fetch(client, &[Command::new("up")], Shape::Joined)?,
        date: fetch(client, &[Command::new("date")], Shape::Joined)?,
        current: fetch(client, &[Command::new("cu")], Shape::Compact)?,
        therm: fetch(client, &[Command::new("th")], Shape::Compact)?,
        heartbeat: fetch(client, &[Command::new("hb")], Shape::Compact)?,
        fails: fetch(client, &[Command::new("fc")], Shape::Compact)?,
        media: fetch(
            client,
            &[Command::boot_status(0), Command::boot_status(1)],
            Shape::Joined,
        )?,
        ts: OffsetDateTime::now_utc().format(&Rfc3339).ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::healthy_reply;
    use wagman_client::transport::{MockDevice, MockReply};

    #[test]
    fn record_fields_follow_command_transforms() -> anyhow::Result<()> {
        let dev = MockDevice::new(healthy_reply);
        let rec = fetch_record(&CommandClient::new(dev.clone()))?;
        assert_eq!(rec.id, "wagman01");
        assert_eq!(rec.version, "hw 3 1 fw 4 0 2");
        assert_eq!(rec.uptime, "86400");
        assert_eq!(rec.date, "2024 3 7 9 5 0");
        assert_eq!(rec.current, "120 315 280");
        assert_eq!(rec.therm, "1 2 3");
        assert_eq!(rec.heartbeat, "5000 4200");
        assert_eq!(rec.fails, "0 0 0");
        assert_eq!(rec.media, "OK FAIL");
        assert!(rec.ts.is_some());
        assert_eq!(
            dev.requests(),
            vec!["id", "ver", "up", "date", "cu", "th", "hb", "fc", "bs 0", "bs 1"]
        );
        assert_eq!(dev.open_links(), 0);
        Ok(())
    }

    #[test]
    fn failure_stops_the_pass() {
        let dev = MockDevice::new(|req| match req {
            "cu" => MockReply::Silent,
            other => healthy_reply(other),
        });
        assert!(fetch_record(&CommandClient::new(dev.clone())).is_err());
        assert_eq!(dev.requests(), vec!["id", "ver", "up", "date", "cu"]);
        assert_eq!(dev.open_links(), 0);
    }

    #[test]
    fn render_uses_fixed_key_order() -> anyhow::Result<()> {
        let rec = fetch_record(&CommandClient::new(MockDevice::new(healthy_reply)))?;
        let rendered = rec.render();
        let keys: Vec<_> = rendered
            .lines()
            .filter_map(|l| l.split_once('=').map(|(k, _)| k))
            .collect();
        assert_eq!(keys, FIELD_ORDER);
        assert!(rendered.starts_with("id=wagman01\nversion=hw 3 1 fw 4 0 2\n"));
        assert!(rendered.ends_with("\nmedia=OK FAIL"));
        Ok(())
    }

    #[test]
    fn json_skips_missing_timestamp() -> anyhow::Result<()> {
        let mut rec = fetch_record(&CommandClient::new(MockDevice::new(healthy_reply)))?;
        rec.ts = None;
        let json = serde_json::to_value(&rec)?;
        assert_eq!(json["media"], "OK FAIL");
        assert!(json.get("ts").is_none());
        Ok(())
    }
}
