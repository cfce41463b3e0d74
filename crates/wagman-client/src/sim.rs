//! In-process wagman stand-in that speaks the framed protocol.
//!
//! Backs the CLI's mock backend so the tools can be exercised without a controller attached.

use crate::{FOOTER_PREFIX, HEADER_PREFIX};
use std::time::Instant;
use time::OffsetDateTime;
use wagman_transport::{MockDevice, MockReply};

const COMMANDS: &[&str] = &[
    "start", "stop", "stop!", "info", "eedump", "date", "cu", "hb", "therm", "help", "id", "ver",
    "up", "th", "fc", "bs",
];

/// Wrap body lines in a header/footer pair the way the firmware does.
pub fn framed<I, S>(command: &str, body: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut lines = vec![format!("{HEADER_PREFIX} cmd={command}")];
    lines.extend(body.into_iter().map(Into::into));
    lines.push(FOOTER_PREFIX.to_string());
    lines
}

/// A mock device answering the commands the tooling uses with plausible values.
pub fn simulated_wagman() -> MockDevice {
    let booted = Instant::now();
    MockDevice::new(move |request| {
        let mut tokens = request.split_whitespace();
        let name = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();
        let body: Vec<String> = match (name, args.as_slice()) {
            ("id", []) => vec!["0000001E0610BA8B".into()],
            ("ver", []) => vec!["hw 3 1".into(), "fw 4   0   2".into()],
            ("up", []) => vec![booted.elapsed().as_secs().to_string()],
            ("date", []) => {
                let now = OffsetDateTime::now_utc();
                vec![format!(
                    "{} {} {} {} {} {}",
                    now.year(),
                    u8::from(now.month()),
                    now.day(),
                    now.hour(),
                    now.minute(),
                    now.second()
                )]
            }
            ("date", [_, _, _, _, _, _]) => Vec::new(),
            ("cu", []) => vec!["120   315  280".into(), "0 0 0".into()],
            ("th" | "therm", []) => vec!["0 0 0 0 0".into()],
            ("hb", []) => vec!["5000 4200".into(), "0  0".into()],
            ("fc", []) => vec!["0 0 0 0 0".into()],
            ("bs", [slot]) => match *slot {
                "0" => vec!["sd ok".into()],
                "1" => vec!["emmc ok".into()],
                _ => vec![format!("invalid slot {slot}")],
            },
            ("start" | "stop" | "stop!", [port]) => vec![format!("{name} {port} ok")],
            ("info", []) => vec!["simulated wagman".into()],
            ("help", []) => COMMANDS.iter().map(|c| c.to_string()).collect(),
            _ => return MockReply::lines([format!("invalid command: {request}")]),
        };
        MockReply::Lines(framed(name, body))
    })
}
