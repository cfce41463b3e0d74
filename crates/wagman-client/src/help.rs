//! Usage table for the `help` command.
//!
//! The device answers `help` with one command keyword per line. Keywords are looked up in a
//! static syntax/description table; keywords the table does not know are shown with their
//! bare name and an empty description.

use crate::{Command, CommandClient, Result};
use std::collections::BTreeMap;
use wagman_transport::Connector;

const BUILTIN: &[(&str, &[(&str, &str)])] = &[
    ("start", &[("start <portnum>", "starts device on portnum")]),
    ("stop", &[("stop <portnum>", "stops device on portnum")]),
    (
        "stop!",
        &[("stop! <portnum>", "immediately kills power to device on portnum")],
    ),
    ("info", &[("info", "prints some system info")]),
    ("eedump", &[("eedump", "prints a hex dump of all EEPROM")]),
    (
        "date",
        &[
            ("date", "shows rtc date and time"),
            (
                "date <year> <month> <day> <hour> <minute> <second>",
                "sets rtc date and time",
            ),
        ],
    ),
    ("cu", &[("cu", "current usage")]),
    ("hb", &[("hb", "last heartbeat times")]),
    (
        "therm",
        &[(
            "therm",
            "thermistor values (though none are connected right now)",
        )],
    ),
    ("help", &[("help", "lists available commands")]),
];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UsageRow {
    pub syntax: String,
    pub description: String,
}

impl UsageRow {
    pub fn new(syntax: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            syntax: syntax.into(),
            description: description.into(),
        }
    }
}

/// Command keyword → one or more usage rows.
#[derive(Clone, Debug, Default)]
pub struct UsageTable {
    entries: BTreeMap<String, Vec<UsageRow>>,
}

impl UsageTable {
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for (keyword, rows) in BUILTIN {
            for (syntax, description) in rows.iter() {
                table.insert(*keyword, UsageRow::new(*syntax, *description));
            }
        }
        table
    }

    /// Append a row for `keyword`.
    pub fn insert(&mut self, keyword: impl Into<String>, row: UsageRow) {
        self.entries.entry(keyword.into()).or_default().push(row);
    }

    pub fn lookup(&self, keyword: &str) -> Option<&[UsageRow]> {
        self.entries.get(keyword).map(Vec::as_slice)
    }

    /// Rows for one keyword, falling back to `(keyword, "")`.
    pub fn rows_for(&self, keyword: &str) -> Vec<UsageRow> {
        match self.lookup(keyword) {
            Some(rows) => rows.to_vec(),
            None => vec![UsageRow::new(keyword, "")],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ask the device for its command list and expand it through `table`.
///
/// Blank lines in the reply are skipped.
pub fn help_rows<C: Connector>(
    client: &CommandClient<C>,
    table: &UsageTable,
) -> Result<Vec<UsageRow>> {
    let mut rows = Vec::new();
    for keyword in client.invoke(&Command::new("help"))? {
        let keyword = keyword?;
        if keyword.is_empty() {
            continue;
        }
        rows.extend(table.rows_for(&keyword));
    }
    Ok(rows)
}
