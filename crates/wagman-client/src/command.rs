use crate::ProtocolError;
use core::fmt;
use time::OffsetDateTime;

/// A wagman command: a name token plus positional argument tokens.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Command {
    name: String,
    args: Vec<String>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn with_args<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a user-typed line on whitespace: first token is the command name.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let mut tokens = line.split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| ProtocolError::InvalidRequest("empty command".to_string()))?;
        Ok(Self::with_args(name, tokens))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Tokens joined by single spaces, without the line terminator.
    pub fn request_line(&self) -> Result<String, ProtocolError> {
        validate_token(&self.name)?;
        for a in &self.args {
            validate_token(a)?;
        }
        Ok(self.to_string())
    }

    /// `start <port>`: power up the device on a port.
    pub fn start(port: u8) -> Self {
        Self::new("start").arg(port)
    }

    /// `stop <port>`: graceful shutdown of the device on a port.
    pub fn stop(port: u8) -> Self {
        Self::new("stop").arg(port)
    }

    /// `stop! <port>`: cut power immediately.
    pub fn kill(port: u8) -> Self {
        Self::new("stop!").arg(port)
    }

    /// `bs <slot>`: boot media status for slot 0 (SD) or 1 (eMMC).
    pub fn boot_status(slot: u8) -> Self {
        Self::new("bs").arg(slot)
    }

    /// `date <year> <month> <day> <hour> <minute> <second>`: set the RTC.
    pub fn set_date(ts: OffsetDateTime) -> Self {
        Self::new("date")
            .arg(ts.year())
            .arg(u8::from(ts.month()))
            .arg(ts.day())
            .arg(ts.hour())
            .arg(ts.minute())
            .arg(ts.second())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

fn validate_token(token: &str) -> Result<(), ProtocolError> {
    if token.is_empty() {
        return Err(ProtocolError::InvalidRequest("empty token".to_string()));
    }
    if !token.chars().all(|c| c.is_ascii_graphic()) {
        return Err(ProtocolError::InvalidRequest(format!(
            "token {token:?} must be printable ASCII without whitespace"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month};

    #[test]
    fn request_line_joins_tokens_with_single_spaces() {
        let cmd = Command::boot_status(1);
        assert_eq!(cmd.request_line(), Ok("bs 1".to_string()));
        assert_eq!(Command::new("id").request_line(), Ok("id".to_string()));
    }

    #[test]
    fn parse_collapses_whitespace() {
        let cmd = Command::parse("  stop!   3 ").unwrap();
        assert_eq!(cmd.name(), "stop!");
        assert_eq!(cmd.args(), ["3".to_string()]);
        assert_eq!(cmd, Command::kill(3));
        assert!(Command::parse("   ").is_err());
    }

    #[test]
    fn tokens_with_newlines_or_non_ascii_are_rejected() {
        let bad = [
            Command::new("id\n"),
            Command::new("date").arg("2024 01"),
            Command::new("cu").arg(""),
            Command::new("thérm"),
        ];
        for cmd in bad {
            assert!(
                matches!(cmd.request_line(), Err(ProtocolError::InvalidRequest(_))),
                "{cmd:?} accepted"
            );
        }
    }

    #[test]
    fn set_date_spells_out_fields() -> Result<(), Box<dyn std::error::Error>> {
        let ts = Date::from_calendar_date(2024, Month::March, 7)?
            .with_hms(9, 5, 0)?
            .assume_utc();
        let cmd = Command::set_date(ts);
        assert_eq!(cmd.request_line(), Ok("date 2024 3 7 9 5 0".to_string()));
        Ok(())
    }
}
