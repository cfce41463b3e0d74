use crate::Result;

/// A minimal blocking, newline-delimited text link.
pub trait LineTransport {
    /// Write one line. The transport appends the `\n` terminator.
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Read one line without its terminator.
    ///
    /// Blocks until a full line arrives, the link's read timeout elapses
    /// ([`TransportError::Timeout`](crate::TransportError::Timeout)) or the remote end goes away
    /// ([`TransportError::Disconnected`](crate::TransportError::Disconnected)).
    fn read_line(&mut self) -> Result<String>;
}

/// Opens a fresh link for every request. Dropping the link closes it.
pub trait Connector {
    type Link: LineTransport;

    fn connect(&self) -> Result<Self::Link>;

    /// Human-readable target, used in logs.
    fn describe(&self) -> String;
}
