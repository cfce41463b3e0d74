use crate::{Command, Frame, Result};
use tracing::debug;
use wagman_transport::{Connector, LineTransport};

/// Synchronous command client. Every call opens its own link through the connector and
/// releases it before returning (or when the returned [`Frame`] is dropped). No retries.
pub struct CommandClient<C: Connector> {
    connector: C,
}

impl<C: Connector> CommandClient<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Send `command` and return the reply frame once its header has been read.
    pub fn invoke(&self, command: &Command) -> Result<Frame<C::Link>> {
        let request = command.request_line()?;
        let mut link = self.connector.connect()?;
        debug!(link = %self.connector.describe(), %request, "sending command");
        link.write_line(&request)?;
        Frame::open(link, command.name())
    }

    /// Send `command` and collect the whole body.
    pub fn call(&self, command: &Command) -> Result<Vec<String>> {
        self.invoke(command)?.collect()
    }
}
