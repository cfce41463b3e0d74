use crate::{Connector, LineTransport, LinkConfig, PortInfo, Result, TransportError};
use serialport::{ClearBuffer, DataBits, ErrorKind, Parity, SerialPort, SerialPortType, StopBits};
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// Per-read poll interval when no read timeout is configured.
const IDLE_POLL: Duration = Duration::from_secs(1);

/// Text link over a serial tty (the wagman's USB CDC port)
pub struct SerialLink {
    device: String,
    port: Box<dyn SerialPort>,
    pending: Vec<u8>,
    read_timeout: Option<Duration>,
}

impl SerialLink {
    pub fn open(config: &LinkConfig) -> Result<Self> {
        let port = serialport::new(&config.device, config.baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(config.read_timeout.unwrap_or(IDLE_POLL))
            .open()
            .map_err(|e| map_open_error(&config.device, e))?;
        // Bytes left over from an abandoned exchange must not leak into this one
        if let Err(e) = port.clear(ClearBuffer::Input) {
            tracing::debug!(device = %config.device, error = %e, "could not clear input buffer");
        }
        tracing::debug!(device = %config.device, baud = config.baud, "serial link opened");
        Ok(Self {
            device: config.device.clone(),
            port,
            pending: Vec::with_capacity(128),
            read_timeout: config.read_timeout,
        })
    }

    pub fn list() -> Result<Vec<PortInfo>> {
        let mut out = Vec::new();
        for p in serialport::available_ports().map_err(|e| TransportError::Io(e.to_string()))? {
            let driver = match p.port_type {
                SerialPortType::UsbPort(_) => "usb-serial",
                SerialPortType::PciPort => "pci-serial",
                SerialPortType::BluetoothPort => "bluetooth",
                SerialPortType::Unknown => "serial",
            };
            out.push(PortInfo {
                name: p.port_name,
                driver: driver.to_string(),
            });
        }
        Ok(out)
    }

    fn take_line(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        let raw = self.pending.drain(..=pos).collect::<Vec<u8>>();
        // Drop terminator
        let line = &raw[..raw.len().saturating_sub(1)];
        Some(String::from_utf8_lossy(line).into_owned())
    }
}

impl LineTransport for SerialLink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        let mut out = Vec::with_capacity(line.len() + 1);
        out.extend_from_slice(line.as_bytes());
        out.push(b'\n');
        self.port
            .write_all(&out)
            .and_then(|_| self.port.flush())
            .map_err(|e| TransportError::Io(e.to_string()))?;
        tracing::trace!(device = %self.device, line, "tx");
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let deadline = self.read_timeout.map(|t| Instant::now() + t);
        let mut buf = [0u8; 128];
        loop {
            if let Some(line) = self.take_line() {
                tracing::trace!(device = %self.device, line = %line, "rx");
                return Ok(line);
            }
            match self.port.read(&mut buf) {
                Ok(0) => return Err(TransportError::Disconnected),
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    return Err(TransportError::Disconnected)
                }
                Err(e) => return Err(TransportError::Io(e.to_string())),
            }
            // A device trickling bytes without a newline still times out
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(TransportError::Timeout);
            }
        }
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        tracing::debug!(device = %self.device, "serial link closed");
    }
}

fn map_open_error(device: &str, e: serialport::Error) -> TransportError {
    match e.kind() {
        ErrorKind::NoDevice | ErrorKind::Io(io::ErrorKind::NotFound) => {
            TransportError::DeviceNotFound(device.to_string())
        }
        _ => TransportError::Io(format!("{device}: {e}")),
    }
}

/// Opens a new [`SerialLink`] per request from a fixed [`LinkConfig`].
#[derive(Clone, Debug)]
pub struct SerialConnector {
    config: LinkConfig,
}

impl SerialConnector {
    pub fn new(config: LinkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}

impl Connector for SerialConnector {
    type Link = SerialLink;

    fn connect(&self) -> Result<SerialLink> {
        SerialLink::open(&self.config)
    }

    fn describe(&self) -> String {
        format!("{}@{}", self.config.device, self.config.baud)
    }
}
