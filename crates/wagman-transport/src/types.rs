use std::time::Duration;

/// Device node the wagman enumerates as on a node controller.
pub const DEFAULT_DEVICE: &str = "/dev/waggle_sysmon";
pub const DEFAULT_BAUD: u32 = 115_200;

/// Where and how to open a link. 8N1 framing is implied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkConfig {
    pub device: String,
    pub baud: u32,
    /// `None` blocks forever waiting for a line.
    pub read_timeout: Option<Duration>,
}

impl LinkConfig {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Self::default()
        }
    }

    pub fn with_baud(mut self, baud: u32) -> Self {
        self.baud = baud;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud: DEFAULT_BAUD,
            read_timeout: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PortInfo {
    pub name: String,
    pub driver: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_sysmon_node() {
        let cfg = LinkConfig::default();
        assert_eq!(cfg.device, "/dev/waggle_sysmon");
        assert_eq!(cfg.baud, 115_200);
        assert_eq!(cfg.read_timeout, None);
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = LinkConfig::new("/dev/ttyACM0")
            .with_baud(57_600)
            .with_read_timeout(Some(Duration::from_millis(250)));
        assert_eq!(cfg.device, "/dev/ttyACM0");
        assert_eq!(cfg.baud, 57_600);
        assert_eq!(cfg.read_timeout, Some(Duration::from_millis(250)));
    }
}
