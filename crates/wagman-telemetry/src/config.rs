use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use wagman_client::transport::{LinkConfig, DEFAULT_BAUD, DEFAULT_DEVICE};

use crate::DEFAULT_MAX_ATTEMPTS;

/// Poller settings, usually read from a YAML file. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub device: String,
    pub baud: u32,
    /// Per-line read timeout; `null` waits forever.
    pub read_timeout_ms: Option<u64>,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud: DEFAULT_BAUD,
            read_timeout_ms: Some(5000),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: 0,
        }
    }
}

impl PollerConfig {
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig::new(self.device.clone())
            .with_baud(self.baud)
            .with_read_timeout(self.read_timeout_ms.map(Duration::from_millis))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<PollerConfig> {
    let path = path.as_ref();
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading config: {}", path.display()))?;
    let cfg: PollerConfig =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing yaml: {}", path.display()))?;
    anyhow::ensure!(cfg.baud > 0, "baud must be positive in {}", path.display());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> anyhow::Result<tempfile::NamedTempFile> {
        let mut f = tempfile::NamedTempFile::new()?;
        f.write_all(contents.as_bytes())?;
        Ok(f)
    }

    #[test]
    fn partial_file_keeps_defaults() -> anyhow::Result<()> {
        let f = write_temp("device: /dev/ttyACM1\nmax_attempts: 3\n")?;
        let cfg = load_config(f.path())?;
        assert_eq!(cfg.device, "/dev/ttyACM1");
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.baud, 115_200);
        assert_eq!(cfg.read_timeout_ms, Some(5000));
        Ok(())
    }

    #[test]
    fn null_timeout_blocks_forever() -> anyhow::Result<()> {
        let f = write_temp("read_timeout_ms: null\n")?;
        let cfg = load_config(f.path())?;
        assert_eq!(cfg.link_config().read_timeout, None);
        Ok(())
    }

    #[test]
    fn link_config_carries_device_settings() {
        let cfg = PollerConfig {
            baud: 57_600,
            read_timeout_ms: Some(250),
            ..PollerConfig::default()
        };
        let link = cfg.link_config();
        assert_eq!(link.device, "/dev/waggle_sysmon");
        assert_eq!(link.baud, 57_600);
        assert_eq!(link.read_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn bad_files_are_reported_with_path() -> anyhow::Result<()> {
        let f = write_temp("baud: [1, 2]\n")?;
        let err = load_config(f.path()).err().map(|e| e.to_string());
        assert!(err.is_some_and(|m| m.starts_with("parsing yaml")));
        assert!(load_config("/nonexistent/wagman.yaml").is_err());
        let zero = write_temp("baud: 0\n")?;
        assert!(load_config(zero.path()).is_err());
        Ok(())
    }
}
