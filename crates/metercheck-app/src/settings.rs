use anyhow::{Context, Result};
use metercheck_core::SerialConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM3";
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Optional overrides read from `settings.json`.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub timeout_ms: Option<u64>,
}

impl Settings {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("metercheck").join("settings.json"))
    }

    /// Loads the user's settings file, or defaults when there is none.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings = Self::parse(&text).with_context(|| format!("parsing {}", path.display()))?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Command-line values win over the file, the file over defaults.
    pub fn serial_config(
        &self,
        port: Option<String>,
        baud_rate: Option<u32>,
        timeout_ms: Option<u64>,
    ) -> SerialConfig {
        let defaults = SerialConfig::default();
        SerialConfig {
            port_name: port
                .or_else(|| self.port.clone())
                .unwrap_or_else(|| DEFAULT_PORT.to_string()),
            baud_rate: baud_rate.or(self.baud_rate).unwrap_or(defaults.baud_rate),
            timeout: timeout_ms
                .or(self.timeout_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        let cfg = Settings::parse("{}").unwrap().serial_config(None, None, None);
        assert_eq!(cfg.port_name, DEFAULT_PORT);
        assert_eq!(cfg.baud_rate, 2400);
        assert_eq!(cfg.timeout, Duration::from_secs(1));
    }

    #[test]
    fn file_overrides_defaults() {
        let settings =
            Settings::parse(r#"{ "port": "/dev/ttyS1", "baud_rate": 9600, "timeout_ms": 250 }"#).unwrap();
        let cfg = settings.serial_config(None, None, None);
        assert_eq!(cfg.port_name, "/dev/ttyS1");
        assert_eq!(cfg.baud_rate, 9600);
        assert_eq!(cfg.timeout, Duration::from_millis(250));
    }

    #[test]
    fn flags_override_file() {
        let settings = Settings::parse(r#"{ "port": "/dev/ttyS1", "baud_rate": 9600 }"#).unwrap();
        let cfg = settings.serial_config(Some("COM7".into()), Some(4800), Some(10));
        assert_eq!(cfg.port_name, "COM7");
        assert_eq!(cfg.baud_rate, 4800);
        assert_eq!(cfg.timeout, Duration::from_millis(10));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::parse(r#"{ "baud": 9600 }"#).is_err());
        assert!(Settings::parse("not json").is_err());
    }
}
