//! Configuration types for tierio clients
//!
//! ```toml
//! data_timeout_ms = 1000
//! wait_bound = "data_timeout"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default data-path timeout (milliseconds)
pub const DEFAULT_DATA_TIMEOUT_MS: u64 = 1000;

/// Client-side settings for the metadata path
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Data-path timeout applied to bounded waits on raw replies
    pub data_timeout_ms: u64,
    /// Which bound a timed wait actually uses
    pub wait_bound: WaitBound,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_timeout_ms: DEFAULT_DATA_TIMEOUT_MS,
            wait_bound: WaitBound::default(),
        }
    }
}

/// Bound used by `await_result_with_timeout`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitBound {
    /// Always wait for the configured data timeout, ignoring the caller
    #[default]
    DataTimeout,
    /// Wait for the duration the caller asked for
    Caller,
}

impl ClientConfig {
    /// Configured data-path timeout
    #[must_use]
    pub const fn data_timeout(&self) -> Duration {
        Duration::from_millis(self.data_timeout_ms)
    }

    /// Resolve the wait bound for a caller-supplied duration
    #[must_use]
    pub const fn wait_timeout(&self, requested: Duration) -> Duration {
        match self.wait_bound {
            WaitBound::DataTimeout => self.data_timeout(),
            WaitBound::Caller => requested,
        }
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Configuration(e.to_string()))
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Configuration(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.data_timeout(), Duration::from_secs(1));
        assert_eq!(config.wait_bound, WaitBound::DataTimeout);
    }

    #[test]
    fn test_wait_timeout_policy() {
        let mut config = ClientConfig::default();
        let requested = Duration::from_millis(5);
        assert_eq!(config.wait_timeout(requested), Duration::from_millis(1000));

        config.wait_bound = WaitBound::Caller;
        assert_eq!(config.wait_timeout(requested), requested);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ClientConfig::from_toml_str("wait_bound = \"caller\"").unwrap();
        assert_eq!(config.wait_bound, WaitBound::Caller);
        assert_eq!(config.data_timeout_ms, DEFAULT_DATA_TIMEOUT_MS);

        assert!(matches!(
            ClientConfig::from_toml_str("wait_bound = \"forever\""),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_timeout_ms = 250").unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.data_timeout(), Duration::from_millis(250));

        assert!(ClientConfig::load("/nonexistent/tierio.toml").is_err());
    }
}
