//! `server.json`: port, reactor thread pool size, log path.

use serde::Deserialize;

/// Valid TCP port range for the listener; outside this range the configured
/// value is rejected and the default port is used instead.
const PORT_RANGE: std::ops::RangeInclusive<u16> = 1024..=65535;

pub const DEFAULT_PORT: u16 = 19998;
pub const DEFAULT_LOG_PATH: &str = "./server.log";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerConfigFile {
    pub port: Option<u16>,
    pub thread_pool_size: Option<u16>,
    pub log_path: Option<String>,
}

/// Validated, defaulted view of `server.json`. Constructed by `validate()`,
/// never deserialized directly, so every field is guaranteed in-range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Raw configured thread pool size; clamping against hardware
    /// concurrency happens in `net::reactor::worker_count`, not here, since
    /// the hardware figure is a runtime property, not a config concern.
    pub thread_pool_size: u16,
    pub log_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            thread_pool_size: 0,
            log_path: DEFAULT_LOG_PATH.to_string(),
        }
    }
}

impl ServerConfigFile {
    /// Validates and clamps raw file contents into a `ServerConfig`,
    /// logging a WARN and falling back to the default for any field out of
    /// range.
    pub fn validate(self) -> ServerConfig {
        let mut config = ServerConfig::default();

        if let Some(port) = self.port {
            if PORT_RANGE.contains(&port) {
                config.port = port;
            } else {
                tracing::warn!(port, "configured port out of range, falling back to default");
            }
        }

        if let Some(thread_pool_size) = self.thread_pool_size {
            config.thread_pool_size = thread_pool_size;
        }

        if let Some(log_path) = self.log_path {
            config.log_path = log_path;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_port_falls_back_to_default() {
        let file = ServerConfigFile {
            port: Some(80),
            thread_pool_size: None,
            log_path: None,
        };
        assert_eq!(file.validate().port, DEFAULT_PORT);
    }

    #[test]
    fn in_range_port_is_kept() {
        let file = ServerConfigFile {
            port: Some(20000),
            thread_pool_size: None,
            log_path: None,
        };
        assert_eq!(file.validate().port, 20000);
    }

    #[test]
    fn missing_file_fields_use_defaults() {
        let file = ServerConfigFile {
            port: None,
            thread_pool_size: None,
            log_path: None,
        };
        assert_eq!(file.validate(), ServerConfig::default());
    }
}
