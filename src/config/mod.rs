//! Configuration: two flat JSON files,
//! `server.json` and `database.json`, resolved relative to the running
//! executable's directory and exposed through a process-wide, hot-swappable
//! `ArcSwap<Config>`.
//!
//! A `Lazy<ArcSwap<Config>>` static, serde-derived structs, and
//! validation helpers run once at load time.

pub mod database;
pub mod server;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

use crate::errors::ConfigError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Globally available configuration. Swapped wholesale on a `SIGHUP`
/// reload.
static CONFIG: Lazy<ArcSwap<Config>> = Lazy::new(|| ArcSwap::from_pointee(Config::default()));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

pub fn get_config() -> Arc<Config> {
    CONFIG.load_full()
}

fn set_config(config: Config) {
    CONFIG.store(Arc::new(config));
}

/// Directory `server.json`/`database.json` are resolved relative to:
/// argv[0]'s parent directory.
pub fn config_dir() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Loads both config files from `dir`, validates them, and stores the
/// result in the process-wide `ArcSwap`. Both files are optional; a missing
/// file falls back to its documented defaults rather than failing startup.
pub async fn load(dir: &Path) -> Result<Arc<Config>, ConfigError> {
    let server = load_optional::<server::ServerConfigFile>(dir, "server.json")
        .await?
        .map(server::ServerConfigFile::validate)
        .unwrap_or_default();

    let database = load_optional::<DatabaseConfig>(dir, "database.json")
        .await?
        .unwrap_or_default();

    let config = Config { server, database };
    set_config(config);
    Ok(get_config())
}

async fn load_optional<T: serde::de::DeserializeOwned>(
    dir: &Path,
    file_name: &str,
) -> Result<Option<T>, ConfigError> {
    let path = dir.join(file_name);
    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source: err,
            })
        }
    };
    let parsed = serde_json::from_str(&contents).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        source: err,
    })?;
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(dir.path()).await.unwrap();
        assert_eq!(config.server.port, server::DEFAULT_PORT);
        assert!(config.database.databases.is_empty());
    }

    #[tokio::test]
    async fn server_json_is_parsed_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("server.json"),
            r#"{"port": 20001, "thread_pool_size": 4, "log_path": "/tmp/x.log"}"#,
        )
        .await
        .unwrap();
        let config = load(dir.path()).await.unwrap();
        assert_eq!(config.server.port, 20001);
        assert_eq!(config.server.thread_pool_size, 4);
        assert_eq!(config.server.log_path, "/tmp/x.log");
    }

    #[tokio::test]
    async fn malformed_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("server.json"), "{not json")
            .await
            .unwrap();
        assert!(load(dir.path()).await.is_err());
    }
}
