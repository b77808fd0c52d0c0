//! `database.json`: the list of backing database descriptors
//! the DB executor (component J) turns into one pool each.

use serde::Deserialize;

use crate::db::key::{DbKey, DbKind};

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub databases: Vec<DatabaseDescriptor>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DatabaseDescriptor {
    #[serde(rename = "type")]
    pub kind: DbKind,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PoolConfig {
    #[serde(default = "default_enable")]
    pub enable: bool,
    #[serde(default = "default_size")]
    pub size: u16,
}

fn default_enable() -> bool {
    true
}

fn default_size() -> u16 {
    10
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            enable: default_enable(),
            size: default_size(),
        }
    }
}

impl DatabaseDescriptor {
    pub fn key(&self) -> DbKey {
        match self.kind {
            DbKind::Mysql => DbKey::mysql(&self.host, self.port, &self.database),
            DbKind::Sqlite => DbKey::sqlite(&self.path),
        }
    }

    /// `pool.enable=false` forces a single-connection pool.
    pub fn pool_size(&self) -> usize {
        if self.pool.enable {
            self.pool.size.max(1) as usize
        } else {
            1
        }
    }
}
