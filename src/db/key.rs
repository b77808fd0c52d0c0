//! `DBKey`: `{type, ident}` identifying one backend pool. Equality is
//! component-wise, so it doubles as the executor's map key directly.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbKind {
    Mysql,
    Sqlite,
}

impl std::fmt::Display for DbKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbKind::Mysql => write!(f, "mysql"),
            DbKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// `ident` is `host:port/db` for network backends or a filesystem path for
/// file-backed ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DbKey {
    pub kind: DbKind,
    pub ident: String,
}

impl DbKey {
    pub fn new(kind: DbKind, ident: impl Into<String>) -> Self {
        Self {
            kind,
            ident: ident.into(),
        }
    }

    pub fn mysql(host: &str, port: u16, database: &str) -> Self {
        Self::new(DbKind::Mysql, format!("{host}:{port}/{database}"))
    }

    pub fn sqlite(path: &str) -> Self {
        Self::new(DbKind::Sqlite, path.to_string())
    }
}

impl std::fmt::Display for DbKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.ident)
    }
}
