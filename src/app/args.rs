//! CLI surface. The business logic takes no flags — that's
//! true of the protocol and services, but locating config and tuning
//! logging still need a minimal, `clap`-derived surface.

use clap::{Parser, ValueEnum};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory `server.json`/`database.json` are read from. Falls back to
    /// the directory next to the running executable (argv[0]-relative) when
    /// unset.
    #[arg(long, env)]
    pub config_dir: Option<String>,

    #[arg(short, long, default_value_t = Level::INFO, env)]
    pub log_level: Level,

    #[arg(short = 'F', long, value_enum, default_value_t = LogFormat::Text, env)]
    pub log_format: LogFormat,

    #[arg(long, default_value_t = false, env, help = "disable colors in the log output")]
    pub no_color: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogFormat {
    Text,
    Structured,
    Debug,
}

pub fn parse() -> Args {
    Args::parse()
}
