//! Structured logging init: an
//! env-filter-driven `tracing_subscriber`, level from the CLI/env, and a
//! text/json/pretty format switch. A syslog branch would have no
//! counterpart here (DESIGN.md: tied to its daemon deployment model), so
//! only the `tracing_subscriber` branch is kept.

use tracing_subscriber::EnvFilter;

use super::args::{Args, LogFormat};
use crate::config::VERSION;

pub fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level.to_string()));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(!args.no_color);

    match args.log_format {
        LogFormat::Structured => subscriber.json().init(),
        LogFormat::Debug => subscriber.pretty().init(),
        LogFormat::Text => subscriber.init(),
    }

    tracing::info!(version = VERSION, "starting relaysrv");
}
