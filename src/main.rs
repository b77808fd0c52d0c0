//! Process entry point. Resolves config with a small bootstrap runtime
//! (config loading is async — reading two JSON files off disk — but the
//! real multi-thread runtime can't be sized until `thread_pool_size` is
//! known), then builds the reactor pool and drives the server to
//! completion on it.

use std::path::PathBuf;
use std::sync::Arc;

use relaysrv::app;
use relaysrv::config;
use relaysrv::net::ReactorPool;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let args = app::args::parse();
    app::panic::install_panic_hook();
    app::logger::init_logging(&args);

    let config_dir = match &args.config_dir {
        Some(dir) => PathBuf::from(dir),
        None => config::config_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let bootstrap = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build bootstrap runtime");
    let config = match bootstrap.block_on(config::load(&config_dir)) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "FATAL: failed to load configuration");
            std::process::exit(exitcode::OK);
        }
    };
    drop(bootstrap);

    let reactors = match ReactorPool::build(config.server.thread_pool_size) {
        Ok(pool) => Arc::new(pool),
        Err(err) => {
            tracing::error!(error = %err, "FATAL: failed to build reactor pool");
            std::process::exit(exitcode::OK);
        }
    };

    let result = reactors.block_on(app::server::run(config, reactors.clone(), config_dir));
    if let Err(err) = result {
        tracing::error!(error = %err, "FATAL: server exited with error");
    }
    std::process::exit(exitcode::OK);
}
