//! Process-wide panic hook: renders panics through `tracing` instead of
//! bare stderr, so they land in the same structured log stream as
//! everything else. Handler tasks are spawned independently, so a panic
//! inside one must be caught at the task boundary instead of unwinding the
//! process; the dispatcher guards each spawned handler with
//! `JoinHandle`'s own unwind boundary — see `services::dispatcher`.

pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "<unknown>".to_string());
        tracing::error!(location, "{info}");
        default_hook(info);
    }));
}
