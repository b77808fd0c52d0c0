pub mod bounded_queue;

/// Format a `chrono::Duration` to be more human-friendly, for connection
/// duration log lines.
pub fn format_duration(duration: &chrono::Duration) -> String {
    let milliseconds = format!("{:0>3}", duration.num_milliseconds() % 1000);
    let seconds = format!("{:0>2}", duration.num_seconds() % 60);
    let minutes = format!("{:0>2}", duration.num_minutes() % 60);
    let hours = format!("{:0>2}", duration.num_hours() % 24);
    let days = duration.num_days().to_string();

    format!("{days}d {hours}:{minutes}:{seconds}.{milliseconds}")
}

/// Milliseconds since the Unix epoch, used for `lastActivity`/`connectTime`
/// timestamps that need to be compared cheaply across tasks via an atomic.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
