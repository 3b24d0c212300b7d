use chrono::Local;

/// Current local time, e.g. `Friday, 16 October 2026, 02:05 PM (2026-10-16 14:05:09)`.
pub fn get_time() -> String {
    Local::now()
        .format("%A, %d %B %Y, %I:%M %p (%Y-%m-%d %H:%M:%S)")
        .to_string()
}
