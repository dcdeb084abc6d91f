use chrono::{DateTime, Utc};

/// Human readable time left before `deadline`, e.g. "14 min" or "1h 05min".
pub fn format_remaining(deadline: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let seconds = deadline.signed_duration_since(*now).num_seconds();
    if seconds <= 0 {
        return "expired".to_string();
    }

    let minutes = (seconds + 59) / 60;
    if minutes < 60 {
        format!("{minutes} min")
    } else {
        format!("{}h {:02}min", minutes / 60, minutes % 60)
    }
}

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%A, %B %d at %I:%M %p").to_string()
}
