use chrono::{DateTime, Utc};

/// Compact relative time for the map panels: `Just now`, `3h ago`, `2d ago`.
pub fn time_ago_short(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(ts) = timestamp else {
        return "Unknown".into();
    };
    let hours = (now - ts).num_hours();
    let days = hours / 24;
    if days > 0 {
        format!("{days}d ago")
    } else if hours > 0 {
        format!("{hours}h ago")
    } else {
        "Just now".into()
    }
}

/// Long relative time for the dashboard and alerts feed.
pub fn time_ago(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(ts) = timestamp else {
        return "Unknown".into();
    };
    let hours = (now - ts).num_hours();
    let days = hours / 24;
    if days > 0 {
        format!("{days} day{} ago", plural(days))
    } else if hours > 0 {
        format!("{hours} hour{} ago", plural(hours))
    } else {
        "Just now".into()
    }
}

fn plural(n: i64) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}

/// Cuts `text` to at most `max` characters, adding `...` when something was cut.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Millisecond epoch (as reported by the browser clock) to UTC.
pub fn from_epoch_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}
