//! Display helpers for durations, dates and session summaries.

use chrono::{DateTime, Local, Utc};

use crate::types::SessionRecord;

/// Formats seconds as `"1h 5m"`, `"5m"` or `"42s"`; non-positive is `"0m"`.
pub fn format_duration(secs: u64) -> String {
    if secs == 0 {
        return "0m".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", secs)
    }
}

/// `MM/DD HH:MM` in local time.
pub fn format_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%m/%d %H:%M").to_string()
}

/// `MM/DD` in local time.
pub fn format_short_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%m/%d").to_string()
}

/// One-line summary such as `"2 completed, 1 worked on"`.
pub fn summary_line(record: &SessionRecord) -> String {
    let mut parts = Vec::new();
    if !record.completed.is_empty() {
        parts.push(format!("{} completed", record.completed.len()));
    }
    if !record.worked_on.is_empty() {
        parts.push(format!("{} worked on", record.worked_on.len()));
    }
    if parts.is_empty() {
        "Logged only".to_string()
    } else {
        parts.join(", ")
    }
}

/// Plain-text rendering of a session for sharing.
///
/// `name_of` resolves item ids; stale ids should resolve to a placeholder.
pub fn share_text<F>(record: &SessionRecord, name_of: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut text = format!("Practice log {}\n", format_date(record.started_at));
    text.push_str(&format!("Time: {}\n", format_duration(record.duration)));

    if !record.completed.is_empty() {
        text.push_str("\nCompleted:\n");
        for id in &record.completed {
            text.push_str(&format!("  {}\n", name_of(id)));
        }
    }
    if !record.worked_on.is_empty() {
        text.push_str("\nWorked on:\n");
        for id in &record.worked_on {
            text.push_str(&format!("  {}\n", name_of(id)));
        }
    }
    if !record.note.is_empty() {
        text.push_str(&format!("\nNote: {}\n", record.note));
    }

    text.trim().to_string()
}
