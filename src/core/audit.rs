//! Activity log business logic.
//!
//! The log is append-only: records are added by the operations that change entries or
//! users and are never edited or removed.

use crate::{
    errors::Result,
    models::{LogAction, LogEntry, User},
    store::{Collection, Store},
};
use chrono::Utc;
use uuid::Uuid;

/// Builds a log record attributed to `actor`, stamped now.
///
/// Operations push it inside the same [`Store::modify_pair`] that changes the record it
/// describes, so the two are committed together.
#[must_use]
pub fn record(actor: &User, action: LogAction, details: impl Into<String>) -> LogEntry {
    LogEntry {
        id: Uuid::new_v4().to_string(),
        user_id: actor.id.clone(),
        user_name: actor.name.clone(),
        action,
        details: details.into(),
        timestamp: Utc::now(),
    }
}

/// Emits a committed log record to the tracing output.
pub fn trace(entry: &LogEntry) {
    tracing::info!(action = %entry.action, user = %entry.user_name, "{}", entry.details);
}

/// Returns up to `limit` log records, newest first.
pub async fn recent<S: Store>(store: &S, limit: usize) -> Result<Vec<LogEntry>> {
    let mut log: Vec<LogEntry> = store.get(Collection::ActivityLog).await?;
    // Appended later means newer when timestamps tie.
    log.reverse();
    log.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    log.truncate(limit);
    Ok(log)
}

/// Formats a log record as one line, e.g.
/// `2024-01-10 08:00 | CREATE_PLAN | Asha | Planned 100 KG for X (2024-01-10)`.
#[must_use]
pub fn format_log_line(entry: &LogEntry) -> String {
    format!(
        "{} | {} | {} | {}",
        entry.timestamp.format("%Y-%m-%d %H:%M"),
        entry.action,
        entry.user_name,
        entry.details
    )
}
