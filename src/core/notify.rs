//! User-facing notifications.
//!
//! Operations report outcomes through an injected [`Notifier`] instead of a global
//! event bus. Delivery is fire-and-forget: `notify` never blocks on the presentation
//! layer and cannot fail.

use std::sync::Mutex;
use tracing::{error, info};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The action succeeded
    Success,
    /// Neutral information
    Info,
    /// The action failed
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub severity: Severity,
    /// Message text
    pub message: String,
}

impl Notice {
    /// A success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    /// An informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    /// An error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Message prefixed with a status marker, for chat replies.
    #[must_use]
    pub fn render(&self) -> String {
        let marker = match self.severity {
            Severity::Success => "✅",
            Severity::Info => "ℹ️",
            Severity::Error => "❌",
        };
        format!("{marker} {}", self.message)
    }
}

/// Receives notices from core operations.
pub trait Notifier: Send + Sync {
    /// Delivers a notice.
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Error => error!("{}", notice.message),
            Severity::Success | Severity::Info => info!("{}", notice.message),
        }
    }
}

/// Notifier that keeps notices until the caller takes them, e.g. to send them as one
/// chat reply.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything collected so far.
    pub fn take(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut notices| std::mem::take(&mut *notices))
            .unwrap_or_default()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_notifier_take_drains() {
        let notifier = CollectingNotifier::new();
        notifier.notify(Notice::success("saved"));
        notifier.notify(Notice::info("nothing else"));

        let notices = notifier.take();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].severity, Severity::Success);
        assert!(notifier.take().is_empty());
    }

    #[test]
    fn test_render() {
        assert_eq!(Notice::error("boom").render(), "❌ boom");
        assert_eq!(Notice::success("ok").render(), "✅ ok");
    }
}
