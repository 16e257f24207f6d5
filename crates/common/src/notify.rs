//! User-facing notification collaborator.
//!
//! The cart engine and the checkout session report outcomes through a
//! [`Notifier`]. Delivery (toast, push, SMS) is the caller's concern.

use std::sync::{Arc, Mutex};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
    Info,
}

/// A notice as captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Surface for success/error/warning/info messages.
pub trait Notifier: Send + Sync {
    /// Emits a notice at the given level.
    fn notify(&self, level: NoticeLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NoticeLevel::Warning, message);
    }

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }
}

/// Notifier that writes notices to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success | NoticeLevel::Info => {
                tracing::info!(?level, message, "notice");
            }
            NoticeLevel::Warning => tracing::warn!(message, "notice"),
            NoticeLevel::Error => tracing::error!(message, "notice"),
        }
    }
}

/// Notifier that keeps every notice in memory, for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    /// Creates an empty recording notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all notices received so far.
    pub fn notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the messages received at the given level.
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        let notice = Notice {
            level,
            message: message.to_string(),
        };
        match self.notices.lock() {
            Ok(mut guard) => guard.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}
