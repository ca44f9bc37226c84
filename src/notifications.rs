//! # Toast notifications
//!
//! The console shows at most one error and one success notification at a
//! time. Each is keyed by the presence of a non-empty message: setting an
//! empty message is the same as dismissing it. Notifications expire after a
//! fixed lifetime, or earlier when the user dismisses them.
//!
//! Timestamps come from `tokio::time`, so expiry follows the runtime clock.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Success,
}

/// A message currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// Secondary line shown under the message
    pub note: Option<String>,
    pub shown_at: Instant,
}

impl Notice {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.shown_at) >= ttl
    }
}

/// The error and success slots of the view.
#[derive(Debug, Clone)]
pub struct Notifications {
    ttl: Duration,
    error: Option<Notice>,
    success: Option<Notice>,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            error: None,
            success: None,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Shows an error, replacing any previous one. An empty message clears it.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Self::make(NoticeKind::Error, message.into(), None);
    }

    /// Shows a success message, replacing any previous one. An empty message clears it.
    pub fn set_success(&mut self, message: impl Into<String>) {
        self.success = Self::make(NoticeKind::Success, message.into(), None);
    }

    /// Like `set_success`, with a secondary line under the message.
    pub fn set_success_with_note(&mut self, message: impl Into<String>, note: Option<String>) {
        self.success = Self::make(NoticeKind::Success, message.into(), note);
    }

    fn make(kind: NoticeKind, message: String, note: Option<String>) -> Option<Notice> {
        if message.is_empty() {
            return None;
        }
        Some(Notice {
            kind,
            message,
            note: note.filter(|n| !n.is_empty()),
            shown_at: Instant::now(),
        })
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn dismiss_success(&mut self) {
        self.success = None;
    }

    pub fn clear(&mut self) {
        self.error = None;
        self.success = None;
    }

    /// Drops every notification whose lifetime has elapsed at `now`.
    pub fn expire_at(&mut self, now: Instant) {
        let ttl = self.ttl;
        for slot in [&mut self.error, &mut self.success] {
            if slot.as_ref().is_some_and(|n| n.is_expired(now, ttl))
                && let Some(notice) = slot.take()
            {
                debug!("Notification expired: {:?}", notice.kind);
            }
        }
    }

    pub fn expire(&mut self) {
        self.expire_at(Instant::now());
    }

    /// Current error text, empty when none is shown.
    pub fn error(&self) -> &str {
        self.error.as_ref().map_or("", |n| n.message.as_str())
    }

    /// Current success text, empty when none is shown.
    pub fn success(&self) -> &str {
        self.success.as_ref().map_or("", |n| n.message.as_str())
    }

    /// Secondary line of the success notification, if any.
    pub fn success_note(&self) -> Option<&str> {
        self.success.as_ref().and_then(|n| n.note.as_deref())
    }

    /// Visible notifications, error first.
    pub fn visible(&self) -> impl Iterator<Item = &Notice> {
        self.error.iter().chain(self.success.iter())
    }
}
