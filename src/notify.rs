//! Notifications

use std::{fmt, time::Duration};

use tracing::info;

/// Lifetime of a notice when none is configured.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(2_000);

/// What a notice is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    /// A selection went into the cart
    AddedToCart,

    /// A unique selection was already in the cart
    Duplicate,

    /// A replayed add after logging in
    Welcome,

    /// Input was rejected
    Validation,
}

/// A transient notice shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Kind of notice
    pub kind: NoticeKind,

    /// Text shown to the user
    pub message: String,

    /// How long the notice stays up
    pub ttl: Duration,
}

impl Notification {
    /// Notice with the default lifetime.
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            ttl: DEFAULT_NOTICE_TTL,
        }
    }

    /// Overrides the lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Shows transient notices.
pub trait Notifier: fmt::Debug + Send + Sync {
    /// Shows a notice; it clears itself after its lifetime.
    fn notify(&self, notification: Notification);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        info!(
            kind = ?notification.kind,
            ttl = ?notification.ttl,
            "{}",
            notification.message
        );
    }
}
