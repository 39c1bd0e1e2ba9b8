//! Toast notifications.

use std::collections::VecDeque;
use std::time::Duration;

use frames::NotificationKind;

/// How long the "send while closed" toast stays up.
pub const CONNECTION_LOST_DELAY: Duration = Duration::from_millis(9_999);
/// How long the "socket closed" toast stays up.
pub const DISCONNECTED_DELAY: Duration = Duration::from_millis(99_999);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Error,
    Success,
    Info,
}

impl From<NotificationKind> for ToastKind {
    fn from(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::Error => Self::Error,
            NotificationKind::Success => Self::Success,
            NotificationKind::Info => Self::Info,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub header: String,
    pub message: String,
    /// Display time; `None` uses the front end's default.
    pub delay: Option<Duration>,
}

impl Toast {
    #[must_use]
    pub fn new(kind: ToastKind, header: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind, header: header.into(), message: message.into(), delay: None }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shown when sending while the socket is not open.
    #[must_use]
    pub fn connection_lost() -> Self {
        Self::new(ToastKind::Error, "Connection lost", "Please reload the page to reconnect!")
            .with_delay(CONNECTION_LOST_DELAY)
    }

    /// Shown when the socket closes.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::new(
            ToastKind::Error,
            "Lost connection",
            "Disconnected from the server. Please reload your webpage to reconnect.",
        )
        .with_delay(DISCONNECTED_DELAY)
    }

    /// Stays up longer than a default toast.
    #[must_use]
    pub fn is_sticky(&self) -> bool {
        self.delay.is_some()
    }
}

/// FIFO of toasts waiting to be shown.
#[derive(Clone, Debug, Default)]
pub struct Notifications {
    queue: VecDeque<Toast>,
}

impl Notifications {
    pub fn push(&mut self, toast: Toast) {
        self.queue.push_back(toast);
    }

    /// Remove and return every queued toast, oldest first.
    pub fn drain(&mut self) -> Vec<Toast> {
        self.queue.drain(..).collect()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Toast> {
        self.queue.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
#[path = "notifications_test.rs"]
mod tests;
