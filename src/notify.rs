//! Transient user notifications ("toasts").
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store reports login/logout outcomes through a [`Notifier`]
//! rather than printing or rendering anything itself. Front ends plug in
//! their own toast surface; the default routes notifications into tracing.

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, message: message.into() }
    }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Emits notifications as tracing events under the `toast` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!(target: "toast", "{}", notification.message),
            NotificationLevel::Error => tracing::error!(target: "toast", "{}", notification.message),
        }
    }
}
