//! User-facing notices: inline errors, blocking alerts and transient toasts.

use std::time::{Duration, Instant};

/// How long a toast stays visible.
pub const TOAST_TTL: Duration = Duration::from_secs(3);

pub const PROFILE_UPDATED: &str = "تم تحديث الملف الشخصي";
pub const SUBMIT_FAILED: &str = "حدث خطأ أثناء إرسال الإجابات";
pub const CONNECTION_FAILED: &str = "حدث خطأ في الاتصال بالخادم";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind, shown_at: Instant) -> Self {
        Self {
            message: message.into(),
            kind,
            shown_at,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Success, Instant::now())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Error, Instant::now())
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= TOAST_TTL
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Shown in place of the page content.
    Inline(String),
    /// Blocking message the user must dismiss.
    Alert(String),
    Toast(Toast),
}

impl Notice {
    /// An inline notice for a failed backend call.
    pub fn from_error(err: &anyhow::Error) -> Self {
        Notice::Inline(crate::error::user_message(err))
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Inline(s) | Notice::Alert(s) => s,
            Notice::Toast(t) => &t.message,
        }
    }
}

/// Toasts currently on screen.
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    /// Drop expired toasts and return the rest, oldest first.
    pub fn visible(&mut self, now: Instant) -> &[Toast] {
        self.toasts.retain(|t| !t.is_expired(now));
        &self.toasts
    }
}
