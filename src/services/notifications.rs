use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// Transient message shown in the corner of the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

/// Queue of toasts raised while handling one user action.
#[derive(Debug, Default)]
pub struct Notifier {
    queue: Vec<Toast>,
}

impl Notifier {
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            ToastKind::Error => tracing::debug!(%message, "error toast"),
            _ => tracing::debug!(%message, "toast"),
        }
        self.queue.push(Toast { kind, message });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Error, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Info, message);
    }

    pub fn pending(&self) -> &[Toast] {
        &self.queue
    }

    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.queue)
    }
}

/// A yes/no question; confirming posts to `confirm_url`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmPrompt {
    pub message: String,
    pub confirm_url: String,
}
