//! User-facing notifications.
//!
//! Controllers report outcomes as [`Toast`]s. A front end subscribes and
//! renders them; every toast is also logged, so a headless run still shows
//! what happened.

use tokio::sync::broadcast;
use tracing::{info, warn};

const CHANNEL_CAPACITY: usize = 64;

/// How a toast is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

/// A short notification with a title and a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    /// A success toast titled "Thành công".
    #[must_use]
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            title: "Thành công".to_string(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    /// An error toast titled "Lỗi".
    #[must_use]
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Lỗi".to_string(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }
}

/// Broadcasts toasts to any number of subscribers.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Toast>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Receive every toast sent after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.tx.subscribe()
    }

    pub fn toast(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Default => {
                info!(title = %toast.title, description = %toast.description, "Toast");
            }
            ToastVariant::Destructive => {
                warn!(title = %toast.title, description = %toast.description, "Toast");
            }
        }
        // No subscribers is fine.
        let _ = self.tx.send(toast);
    }
}
