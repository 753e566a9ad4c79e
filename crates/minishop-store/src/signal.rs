use std::sync::Arc;

use tokio::sync::watch;

/// Re-render trigger shared by every store.
///
/// Each trigger bumps a revision counter; a rendering adapter holding a
/// receiver from [`RenderSignal::subscribe`] wakes on change.
#[derive(Debug, Clone)]
pub struct RenderSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl RenderSignal {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn bump(&self) {
        self.tx.send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for RenderSignal {
    fn default() -> Self {
        Self::new()
    }
}
