//! Shared toast service.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};

use crate::domain::{Toast, ToastId, ToastKind, ToastQueue};

const TOAST_BROADCAST_CAPACITY: usize = 64;

/// Cloneable handle on the application's toast queue.
///
/// New toasts are also broadcast so a renderer can display them as they come.
#[derive(Clone)]
pub struct ToastService {
    queue: Arc<Mutex<ToastQueue>>,
    notifier: broadcast::Sender<Toast>,
}

impl ToastService {
    pub fn new() -> Self {
        let (notifier, _) = broadcast::channel(TOAST_BROADCAST_CAPACITY);
        Self {
            queue: Arc::new(Mutex::new(ToastQueue::new())),
            notifier,
        }
    }

    pub async fn show(&self, body: impl Into<String>, kind: ToastKind) -> ToastId {
        let toast = self.queue.lock().await.show(body, kind);
        tracing::debug!("Toast {:?}: {}", toast.kind, toast.body);
        // No renderer subscribed yet is fine: the toast stays in the queue.
        let _ = self.notifier.send(toast.clone());
        toast.id
    }

    pub async fn success(&self, body: impl Into<String>) -> ToastId {
        self.show(body, ToastKind::Success).await
    }

    pub async fn danger(&self, body: impl Into<String>) -> ToastId {
        self.show(body, ToastKind::Danger).await
    }

    pub async fn remove(&self, id: ToastId) -> bool {
        self.queue.lock().await.remove(id)
    }

    pub async fn toasts(&self) -> Vec<Toast> {
        self.queue.lock().await.toasts().to_vec()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.notifier.subscribe()
    }
}

impl Default for ToastService {
    fn default() -> Self {
        Self::new()
    }
}
