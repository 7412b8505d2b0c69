//! Navigation target published on a `watch` channel.

use tokio::sync::watch;

use crate::domain::{Navigator, PublicId};

/// Records the conversation the UI should display
pub struct WatchNavigator {
    current: watch::Sender<Option<PublicId>>,
}

impl WatchNavigator {
    pub fn new() -> (Self, watch::Receiver<Option<PublicId>>) {
        let (current, receiver) = watch::channel(None);
        (Self { current }, receiver)
    }
}

impl Navigator for WatchNavigator {
    fn navigate_to(&self, conversation_id: PublicId) {
        tracing::debug!("Navigating to conversation '{}'", conversation_id);
        self.current.send_replace(Some(conversation_id));
    }
}
