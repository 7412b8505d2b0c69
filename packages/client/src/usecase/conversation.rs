//! Conversation requests.
//!
//! Each `handle_*` method spawns the REST call and posts its outcome to the
//! synchronizer inbox, so the caller never waits on the network. Outcomes of
//! concurrent calls may arrive in any order. Every outcome carries the session
//! generation it was requested in.

use std::sync::Arc;

use tokio::sync::mpsc;
use wac_shared::dto::request::Pagination;

use crate::domain::{
    ConversationApi, ConversationToCreate, MessageApi, MessageToSend, Navigator, PublicId, State,
};

use super::synchronizer::SyncInput;

#[derive(Clone)]
pub struct ConversationService {
    conversation_api: Arc<dyn ConversationApi>,
    message_api: Arc<dyn MessageApi>,
    navigator: Arc<dyn Navigator>,
    inbox: mpsc::UnboundedSender<SyncInput>,
}

impl ConversationService {
    pub fn new(
        conversation_api: Arc<dyn ConversationApi>,
        message_api: Arc<dyn MessageApi>,
        navigator: Arc<dyn Navigator>,
        inbox: mpsc::UnboundedSender<SyncInput>,
    ) -> Self {
        Self {
            conversation_api,
            message_api,
            navigator,
            inbox,
        }
    }

    fn post(inbox: &mpsc::UnboundedSender<SyncInput>, input: SyncInput) {
        if inbox.send(input).is_err() {
            tracing::debug!("Synchronizer stopped, dropping request outcome");
        }
    }

    /// Load one page of conversations, tagged with the session generation
    pub fn handle_get_all(&self, pagination: Pagination, generation: u64) {
        Self::post(
            &self.inbox,
            SyncInput::AllLoaded {
                generation,
                state: State::Loading,
            },
        );

        let api = self.conversation_api.clone();
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            let state = api.get_all(pagination).await.into();
            Self::post(&inbox, SyncInput::AllLoaded { generation, state });
        });
    }

    pub fn handle_get_one(&self, conversation_id: PublicId, generation: u64) {
        let api = self.conversation_api.clone();
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            let state = api.get_one(conversation_id).await.into();
            Self::post(&inbox, SyncInput::OneLoaded { generation, state });
        });
    }

    pub fn handle_create(&self, peer: PublicId, generation: u64) {
        let api = self.conversation_api.clone();
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            let state = api.create(ConversationToCreate::with_peer(peer)).await.into();
            Self::post(
                &inbox,
                SyncInput::Created {
                    generation,
                    peer,
                    state,
                },
            );
        });
    }

    pub fn handle_delete(&self, conversation_id: PublicId, generation: u64) {
        let api = self.conversation_api.clone();
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            let state = api.delete(conversation_id).await.into();
            Self::post(
                &inbox,
                SyncInput::Deleted {
                    generation,
                    conversation_id,
                    state,
                },
            );
        });
    }

    /// Fire-and-forget: a failure is only logged
    pub fn handle_mark_as_read(&self, conversation_id: PublicId) {
        let api = self.conversation_api.clone();
        tokio::spawn(async move {
            if let Err(e) = api.mark_as_read(conversation_id).await {
                tracing::warn!(
                    "Failed to mark conversation '{}' as read: {}",
                    conversation_id,
                    e
                );
            }
        });
    }

    pub fn handle_send(&self, message: MessageToSend, generation: u64) {
        let api = self.message_api.clone();
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            let state = api.send(message).await.into();
            Self::post(&inbox, SyncInput::Sent { generation, state });
        });
    }

    pub fn navigate_to(&self, conversation_id: PublicId) {
        self.navigator.navigate_to(conversation_id);
    }
}
