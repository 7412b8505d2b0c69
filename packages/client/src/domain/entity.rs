//! Domain entities.

use chrono::{DateTime, Utc};
use wac_shared::dto::request::Pagination;

use super::value_object::PublicId;

/// Minimal user identity used in conversations and search results
#[derive(Debug, Clone, PartialEq)]
pub struct BaseUser {
    pub public_id: PublicId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl BaseUser {
    /// "First Last", falling back to the email when both names are empty
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// The authenticated principal
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedUser {
    pub public_id: PublicId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_url: Option<String>,
    pub authorities: Vec<String>,
}

/// Delivery state of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSendState {
    ToSend,
    Sent,
    Received,
    Read,
}

impl MessageSendState {
    /// Short marker shown next to a message
    pub fn indicator(&self) -> &'static str {
        match self {
            MessageSendState::ToSend => "…",
            MessageSendState::Sent => "✓",
            MessageSendState::Received => "✓✓",
            MessageSendState::Read => "✓✓ read",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Text,
    Image,
    Video,
    Audio,
    Document,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub public_id: PublicId,
    pub conversation_id: PublicId,
    pub sender_id: PublicId,
    pub text_content: String,
    pub send_date: DateTime<Utc>,
    pub state: MessageSendState,
    pub message_type: MessageType,
}

/// A named thread with its members and messages
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub public_id: PublicId,
    pub name: String,
    pub members: Vec<BaseUser>,
    pub messages: Vec<Message>,
    /// Set on the conversation currently selected in the UI
    pub active: bool,
}

impl Conversation {
    pub fn has_member(&self, user_id: &PublicId) -> bool {
        self.members.iter().any(|member| &member.public_id == user_id)
    }

    pub fn find_member(&self, user_id: &PublicId) -> Option<&BaseUser> {
        self.members.iter().find(|member| &member.public_id == user_id)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.iter().max_by_key(|message| message.send_date)
    }

    /// Send date of the most recent message, `None` for an empty conversation
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_message().map(|message| message.send_date)
    }

    /// Title as seen by `me`: the other members' names, or the conversation name
    pub fn title_for(&self, me: Option<&PublicId>) -> String {
        let others: Vec<String> = self
            .members
            .iter()
            .filter(|member| Some(&member.public_id) != me)
            .map(BaseUser::display_name)
            .collect();

        if others.is_empty() {
            self.name.clone()
        } else {
            others.join(", ")
        }
    }
}

/// Request to create a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationToCreate {
    pub members: Vec<PublicId>,
    pub name: String,
}

impl ConversationToCreate {
    pub const DEFAULT_NAME: &'static str = "Default";

    /// One-to-one conversation with `peer`
    pub fn with_peer(peer: PublicId) -> Self {
        Self {
            members: vec![peer],
            name: Self::DEFAULT_NAME.to_string(),
        }
    }
}

/// Request to send a message
#[derive(Debug, Clone, PartialEq)]
pub struct MessageToSend {
    pub conversation_id: PublicId,
    pub text_content: String,
    pub message_type: MessageType,
}

impl MessageToSend {
    pub fn text(conversation_id: PublicId, text_content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            text_content: text_content.into(),
            message_type: MessageType::Text,
        }
    }
}

/// Read receipt: the listed messages of a conversation were viewed
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationViewed {
    pub conversation_id: PublicId,
    pub message_ids_viewed: Vec<PublicId>,
}

/// Free-text user search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub page: Pagination,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, page_size: u32) -> Self {
        Self {
            query: query.into(),
            page: Pagination::first_page(page_size),
        }
    }
}
