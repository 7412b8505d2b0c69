//! Conversation DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{message::MessageDto, user::BaseUserDto};

/// A conversation as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub public_id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<BaseUserDto>,
    /// Absent or `null` when the conversation has no messages yet
    #[serde(default)]
    pub messages: Option<Vec<MessageDto>>,
}

/// Request body for creating a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationToCreateDto {
    pub members: Vec<Uuid>,
    pub name: String,
}
