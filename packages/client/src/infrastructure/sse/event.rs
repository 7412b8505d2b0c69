//! Mapping of event stream frames to domain push events.

use wac_shared::dto::message::{ConversationViewedForNotificationDto, MessageDto};

use crate::domain::{ConversationViewed, Message, PublicId, PushEvent};

use super::decoder::SseFrame;

pub const NEW_MESSAGE_EVENT: &str = "new-message";
pub const DELETE_CONVERSATION_EVENT: &str = "delete-conversation";
pub const VIEW_MESSAGES_EVENT: &str = "view-messages";

/// Why a frame could not be turned into a push event
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("Unknown event '{0}'")]
    UnknownEvent(String),

    #[error("Invalid payload for '{event}': {reason}")]
    InvalidPayload { event: String, reason: String },
}

fn invalid(frame: &SseFrame, reason: impl ToString) -> FrameError {
    FrameError::InvalidPayload {
        event: frame.event.clone(),
        reason: reason.to_string(),
    }
}

/// Decode a frame into a push event
pub fn parse_push_event(frame: &SseFrame) -> Result<PushEvent, FrameError> {
    match frame.event.as_str() {
        NEW_MESSAGE_EVENT => {
            let message: MessageDto =
                serde_json::from_str(&frame.data).map_err(|e| invalid(frame, e))?;
            Ok(PushEvent::NewMessage(Message::from(message)))
        }
        DELETE_CONVERSATION_EVENT => {
            // The id is sent either as a JSON string or as the bare UUID
            let raw = serde_json::from_str::<String>(&frame.data)
                .unwrap_or_else(|_| frame.data.clone());
            let conversation_id: PublicId = raw.parse().map_err(|e| invalid(frame, e))?;
            Ok(PushEvent::ConversationDeleted(conversation_id))
        }
        VIEW_MESSAGES_EVENT => {
            let viewed: ConversationViewedForNotificationDto =
                serde_json::from_str(&frame.data).map_err(|e| invalid(frame, e))?;
            Ok(PushEvent::MessagesViewed(ConversationViewed::from(viewed)))
        }
        other => Err(FrameError::UnknownEvent(other.to_string())),
    }
}
