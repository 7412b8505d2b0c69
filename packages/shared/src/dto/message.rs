//! Message DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery state of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageSendStateDto {
    ToSend,
    Sent,
    Received,
    Read,
}

/// Kind of message content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageTypeDto {
    Text,
    Image,
    Video,
    Audio,
    Document,
}

/// A message as returned by the backend and pushed on the event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub public_id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    #[serde(default)]
    pub text_content: String,
    pub send_date: DateTime<Utc>,
    pub state: MessageSendStateDto,
    #[serde(rename = "type", default = "default_message_type")]
    pub message_type: MessageTypeDto,
}

fn default_message_type() -> MessageTypeDto {
    MessageTypeDto::Text
}

/// Request body for sending a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageToSendDto {
    pub conversation_id: Uuid,
    pub text_content: String,
    #[serde(rename = "type")]
    pub message_type: MessageTypeDto,
}

/// Read receipt pushed when the peer viewed messages of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationViewedForNotificationDto {
    pub conversation_id: Uuid,
    #[serde(default)]
    pub message_ids_viewed: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_deserializes_backend_payload() {
        // テスト項目: バックエンドのメッセージ JSON がデシリアライズされる
        // given (前提条件):
        let json = r#"{
            "publicId": "1d6b8f2e-52a4-4f8c-9f0e-6f0f0b7d2a01",
            "conversationId": "0b8a6c1e-1f39-4c61-8b32-0d2c3c9a7e01",
            "senderId": "6f1c1a52-3d7e-4b8e-9a51-5b0f0f6f1a11",
            "textContent": "hello",
            "sendDate": "2024-05-01T10:00:00Z",
            "state": "SENT",
            "type": "TEXT"
        }"#;

        // when (操作):
        let message: MessageDto = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(message.text_content, "hello");
        assert_eq!(message.state, MessageSendStateDto::Sent);
        assert_eq!(message.message_type, MessageTypeDto::Text);
    }

    #[test]
    fn test_message_type_defaults_to_text() {
        // テスト項目: type が無い場合は TEXT として扱われる
        // given (前提条件):
        let json = r#"{
            "publicId": "1d6b8f2e-52a4-4f8c-9f0e-6f0f0b7d2a01",
            "conversationId": "0b8a6c1e-1f39-4c61-8b32-0d2c3c9a7e01",
            "senderId": "6f1c1a52-3d7e-4b8e-9a51-5b0f0f6f1a11",
            "sendDate": "2024-05-01T10:00:00Z",
            "state": "READ"
        }"#;

        // when (操作):
        let message: MessageDto = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(message.message_type, MessageTypeDto::Text);
        assert_eq!(message.state, MessageSendStateDto::Read);
    }

    #[test]
    fn test_message_to_send_uses_type_key() {
        // テスト項目: 送信リクエストのメッセージ種別は "type" キーで送られる
        // given (前提条件):
        let request = MessageToSendDto {
            conversation_id: Uuid::nil(),
            text_content: "hi".to_string(),
            message_type: MessageTypeDto::Text,
        };

        // when (操作):
        let json = serde_json::to_value(&request).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "TEXT");
        assert_eq!(json["textContent"], "hi");
    }
}
