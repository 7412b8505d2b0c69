//! Conversion logic between DTOs and domain entities.

use wac_shared::dto::{
    conversation::{ConversationDto, ConversationToCreateDto},
    message::{
        ConversationViewedForNotificationDto, MessageDto, MessageSendStateDto, MessageToSendDto,
        MessageTypeDto,
    },
    user::{BaseUserDto, ConnectedUserDto},
};

use crate::domain::{
    BaseUser, ConnectedUser, Conversation, ConversationToCreate, ConversationViewed, Message,
    MessageSendState, MessageToSend, MessageType, PublicId,
};

// ========================================
// DTO → Domain Entity
// ========================================

impl From<BaseUserDto> for BaseUser {
    fn from(dto: BaseUserDto) -> Self {
        Self {
            public_id: dto.public_id.into(),
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email,
            image_url: dto.image_url,
            last_seen: dto.last_seen,
        }
    }
}

impl From<ConnectedUserDto> for ConnectedUser {
    fn from(dto: ConnectedUserDto) -> Self {
        Self {
            public_id: dto.public_id.into(),
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
            image_url: dto.image_url,
            authorities: dto.authorities,
        }
    }
}

impl From<MessageSendStateDto> for MessageSendState {
    fn from(dto: MessageSendStateDto) -> Self {
        match dto {
            MessageSendStateDto::ToSend => MessageSendState::ToSend,
            MessageSendStateDto::Sent => MessageSendState::Sent,
            MessageSendStateDto::Received => MessageSendState::Received,
            MessageSendStateDto::Read => MessageSendState::Read,
        }
    }
}

impl From<MessageTypeDto> for MessageType {
    fn from(dto: MessageTypeDto) -> Self {
        match dto {
            MessageTypeDto::Text => MessageType::Text,
            MessageTypeDto::Image => MessageType::Image,
            MessageTypeDto::Video => MessageType::Video,
            MessageTypeDto::Audio => MessageType::Audio,
            MessageTypeDto::Document => MessageType::Document,
        }
    }
}

impl From<MessageDto> for Message {
    fn from(dto: MessageDto) -> Self {
        Self {
            public_id: dto.public_id.into(),
            conversation_id: dto.conversation_id.into(),
            sender_id: dto.sender_id.into(),
            text_content: dto.text_content,
            send_date: dto.send_date,
            state: dto.state.into(),
            message_type: dto.message_type.into(),
        }
    }
}

impl From<ConversationDto> for Conversation {
    fn from(dto: ConversationDto) -> Self {
        Self {
            public_id: dto.public_id.into(),
            name: dto.name,
            members: dto.members.into_iter().map(BaseUser::from).collect(),
            messages: dto
                .messages
                .unwrap_or_default()
                .into_iter()
                .map(Message::from)
                .collect(),
            active: false,
        }
    }
}

impl From<ConversationViewedForNotificationDto> for ConversationViewed {
    fn from(dto: ConversationViewedForNotificationDto) -> Self {
        Self {
            conversation_id: dto.conversation_id.into(),
            message_ids_viewed: dto
                .message_ids_viewed
                .into_iter()
                .map(PublicId::from)
                .collect(),
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<MessageType> for MessageTypeDto {
    fn from(model: MessageType) -> Self {
        match model {
            MessageType::Text => MessageTypeDto::Text,
            MessageType::Image => MessageTypeDto::Image,
            MessageType::Video => MessageTypeDto::Video,
            MessageType::Audio => MessageTypeDto::Audio,
            MessageType::Document => MessageTypeDto::Document,
        }
    }
}

impl From<ConversationToCreate> for ConversationToCreateDto {
    fn from(model: ConversationToCreate) -> Self {
        Self {
            members: model.members.iter().map(PublicId::as_uuid).collect(),
            name: model.name,
        }
    }
}

impl From<MessageToSend> for MessageToSendDto {
    fn from(model: MessageToSend) -> Self {
        Self {
            conversation_id: model.conversation_id.as_uuid(),
            text_content: model.text_content,
            message_type: model.message_type.into(),
        }
    }
}
