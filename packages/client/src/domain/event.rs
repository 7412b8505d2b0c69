//! Events pushed by the server on the event stream.

use super::{
    entity::{ConversationViewed, Message},
    value_object::PublicId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// A message was posted in one of the user's conversations
    NewMessage(Message),
    /// A conversation was deleted by one of its members
    ConversationDeleted(PublicId),
    /// The peer viewed messages of a conversation
    MessagesViewed(ConversationViewed),
}
