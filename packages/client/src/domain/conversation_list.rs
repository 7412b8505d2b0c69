//! Ordered in-memory list of the user's conversations.
//!
//! This module contains the pure merge rules applied to the list, whatever
//! the source of the update (REST response, user action or pushed event).
//!
//! Invariants kept by every operation:
//! - entries are unique by `public_id`
//! - at most one entry is `active`, and it is the one reported by `selected()`
//! - entries are ordered by the send date of their last message, most recent
//!   first; conversations without messages come last, in their previous
//!   relative order

use std::cmp::Reverse;

use super::{
    entity::{BaseUser, Conversation, ConversationViewed, Message, MessageSendState},
    value_object::PublicId,
};

/// What happened to a message handed to [`ConversationList::apply_new_message`]
#[derive(Debug, Clone, PartialEq)]
pub enum NewMessageOutcome {
    /// The message was appended to its conversation
    Appended {
        conversation_id: PublicId,
        sender_id: PublicId,
        /// Sender resolved from the conversation members, if present
        sender: Option<BaseUser>,
    },
    /// No local conversation has this id; nothing was mutated
    UnknownConversation(PublicId),
}

#[derive(Debug, Clone, Default)]
pub struct ConversationList {
    conversations: Vec<Conversation>,
    selected: Option<PublicId>,
}

impl ConversationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn get(&self, conversation_id: &PublicId) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|conversation| &conversation.public_id == conversation_id)
    }

    fn position(&self, conversation_id: &PublicId) -> Option<usize> {
        self.conversations
            .iter()
            .position(|conversation| &conversation.public_id == conversation_id)
    }

    /// First conversation having `user_id` among its members
    pub fn find_by_member(&self, user_id: &PublicId) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|conversation| conversation.has_member(user_id))
    }

    pub fn selected(&self) -> Option<&Conversation> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<PublicId> {
        self.selected
    }

    /// Replace every entry with `conversations`.
    ///
    /// Duplicate ids keep their first occurrence. The selection survives if
    /// the selected conversation is still part of the new list.
    pub fn replace_all(&mut self, conversations: Vec<Conversation>) {
        let mut unique: Vec<Conversation> = Vec::with_capacity(conversations.len());
        for mut conversation in conversations {
            if unique
                .iter()
                .any(|existing| existing.public_id == conversation.public_id)
            {
                tracing::debug!(
                    "Dropping duplicate conversation '{}' from loaded page",
                    conversation.public_id
                );
                continue;
            }
            conversation.active = Some(conversation.public_id) == self.selected;
            unique.push(conversation);
        }

        self.conversations = unique;
        if let Some(selected) = self.selected
            && self.position(&selected).is_none()
        {
            self.selected = None;
        }
        self.sort_by_last_message();
    }

    /// Insert a conversation, or replace the entry with the same id.
    ///
    /// Returns `true` when the conversation was not in the list before.
    pub fn upsert(&mut self, mut conversation: Conversation) -> bool {
        conversation.active = Some(conversation.public_id) == self.selected;
        let inserted = match self.position(&conversation.public_id) {
            Some(index) => {
                self.conversations[index] = conversation;
                false
            }
            None => {
                self.conversations.push(conversation);
                true
            }
        };
        self.sort_by_last_message();
        inserted
    }

    /// Remove the conversation with the given id.
    ///
    /// A missing id leaves the list untouched. Removing the selected
    /// conversation clears the selection.
    pub fn remove(&mut self, conversation_id: &PublicId) -> Option<Conversation> {
        let index = self.position(conversation_id)?;
        if self.selected.as_ref() == Some(conversation_id) {
            self.selected = None;
        }
        Some(self.conversations.remove(index))
    }

    /// Make `conversation_id` the only active conversation.
    ///
    /// Unknown ids keep the current selection and return `None`.
    pub fn select(&mut self, conversation_id: &PublicId) -> Option<&Conversation> {
        let index = self.position(conversation_id)?;
        for conversation in self.conversations.iter_mut() {
            conversation.active = false;
        }
        self.conversations[index].active = true;
        self.selected = Some(*conversation_id);
        Some(&self.conversations[index])
    }

    /// Append a message to the conversation it belongs to, then re-sort.
    pub fn apply_new_message(&mut self, message: Message) -> NewMessageOutcome {
        let Some(index) = self.position(&message.conversation_id) else {
            return NewMessageOutcome::UnknownConversation(message.conversation_id);
        };

        let conversation = &mut self.conversations[index];
        let outcome = NewMessageOutcome::Appended {
            conversation_id: conversation.public_id,
            sender_id: message.sender_id,
            sender: conversation.find_member(&message.sender_id).cloned(),
        };
        conversation.messages.push(message);

        self.sort_by_last_message();
        outcome
    }

    /// Mark the listed messages as read.
    ///
    /// Only applies to the selected conversation; receipts for any other
    /// conversation are ignored. Returns the number of messages updated.
    pub fn mark_viewed(&mut self, viewed: &ConversationViewed) -> usize {
        if self.selected != Some(viewed.conversation_id) {
            return 0;
        }
        let Some(index) = self.position(&viewed.conversation_id) else {
            return 0;
        };

        let mut updated = 0;
        for message in self.conversations[index].messages.iter_mut() {
            if viewed.message_ids_viewed.contains(&message.public_id) {
                message.state = MessageSendState::Read;
                updated += 1;
            }
        }
        updated
    }

    /// Stable sort by last message send date, most recent first
    pub fn sort_by_last_message(&mut self) {
        self.conversations
            .sort_by_key(|conversation| Reverse(conversation.last_activity()));
    }

    pub fn clear(&mut self) {
        self.conversations.clear();
        self.selected = None;
    }
}
