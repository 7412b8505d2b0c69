//! Message formatting utilities for terminal display.

use std::sync::Arc;

use wac_shared::time::{Clock, humanize_since, to_local_rfc3339};

use crate::{
    domain::{BaseUser, Conversation, Message, PublicId, SessionState, State, Toast, ToastKind},
    usecase::ConversationsView,
};

const SEPARATOR: &str = "============================================================";
const NO_MESSAGES: &str = "No messages yet";

/// Message formatter for terminal display
#[derive(Clone)]
pub struct MessageFormatter {
    clock: Arc<dyn Clock>,
}

impl MessageFormatter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn since(&self, message: &Message) -> String {
        humanize_since(message.send_date, self.clock.now())
    }

    /// Format the conversation list, most recently active first
    ///
    /// # Arguments
    ///
    /// * `view` - Latest snapshot published by the synchronizer
    ///
    /// # Returns
    ///
    /// One numbered row per conversation with its title and last message.
    /// The selected conversation is marked with `*`.
    pub fn format_conversation_list(&self, view: &ConversationsView) -> String {
        let me = view.connected_user.as_ref().map(|user| user.public_id);
        let mut output = String::new();
        output.push_str(&format!("\n{}\nConversations:\n", SEPARATOR));

        if view.loading {
            output.push_str("(Loading conversations...)\n");
        } else if view.conversations.is_empty() {
            output.push_str("(No conversations)\n");
        } else {
            for (index, conversation) in view.conversations.iter().enumerate() {
                let marker = if view.selected == Some(conversation.public_id) {
                    "*"
                } else {
                    " "
                };
                output.push_str(&format!(
                    "{}{}. {} [{}]\n     {}\n",
                    marker,
                    index + 1,
                    conversation.title_for(me.as_ref()),
                    conversation.public_id.short(),
                    self.format_subtitle(conversation)
                ));
            }
        }

        output.push_str(SEPARATOR);
        output.push('\n');
        output
    }

    /// Last message preview of a conversation, with its age
    pub fn format_subtitle(&self, conversation: &Conversation) -> String {
        match conversation.last_message() {
            Some(message) => format!("{} · {}", message.text_content, self.since(message)),
            None => NO_MESSAGES.to_string(),
        }
    }

    /// Format all messages of a conversation
    ///
    /// # Arguments
    ///
    /// * `conversation` - The conversation to display
    /// * `me` - The connected user, whose messages carry a delivery indicator
    pub fn format_conversation(
        &self,
        conversation: &Conversation,
        me: Option<&PublicId>,
    ) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\n{}\n{} [{}]\n",
            SEPARATOR,
            conversation.title_for(me),
            conversation.public_id
        ));

        if conversation.messages.is_empty() {
            output.push_str(&format!("({})\n", NO_MESSAGES));
        } else {
            for message in &conversation.messages {
                output.push_str(&self.format_message(message, conversation, me));
            }
        }

        output.push_str(SEPARATOR);
        output.push('\n');
        output
    }

    /// Format a single message line
    ///
    /// # Returns
    ///
    /// `@sender: text (age)`, followed by the send-state indicator for the
    /// connected user's own messages
    pub fn format_message(
        &self,
        message: &Message,
        conversation: &Conversation,
        me: Option<&PublicId>,
    ) -> String {
        let is_mine = me == Some(&message.sender_id);
        let sender = if is_mine {
            "me".to_string()
        } else {
            conversation
                .find_member(&message.sender_id)
                .map(BaseUser::display_name)
                .unwrap_or_else(|| message.sender_id.short())
        };

        let mut line = format!(
            "@{}: {} ({})",
            sender,
            message.text_content,
            self.since(message)
        );
        if is_mine {
            line.push(' ');
            line.push_str(message.state.indicator());
        }
        line.push('\n');
        line
    }

    pub fn format_toast(toast: &Toast) -> String {
        let prefix = match toast.kind {
            ToastKind::Success => "[ok]",
            ToastKind::Danger => "[error]",
        };
        format!("{} {}\n", prefix, toast.body)
    }

    /// Format the outcome of a user search
    ///
    /// # Returns
    ///
    /// A numbered list usable with `/pick`, or a status line while loading,
    /// when nothing matched and on failure
    pub fn format_search_results(state: &State<Vec<BaseUser>>) -> String {
        match state {
            State::Loading => "Searching...\n".to_string(),
            State::Success(users) if users.is_empty() => "No user found\n".to_string(),
            State::Success(users) => {
                let mut output = String::from("Users:\n");
                for (index, user) in users.iter().enumerate() {
                    output.push_str(&format!(
                        "{}. {} <{}>\n",
                        index + 1,
                        user.display_name(),
                        user.email
                    ));
                }
                output.push_str("Type /pick <n> to start a conversation\n");
                output
            }
            State::Failure(e) => format!("Search failed: {}\n", e),
        }
    }

    pub fn format_session(state: &SessionState) -> String {
        match state {
            SessionState::Unresolved => "Checking authentication...\n".to_string(),
            SessionState::Anonymous => {
                "Not logged in. Use /login to get a login link or /login <token>.\n".to_string()
            }
            SessionState::Authenticated(user) => {
                format!(
                    "Logged in as {} {} <{}>\n",
                    user.first_name, user.last_name, user.email
                )
            }
        }
    }

    /// Format a message that arrived in the conversation currently open
    pub fn format_incoming(&self, message: &Message, conversation: &Conversation) -> String {
        format!(
            "\n{} at {}",
            self.format_message(message, conversation, None).trim_end(),
            to_local_rfc3339(message.send_date)
        )
    }

    pub fn format_help() -> String {
        [
            "Commands:",
            "  /login [token]     show the login link, or log in with an access token",
            "  /logout            log out",
            "  /profile           show the account page link",
            "  /list              list conversations",
            "  /open <n|uuid>     open a conversation",
            "  /new <user-uuid>   open or start a conversation with a user",
            "  /delete <n|uuid>   delete a conversation",
            "  /search <text>     search users",
            "  /pick <n>          start a conversation with the n-th search result",
            "  /quit              exit",
            "  <text>             send a message to the open conversation",
            "",
        ]
        .join("\n")
    }
}
