//! Domain layer
//!
//! Entities, value objects and the pure synchronization rules of the client.
//! Ports (`port`) describe what the domain needs from the outside world; the
//! infrastructure layer implements them.

pub mod conversation_list;
pub mod entity;
pub mod event;
pub mod port;
pub mod reconnect;
pub mod session;
pub mod state;
pub mod toast;
pub mod value_object;

pub use conversation_list::{ConversationList, NewMessageOutcome};
pub use entity::{
    BaseUser, ConnectedUser, Conversation, ConversationToCreate, ConversationViewed, Message,
    MessageSendState, MessageToSend, MessageType, SearchQuery,
};
pub use event::PushEvent;
pub use port::{AuthApi, ConversationApi, MessageApi, Navigator, UserSearchApi};
pub use session::SessionState;
pub use state::State;
pub use toast::{Toast, ToastId, ToastKind, ToastQueue};
pub use value_object::PublicId;
