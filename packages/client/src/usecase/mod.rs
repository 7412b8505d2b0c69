//! UseCase layer
//!
//! Services orchestrating the ports defined by the domain layer.

pub mod auth;
pub mod conversation;
pub mod synchronizer;
pub mod toast;
pub mod user_search;

pub use auth::{AuthService, OAuthConfig, SessionContext};
pub use conversation::ConversationService;
pub use synchronizer::{
    ConversationSynchronizer, ConversationsView, SyncInput, forward_session_changes,
};
pub use toast::ToastService;
pub use user_search::{SearchResults, UserSearchService};
