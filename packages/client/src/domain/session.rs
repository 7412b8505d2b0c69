//! Session state of the client.

use super::{entity::ConnectedUser, value_object::PublicId};

/// Who is using the client.
///
/// Starts as `Unresolved` until the authentication check completes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Unresolved,
    Anonymous,
    Authenticated(ConnectedUser),
}

impl SessionState {
    pub fn user(&self) -> Option<&ConnectedUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<PublicId> {
        self.user().map(|user| user.public_id)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}
