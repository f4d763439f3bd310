use serde::{Deserialize, Serialize};

use remi_core::UserId;

/// Identity of the caller, derived from a verified credential.
///
/// Lives for exactly one request; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    user_id: UserId,
    username: String,
}

impl AuthenticatedIdentity {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
