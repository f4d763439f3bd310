use remi_auth::AuthenticatedIdentity;
use remi_core::{ServiceError, ServiceResult, UserId};

/// Per-request execution context handed to every JSON handler.
///
/// Carries the caller's identity when the route required one. Built by the
/// dispatcher for a single request and dropped with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    identity: Option<AuthenticatedIdentity>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(identity: AuthenticatedIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn identity(&self) -> Option<&AuthenticatedIdentity> {
        self.identity.as_ref()
    }

    /// The caller's identity, or `Unauthorized` when the context is anonymous.
    pub fn require_identity(&self) -> ServiceResult<&AuthenticatedIdentity> {
        self.identity
            .as_ref()
            .ok_or_else(|| ServiceError::unauthorized("unauthorized"))
    }

    pub fn user_id(&self) -> ServiceResult<UserId> {
        self.require_identity().map(|i| i.user_id())
    }
}
