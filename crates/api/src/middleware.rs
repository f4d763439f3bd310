use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{DateTime, Utc};
use thiserror::Error;

use remi_auth::{AuthenticatedIdentity, TokenError, TokenSigner};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthFailure {
    #[error("missing credential")]
    MissingCredential,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error("credential rejected: {0}")]
    Rejected(#[from] TokenError),
}

/// Turns the `Authorization` header into an [`AuthenticatedIdentity`].
#[derive(Clone)]
pub struct AuthVerifier {
    signer: Arc<dyn TokenSigner>,
}

impl AuthVerifier {
    pub fn new(signer: Arc<dyn TokenSigner>) -> Self {
        Self { signer }
    }

    pub fn verify(
        &self,
        credential: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedIdentity, AuthFailure> {
        Ok(self.signer.verify(credential, now)?)
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedIdentity, AuthFailure> {
        let credential = extract_credential(headers)?;
        self.verify(credential, Utc::now())
    }
}

/// The token is the whole header value; a leading `Bearer ` is tolerated.
fn extract_credential(headers: &HeaderMap) -> Result<&str, AuthFailure> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthFailure::MissingCredential)?;

    let header = header.to_str().map_err(|_| AuthFailure::MalformedHeader)?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        return Err(AuthFailure::MissingCredential);
    }

    Ok(token)
}

pub fn apply_cors_headers(headers: &mut HeaderMap) {
    let any = HeaderValue::from_static("*");
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, any.clone());
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, any.clone());
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, any);
}
