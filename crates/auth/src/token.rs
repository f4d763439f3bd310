//! Credential signing and verification (HS256 JWT).

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{CredentialClaims, TokenValidationError, validate_claims};
use crate::identity::AuthenticatedIdentity;

/// Lifetime of a credential issued at login, in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 2 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a JWT, bad signature, wrong algorithm, missing claims.
    #[error("malformed or forged token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issues and checks credentials.
///
/// `now` is passed in so expiry is deterministic under test.
pub trait TokenSigner: Send + Sync {
    fn sign(
        &self,
        identity: &AuthenticatedIdentity,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError>;

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AuthenticatedIdentity, TokenError>;
}

/// HMAC-SHA256 signer keyed by the server-held secret.
pub struct Hs256TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self::with_ttl(secret, Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
    }

    pub fn with_ttl(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks are done by `validate_claims` against the injected clock.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);
        validation
    }
}

impl core::fmt::Debug for Hs256TokenSigner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenSigner for Hs256TokenSigner {
    fn sign(
        &self,
        identity: &AuthenticatedIdentity,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = CredentialClaims {
            id: identity.user_id(),
            username: identity.username().to_string(),
            issued_at: now,
            expires_at: now + self.ttl,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AuthenticatedIdentity, TokenError> {
        let data =
            jsonwebtoken::decode::<CredentialClaims>(token, &self.decoding, &Self::validation())
                .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if let Err(e) = validate_claims(&data.claims, now) {
            tracing::debug!(user_id = %data.claims.id, error = %e, "credential outside its time window");
            return Err(e.into());
        }

        Ok(AuthenticatedIdentity::new(
            data.claims.id,
            data.claims.username,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remi_core::UserId;

    fn alice() -> AuthenticatedIdentity {
        AuthenticatedIdentity::new(UserId::new(), "alice")
    }

    #[test]
    fn signed_token_verifies_to_same_identity() {
        let signer = Hs256TokenSigner::new("test-secret");
        let now = Utc::now();
        let who = alice();

        let token = signer.sign(&who, now).unwrap();
        let back = signer.verify(&token, now).unwrap();

        assert_eq!(back, who);
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = Hs256TokenSigner::new("test-secret");
        let issued = Utc::now() - Duration::hours(3);
        let token = signer.sign(&alice(), issued).unwrap();

        let err = signer.verify(&token, Utc::now()).unwrap_err();
        assert_eq!(err, TokenError::Claims(TokenValidationError::Expired));
    }

    #[test]
    fn tokens_live_for_the_default_ttl() {
        let signer = Hs256TokenSigner::new("test-secret");
        let issued = Utc::now();
        let token = signer.sign(&alice(), issued).unwrap();
        let ttl = Duration::seconds(DEFAULT_TOKEN_TTL_SECS);

        assert!(signer.verify(&token, issued + ttl - Duration::minutes(1)).is_ok());
        assert_eq!(
            signer.verify(&token, issued + ttl + Duration::minutes(1)).unwrap_err(),
            TokenError::Claims(TokenValidationError::Expired)
        );
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let ours = Hs256TokenSigner::new("test-secret");
        let theirs = Hs256TokenSigner::new("other-secret");
        let now = Utc::now();
        let token = theirs.sign(&alice(), now).unwrap();

        assert!(matches!(ours.verify(&token, now), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        let signer = Hs256TokenSigner::new("test-secret");
        for token in ["", "abc", "a.b.c", "Bearer x.y.z"] {
            assert!(
                matches!(signer.verify(token, Utc::now()), Err(TokenError::Invalid(_))),
                "accepted {token:?}"
            );
        }
    }

    #[test]
    fn token_without_exp_is_rejected() {
        #[derive(serde::Serialize)]
        struct NoExp {
            id: String,
            username: String,
            iat: i64,
        }

        let now = Utc::now();
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &NoExp {
                id: UserId::new().to_string(),
                username: "alice".into(),
                iat: now.timestamp(),
            },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let signer = Hs256TokenSigner::new("test-secret");
        assert!(matches!(signer.verify(&token, now), Err(TokenError::Invalid(_))));
    }
}
