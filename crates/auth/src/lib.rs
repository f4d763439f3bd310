//! `remi-auth`: credential and password primitives (no HTTP, no storage).
//!
//! The API crate decides *where* a credential comes from; this crate only
//! decides whether it is genuine and who it belongs to.

pub mod claims;
pub mod identity;
pub mod password;
pub mod token;

pub use claims::{CredentialClaims, TokenValidationError, validate_claims};
pub use identity::AuthenticatedIdentity;
pub use password::{Argon2PasswordHasher, PasswordError, PasswordHasher};
pub use token::{DEFAULT_TOKEN_TTL_SECS, Hs256TokenSigner, TokenError, TokenSigner};
