//! `remi-core`: shared building blocks for the Remi service.
//!
//! Pure types only: identifiers and the structured error taxonomy that every
//! handler returns. No HTTP, no storage.

pub mod error;
pub mod id;

pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use id::{MovieId, UserId};
