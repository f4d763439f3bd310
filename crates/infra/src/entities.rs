//! Records as they are persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use remi_core::{MovieId, UserId};

/// A registered account. `password_hash` is whatever the configured
/// password hasher produced; it never leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            password_hash: password_hash.into(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A shared video link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub name: String,
    pub description: String,
    pub link: String,
    pub thumbnail: String,
    /// The user who shared it.
    pub shared_by: UserId,
    pub shared_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
