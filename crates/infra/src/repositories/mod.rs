//! Repository contracts for users and movies.
//!
//! Lookups return `Ok(None)` for "not found"; `Err` is reserved for storage
//! failures. Callers wrap errors into their own error type at the boundary.

use async_trait::async_trait;
use thiserror::Error;

use remi_core::{MovieId, UserId};

use crate::entities::{Movie, User};

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryMovieRepository, InMemoryUserRepository};
pub use postgres::{PostgresMovieRepository, PostgresUserRepository, ensure_schema};

/// Default page size when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Storage-level failure.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("store unavailable")]
    Unavailable,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some("23505") {
                return RepositoryError::Conflict(db.message().to_string());
            }
        }
        RepositoryError::Database(err.to_string())
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `Conflict` when the username is taken.
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Fetch every user whose id is in `ids`. Unknown ids are skipped; order is unspecified.
    async fn list(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError>;
}

/// Filter + offset paging for movie listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMoviesFilter {
    /// Restrict to movies shared by this user.
    pub shared_by: Option<UserId>,
    pub offset: u32,
    pub limit: u32,
}

impl Default for ListMoviesFilter {
    fn default() -> Self {
        Self {
            shared_by: None,
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn create(&self, movie: &Movie) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: MovieId) -> Result<Option<Movie>, RepositoryError>;

    /// Like `find_by_id`, but only matches movies shared by `user_id`.
    async fn find_by_id_and_user(
        &self,
        id: MovieId,
        user_id: UserId,
    ) -> Result<Option<Movie>, RepositoryError>;

    /// Newest first (by `created_at`), then paged.
    async fn list(&self, filter: &ListMoviesFilter) -> Result<Vec<Movie>, RepositoryError>;
}
