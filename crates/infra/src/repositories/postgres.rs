//! Postgres-backed repositories.
//!
//! ## Error Mapping
//!
//! | SQLx error | Postgres code | RepositoryError |
//! |------------|---------------|-----------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | anything else | * | `Database` |

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use remi_core::{MovieId, UserId};

use super::{ListMoviesFilter, MovieRepository, RepositoryError, UserRepository};
use crate::entities::{Movie, User};

const USER_COLUMNS: &str = "id, username, password, name, created_at, updated_at";
const MOVIE_COLUMNS: &str =
    "id, name, description, link, thumbnail, shared_by, shared_at, created_at, updated_at";

/// Create the `users` and `movies` tables if they are missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id          UUID PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            name        TEXT NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL,
            updated_at  TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            id          UUID PRIMARY KEY,
            name        TEXT NOT NULL,
            description TEXT NOT NULL,
            link        TEXT NOT NULL,
            thumbnail   TEXT NOT NULL,
            shared_by   UUID NOT NULL REFERENCES users(id),
            shared_at   TIMESTAMPTZ NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL,
            updated_at  TIMESTAMPTZ NOT NULL,
            deleted_at  TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS movies_created_at_idx ON movies (created_at DESC)")
        .execute(pool)
        .await?;

    Ok(())
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId::from_uuid(row.try_get("id")?),
        username: row.try_get("username")?,
        password_hash: row.try_get("password")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn movie_from_row(row: &PgRow) -> Result<Movie, sqlx::Error> {
    Ok(Movie {
        id: MovieId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        link: row.try_get("link")?,
        thumbnail: row.try_get("thumbnail")?,
        shared_by: UserId::from_uuid(row.try_get("shared_by")?),
        shared_at: row.try_get("shared_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: Arc<PgPool>,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"
        ))
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() != 1 {
            return Err(RepositoryError::Database("can't insert user".into()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn list(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&*self.pool)
            .await?;

        rows.iter()
            .map(|r| user_from_row(r).map_err(RepositoryError::from))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PostgresMovieRepository {
    pool: Arc<PgPool>,
}

impl PostgresMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl MovieRepository for PostgresMovieRepository {
    #[instrument(skip(self, movie), fields(movie_id = %movie.id))]
    async fn create(&self, movie: &Movie) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!(
            "INSERT INTO movies ({MOVIE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(movie.id.as_uuid())
        .bind(&movie.name)
        .bind(&movie.description)
        .bind(&movie.link)
        .bind(&movie.thumbnail)
        .bind(movie.shared_by.as_uuid())
        .bind(movie.shared_at)
        .bind(movie.created_at)
        .bind(movie.updated_at)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() != 1 {
            return Err(RepositoryError::Database("can't insert movie".into()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: MovieId) -> Result<Option<Movie>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.as_ref().map(movie_from_row).transpose()?)
    }

    #[instrument(skip(self))]
    async fn find_by_id_and_user(
        &self,
        id: MovieId,
        user_id: UserId,
    ) -> Result<Option<Movie>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies \
             WHERE id = $1 AND shared_by = $2 AND deleted_at IS NULL"
        ))
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.as_ref().map(movie_from_row).transpose()?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &ListMoviesFilter) -> Result<Vec<Movie>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies \
             WHERE ($1::UUID IS NULL OR shared_by = $1) AND deleted_at IS NULL \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(filter.shared_by.map(|u| *u.as_uuid()))
        .bind(i64::from(filter.limit))
        .bind(i64::from(filter.offset))
        .fetch_all(&*self.pool)
        .await?;

        rows.iter()
            .map(|r| movie_from_row(r).map_err(RepositoryError::from))
            .collect()
    }
}
