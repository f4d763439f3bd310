use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use remi_core::{MovieId, ServiceError, ServiceResult, UserId};
use remi_infra::{ListMoviesFilter, Movie};

/// Largest page a caller may ask for.
pub const MAX_PAGE_LIMIT: i64 = 100;

fn require(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::invalid_argument(format!("{field} can't be null")));
    }
    Ok(())
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub name: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> ServiceResult<()> {
        require("username", &self.username)?;
        require("password", &self.password)?;
        require("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> ServiceResult<()> {
        require("username", &self.username)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateMovieRequest {
    pub name: String,
    pub description: String,
    pub link: String,
}

impl CreateMovieRequest {
    pub fn validate(&self) -> ServiceResult<()> {
        require("name", &self.name)?;
        require("link", &self.link)?;
        require("description", &self.description)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetMovieByUserRequest {
    pub id: String,
}

impl GetMovieByUserRequest {
    pub fn validate(&self) -> ServiceResult<()> {
        require("id", &self.id)
    }
}

/// Offset paging for both listing routes. Absent fields take defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListMoviesRequest {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl ListMoviesRequest {
    /// Apply defaults and the cap. Negative values and offsets past
    /// `u32::MAX` are rejected.
    pub fn paging(&self) -> ServiceResult<OffsetPaging> {
        let offset = self.offset.unwrap_or(0);
        let limit = self
            .limit
            .unwrap_or(i64::from(remi_infra::DEFAULT_PAGE_LIMIT));

        if offset < 0 {
            return Err(ServiceError::invalid_argument("offset can't be negative"));
        }
        if limit < 0 {
            return Err(ServiceError::invalid_argument("limit can't be negative"));
        }
        let offset = u32::try_from(offset).map_err(|_| {
            ServiceError::invalid_argument(format!("offset can't exceed {}", u32::MAX))
        })?;

        Ok(OffsetPaging {
            offset,
            limit: u32::try_from(limit.min(MAX_PAGE_LIMIT)).unwrap_or(0),
        })
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMovieResponse {
    pub id: MovieId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetPaging {
    pub offset: u32,
    pub limit: u32,
}

impl OffsetPaging {
    pub fn filter(self, shared_by: Option<UserId>) -> ListMoviesFilter {
        ListMoviesFilter {
            shared_by,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// A movie as clients see it: `shared_by` is the sharer's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieView {
    pub id: MovieId,
    pub name: String,
    pub description: String,
    pub link: String,
    pub thumbnail: String,
    pub shared_by: String,
    pub shared_at: DateTime<Utc>,
}

impl MovieView {
    pub fn from_movie(movie: Movie, shared_by: impl Into<String>) -> Self {
        Self {
            id: movie.id,
            name: movie.name,
            description: movie.description,
            link: movie.link,
            thumbnail: movie.thumbnail,
            shared_by: shared_by.into(),
            shared_at: movie.shared_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMoviesResponse {
    pub movies: Vec<MovieView>,
    pub paging: OffsetPaging,
}
