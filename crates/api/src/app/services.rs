//! Service wiring and the JSON business handlers.
//!
//! - `AppServices`: the collaborators (repositories, hasher, signer)
//! - `UserService`: register / login
//! - `MovieService`: share and browse movies

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Query;
use axum::http::Uri;
use chrono::Utc;
use tracing::{error, info};

use remi_auth::{
    Argon2PasswordHasher, AuthenticatedIdentity, Hs256TokenSigner, PasswordHasher, TokenSigner,
};
use remi_core::{MovieId, ServiceError, ServiceResult, UserId};
use remi_infra::{
    InMemoryMovieRepository, InMemoryUserRepository, Movie, MovieRepository,
    PostgresMovieRepository, PostgresUserRepository, RepositoryError, User, UserRepository,
};

use crate::app::dto::{
    CreateMovieRequest, CreateMovieResponse, GetMovieByUserRequest, ListMoviesRequest,
    ListMoviesResponse, LoginRequest, LoginResponse, MovieView, RegisterRequest,
    RegisterResponse,
};
use crate::context::RequestContext;

#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserRepository>,
    pub movies: Arc<dyn MovieRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub signer: Arc<dyn TokenSigner>,
}

impl AppServices {
    /// Process-local stores; state is lost on restart.
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            movies: Arc::new(InMemoryMovieRepository::new()),
            hasher: Arc::new(Argon2PasswordHasher::new()),
            signer: Arc::new(Hs256TokenSigner::new(jwt_secret)),
        }
    }

    pub async fn postgres(database_url: &str, jwt_secret: &str) -> anyhow::Result<Self> {
        let pool = sqlx::PgPool::connect(database_url).await?;
        remi_infra::ensure_schema(&pool).await?;

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            movies: Arc::new(PostgresMovieRepository::new(pool)),
            hasher: Arc::new(Argon2PasswordHasher::new()),
            signer: Arc::new(Hs256TokenSigner::new(jwt_secret)),
        })
    }

    pub fn user_service(&self) -> Arc<UserService> {
        Arc::new(UserService {
            users: self.users.clone(),
            hasher: self.hasher.clone(),
            signer: self.signer.clone(),
        })
    }

    pub fn movie_service(&self) -> Arc<MovieService> {
        Arc::new(MovieService {
            users: self.users.clone(),
            movies: self.movies.clone(),
        })
    }
}

/// Log the storage cause and hand the caller a short message.
fn storage_error(context: &'static str) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |err| {
        error!(error = %err, "{context}");
        ServiceError::internal(context)
    }
}

// -------------------------
// Users
// -------------------------

pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    signer: Arc<dyn TokenSigner>,
}

impl UserService {
    pub async fn register(
        self: Arc<Self>,
        _ctx: RequestContext,
        req: RegisterRequest,
    ) -> ServiceResult<RegisterResponse> {
        req.validate()?;

        let existing = self
            .users
            .find_by_username(&req.username)
            .await
            .map_err(storage_error("can't look up user"))?;
        if existing.is_some() {
            return Err(user_exists());
        }

        let hash = self.hasher.hash(&req.password).map_err(|e| {
            error!(error = %e, "password hashing failed");
            ServiceError::internal("can't register user")
        })?;
        let user = User::new(req.username, hash, req.name, Utc::now());

        match self.users.create(&user).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration.
            Err(RepositoryError::Conflict(_)) => return Err(user_exists()),
            Err(e) => return Err(storage_error("can't create user")(e)),
        }

        info!(user_id = %user.id, "user registered");
        Ok(RegisterResponse {})
    }

    pub async fn login(
        self: Arc<Self>,
        _ctx: RequestContext,
        req: LoginRequest,
    ) -> ServiceResult<LoginResponse> {
        req.validate()?;

        let user = self
            .users
            .find_by_username(&req.username)
            .await
            .map_err(storage_error("can't look up user"))?
            .ok_or_else(bad_credentials)?;

        let matches = self
            .hasher
            .verify(&req.password, &user.password_hash)
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "stored password hash unreadable");
                ServiceError::internal("can't verify password")
            })?;
        if !matches {
            return Err(bad_credentials());
        }

        let identity = AuthenticatedIdentity::new(user.id, user.username.clone());
        let token = self.signer.sign(&identity, Utc::now()).map_err(|e| {
            error!(error = %e, "token signing failed");
            ServiceError::internal("can't issue token")
        })?;

        Ok(LoginResponse {
            id: user.id,
            username: user.username,
            name: user.name,
            token,
        })
    }
}

fn user_exists() -> ServiceError {
    ServiceError::invalid_argument("user exists with the given username")
}

fn bad_credentials() -> ServiceError {
    ServiceError::unauthorized("incorrect username/pwd")
}

// -------------------------
// Movies
// -------------------------

pub struct MovieService {
    users: Arc<dyn UserRepository>,
    movies: Arc<dyn MovieRepository>,
}

/// The `v` parameter of a YouTube watch link.
pub fn youtube_video_id(link: &str) -> Option<String> {
    let uri: Uri = link.trim().parse().ok()?;
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&uri).ok()?;
    params.get("v").filter(|v| !v.is_empty()).cloned()
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/0.jpg")
}

pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}")
}

impl MovieService {
    pub async fn create(
        self: Arc<Self>,
        ctx: RequestContext,
        req: CreateMovieRequest,
    ) -> ServiceResult<CreateMovieResponse> {
        let user_id = ctx.user_id()?;
        req.validate()?;

        if !req.link.contains("youtube.com") {
            return Err(ServiceError::invalid_argument("we only support link youtube"));
        }
        let video_id = youtube_video_id(&req.link).ok_or_else(|| {
            ServiceError::invalid_argument("link is missing the youtube video id")
        })?;

        let now = Utc::now();
        let movie = Movie {
            id: MovieId::new(),
            name: req.name,
            description: req.description,
            link: req.link,
            thumbnail: thumbnail_url(&video_id),
            shared_by: user_id,
            shared_at: now,
            created_at: now,
            updated_at: now,
        };

        self.movies
            .create(&movie)
            .await
            .map_err(storage_error("can't create movie"))?;

        info!(movie_id = %movie.id, user_id = %user_id, "movie shared");
        Ok(CreateMovieResponse { id: movie.id })
    }

    pub async fn get_by_user(
        self: Arc<Self>,
        ctx: RequestContext,
        req: GetMovieByUserRequest,
    ) -> ServiceResult<MovieView> {
        let user_id = ctx.user_id()?;
        req.validate()?;

        let not_found = || ServiceError::invalid_argument(format!("movie ({}) not found", req.id));
        let movie_id: MovieId = req.id.parse().map_err(|_| not_found())?;

        let movie = self
            .movies
            .find_by_id_and_user(movie_id, user_id)
            .await
            .map_err(storage_error("can't look up movie"))?
            .ok_or_else(not_found)?;

        let owner = self.owner_name(user_id).await?;
        Ok(MovieView::from_movie(movie, owner))
    }

    pub async fn list_by_user(
        self: Arc<Self>,
        ctx: RequestContext,
        req: ListMoviesRequest,
    ) -> ServiceResult<ListMoviesResponse> {
        let user_id = ctx.user_id()?;
        let paging = req.paging()?;

        let movies = self
            .movies
            .list(&paging.filter(Some(user_id)))
            .await
            .map_err(storage_error("can't list movies"))?;

        let owner = self.owner_name(user_id).await?;
        Ok(ListMoviesResponse {
            movies: movies
                .into_iter()
                .map(|m| MovieView::from_movie(m, owner.clone()))
                .collect(),
            paging,
        })
    }

    pub async fn list(
        self: Arc<Self>,
        _ctx: RequestContext,
        req: ListMoviesRequest,
    ) -> ServiceResult<ListMoviesResponse> {
        let paging = req.paging()?;

        let movies = self
            .movies
            .list(&paging.filter(None))
            .await
            .map_err(storage_error("can't list movies"))?;

        let sharer_ids: Vec<UserId> = movies.iter().map(|m| m.shared_by).collect();
        let names: HashMap<UserId, String> = self
            .users
            .list(&sharer_ids)
            .await
            .map_err(storage_error("can't list users"))?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        Ok(ListMoviesResponse {
            movies: movies
                .into_iter()
                .map(|m| {
                    let name = names.get(&m.shared_by).cloned().unwrap_or_default();
                    MovieView::from_movie(m, name)
                })
                .collect(),
            paging,
        })
    }

    /// A stored movie with its sharer's display name, for the embed page.
    pub async fn find_with_sharer(&self, id: MovieId) -> ServiceResult<Option<(Movie, User)>> {
        let Some(movie) = self
            .movies
            .find_by_id(id)
            .await
            .map_err(storage_error("can't look up movie"))?
        else {
            return Ok(None);
        };

        let sharer = self
            .users
            .find_by_id(movie.shared_by)
            .await
            .map_err(storage_error("can't look up user"))?;
        Ok(sharer.map(|user| (movie, user)))
    }

    async fn owner_name(&self, user_id: UserId) -> ServiceResult<String> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(storage_error("can't look up user"))?
            .ok_or_else(|| ServiceError::internal("sharer no longer exists"))?;
        Ok(user.name)
    }
}
