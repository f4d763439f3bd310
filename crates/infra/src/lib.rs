//! Infrastructure layer: stored records and the repositories that hold them.

pub mod entities;
pub mod repositories;

pub use entities::{Movie, User};
pub use repositories::{
    DEFAULT_PAGE_LIMIT, InMemoryMovieRepository, InMemoryUserRepository, ListMoviesFilter,
    MovieRepository, PostgresMovieRepository, PostgresUserRepository, RepositoryError,
    UserRepository, ensure_schema,
};
