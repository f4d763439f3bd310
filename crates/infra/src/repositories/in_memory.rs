use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use remi_core::{MovieId, UserId};

use super::{ListMoviesFilter, MovieRepository, RepositoryError, UserRepository};
use crate::entities::{Movie, User};

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let mut map = self.inner.write().map_err(|_| RepositoryError::Unavailable)?;

        if map.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        if map.contains_key(&user.id) {
            return Err(RepositoryError::Conflict(format!("user {} already exists", user.id)));
        }

        map.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Unavailable)?;
        Ok(map.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Unavailable)?;
        Ok(map.get(&id).cloned())
    }

    async fn list(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Unavailable)?;
        let mut seen = std::collections::HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| map.get(id).cloned())
            .collect())
    }
}

/// In-memory movie store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryMovieRepository {
    inner: RwLock<HashMap<MovieId, Movie>>,
}

impl InMemoryMovieRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MovieRepository for InMemoryMovieRepository {
    async fn create(&self, movie: &Movie) -> Result<(), RepositoryError> {
        let mut map = self.inner.write().map_err(|_| RepositoryError::Unavailable)?;
        if map.contains_key(&movie.id) {
            return Err(RepositoryError::Conflict(format!("movie {} already exists", movie.id)));
        }
        map.insert(movie.id, movie.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: MovieId) -> Result<Option<Movie>, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Unavailable)?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_id_and_user(
        &self,
        id: MovieId,
        user_id: UserId,
    ) -> Result<Option<Movie>, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Unavailable)?;
        Ok(map.get(&id).filter(|m| m.shared_by == user_id).cloned())
    }

    async fn list(&self, filter: &ListMoviesFilter) -> Result<Vec<Movie>, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Unavailable)?;

        let mut movies: Vec<Movie> = map
            .values()
            .filter(|m| filter.shared_by.is_none_or(|u| m.shared_by == u))
            .cloned()
            .collect();

        // Ids are UUIDv7, so they break created_at ties in creation order.
        movies.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });

        Ok(movies
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn movie(owner: UserId, name: &str, age_secs: i64) -> Movie {
        let at = Utc::now() - Duration::seconds(age_secs);
        Movie {
            id: MovieId::new(),
            name: name.to_string(),
            description: "d".into(),
            link: "https://www.youtube.com/watch?v=abc".into(),
            thumbnail: "https://img.youtube.com/vi/abc/0.jpg".into(),
            shared_by: owner,
            shared_at: at,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let repo = InMemoryUserRepository::new();
        let now = Utc::now();
        repo.create(&User::new("bob", "h", "Bob", now)).await.unwrap();

        let err = repo.create(&User::new("bob", "h2", "Other Bob", now)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn lookups_signal_absence_with_none() {
        let repo = InMemoryUserRepository::new();
        let user = User::new("carol", "h", "Carol", Utc::now());
        repo.create(&user).await.unwrap();

        assert_eq!(repo.find_by_username("carol").await.unwrap(), Some(user.clone()));
        assert_eq!(repo.find_by_id(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(repo.find_by_username("dave").await.unwrap(), None);
        assert_eq!(repo.find_by_id(UserId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_users_skips_unknown_and_duplicate_ids() {
        let repo = InMemoryUserRepository::new();
        let a = User::new("a", "h", "A", Utc::now());
        let b = User::new("b", "h", "B", Utc::now());
        repo.create(&a).await.unwrap();
        repo.create(&b).await.unwrap();

        let found = repo.list(&[a.id, UserId::new(), a.id, b.id]).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn movies_list_newest_first_with_paging() {
        let repo = InMemoryMovieRepository::new();
        let owner = UserId::new();
        for (name, age) in [("old", 30), ("mid", 20), ("new", 10)] {
            repo.create(&movie(owner, name, age)).await.unwrap();
        }

        let all = repo.list(&ListMoviesFilter::default()).await.unwrap();
        let names: Vec<_> = all.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["new", "mid", "old"]);

        let page = repo
            .list(&ListMoviesFilter { offset: 1, limit: 1, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "mid");
    }

    #[tokio::test]
    async fn ownership_filters_apply() {
        let repo = InMemoryMovieRepository::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let mine = movie(alice, "mine", 5);
        repo.create(&mine).await.unwrap();
        repo.create(&movie(bob, "theirs", 5)).await.unwrap();

        assert!(repo.find_by_id_and_user(mine.id, alice).await.unwrap().is_some());
        assert!(repo.find_by_id_and_user(mine.id, bob).await.unwrap().is_none());
        assert!(repo.find_by_id(mine.id).await.unwrap().is_some());

        let only_alice = repo
            .list(&ListMoviesFilter { shared_by: Some(alice), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(only_alice.len(), 1);
        assert_eq!(only_alice[0].name, "mine");
    }

    #[tokio::test]
    async fn records_are_keyed_by_their_id() {
        let repo = InMemoryMovieRepository::new();
        let first = movie(UserId::new(), "first", 5);
        repo.create(&first).await.unwrap();

        let mut again = movie(UserId::new(), "again", 1);
        again.id = first.id;
        let err = repo.create(&again).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.find_by_id(first.id).await.unwrap().unwrap().name, "first");

        let users = InMemoryUserRepository::new();
        let user = User::new("erin", "h", "Erin", Utc::now());
        users.create(&user).await.unwrap();
        let mut clone = User::new("frank", "h", "Frank", Utc::now());
        clone.id = user.id;
        assert!(matches!(
            users.create(&clone).await.unwrap_err(),
            RepositoryError::Conflict(_)
        ));
    }
}
