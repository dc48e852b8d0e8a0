//! Local favorites list, kept in the session store.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::MovieSummary;
use crate::error::FetchError;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

pub struct Favorites {
    store: Arc<dyn SessionStore>,
}

impl Favorites {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<MovieSummary>, FetchError> {
        Ok(self.store.load()?.favorites)
    }

    pub fn contains(&self, id: &str) -> Result<bool, FetchError> {
        Ok(self.store.load()?.favorites.iter().any(|m| m.id == id))
    }

    /// Add `movie` unless a movie with the same id is already there.
    pub fn add(&self, movie: &MovieSummary) -> Result<AddOutcome, FetchError> {
        if movie.id.is_empty() {
            return Err(FetchError::Validation("Movie has no id".to_string()));
        }

        let mut outcome = AddOutcome::AlreadyPresent;
        self.store.update(&mut |data| {
            if !data.favorites.iter().any(|m| m.id == movie.id) {
                data.favorites.push(movie.clone());
                outcome = AddOutcome::Added;
            }
        })?;
        debug!(id = %movie.id, ?outcome, "Favorite add");
        Ok(outcome)
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn remove(&self, id: &str) -> Result<bool, FetchError> {
        let mut removed = false;
        self.store.update(&mut |data| {
            let before = data.favorites.len();
            data.favorites.retain(|m| m.id != id);
            removed = data.favorites.len() != before;
        })?;
        Ok(removed)
    }

    pub fn clear(&self) -> Result<(), FetchError> {
        self.store.update(&mut |data| data.favorites.clear())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use crate::testing::fixtures;

    fn favorites() -> Favorites {
        Favorites::new(Arc::new(MemorySessionStore::new()))
    }

    #[test]
    fn test_duplicate_add() {
        let favorites = favorites();
        let alien = fixtures::movie("m1", "Alien", 1979, &["terror"]);

        assert_eq!(favorites.add(&alien).unwrap(), AddOutcome::Added);
        assert_eq!(favorites.add(&alien).unwrap(), AddOutcome::AlreadyPresent);
        assert_eq!(favorites.list().unwrap().len(), 1);
        assert!(favorites.contains("m1").unwrap());
    }

    #[test]
    fn test_remove_and_clear() {
        let favorites = favorites();
        favorites
            .add(&fixtures::movie("m1", "Alien", 1979, &[]))
            .unwrap();
        favorites
            .add(&fixtures::movie("m2", "Aliens", 1986, &[]))
            .unwrap();

        assert!(favorites.remove("m1").unwrap());
        assert!(!favorites.remove("m1").unwrap());
        assert_eq!(favorites.list().unwrap().len(), 1);

        favorites.clear().unwrap();
        assert!(favorites.list().unwrap().is_empty());
    }

    #[test]
    fn test_movie_without_id_is_rejected() {
        let favorites = favorites();
        let movie = fixtures::movie("", "Nameless", 2000, &[]);
        assert!(matches!(favorites.add(&movie), Err(FetchError::Validation(_))));
    }
}
