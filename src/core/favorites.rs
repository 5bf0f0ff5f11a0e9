use serde::{Deserialize, Serialize};

use crate::{
    persist::{FAVORITES_KEY, KvStore, PersistResult, load_json, save_json},
    types::PlaceId,
};

/// Favorited places in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FavoriteSet {
    #[serde(default)]
    favorites: Vec<PlaceId>,
}

impl FavoriteSet {
    /// No favorites.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the set saved under `favorites-storage`; empty when absent.
    ///
    /// Duplicate ids in a stored blob are dropped, first occurrence wins.
    pub fn load(kv: &dyn KvStore) -> PersistResult<Self> {
        let mut set = load_json::<Self>(kv, FAVORITES_KEY)?.unwrap_or_default();
        set.dedup();
        Ok(set)
    }

    /// Overwrites the saved set.
    pub fn save(&self, kv: &mut dyn KvStore) -> PersistResult<()> {
        save_json(kv, FAVORITES_KEY, self)
    }

    /// Appends `place_id` unless it is already present.
    pub fn add(&mut self, place_id: &str) {
        if !self.contains(place_id) {
            self.favorites.push(place_id.to_string());
        }
    }

    /// Removes `place_id`; unknown ids are ignored.
    pub fn remove(&mut self, place_id: &str) {
        self.favorites.retain(|id| id != place_id);
    }

    /// Flips membership; returns true when `place_id` is now a favorite.
    pub fn toggle(&mut self, place_id: &str) -> bool {
        if self.contains(place_id) {
            self.remove(place_id);
            false
        } else {
            self.add(place_id);
            true
        }
    }

    /// Whether `place_id` is a favorite.
    pub fn contains(&self, place_id: &str) -> bool {
        self.favorites.iter().any(|id| id == place_id)
    }

    /// Favorites in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.favorites.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    fn dedup(&mut self) {
        let mut seen = hashbrown::HashSet::new();
        self.favorites.retain(|id| seen.insert(id.clone()));
    }
}
