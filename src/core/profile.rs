use serde::{Deserialize, Serialize};

use crate::{
    persist::{KvStore, PROFILE_KEY, PersistResult, load_json, save_json},
    report::Author,
};

/// Local user profile with contribution counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable author id stamped on submitted reports.
    pub id: String,
    /// Display name stamped on submitted reports.
    pub name: String,
    /// Contribution points earned so far.
    #[serde(default)]
    pub points: u64,
    /// Number of reports submitted.
    #[serde(default)]
    pub update_count: u64,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::guest()
    }
}

impl UserProfile {
    /// Fresh guest profile with zeroed counters.
    pub fn guest() -> Self {
        let author = Author::guest();
        Self {
            id: author.id,
            name: author.name,
            points: 0,
            update_count: 0,
        }
    }

    /// Reads the profile saved under `user-storage`; a guest when absent.
    pub fn load(kv: &dyn KvStore) -> PersistResult<Self> {
        Ok(load_json::<Self>(kv, PROFILE_KEY)?.unwrap_or_default())
    }

    /// Overwrites the saved profile.
    pub fn save(&self, kv: &mut dyn KvStore) -> PersistResult<()> {
        save_json(kv, PROFILE_KEY, self)
    }

    /// Author identity for new report drafts.
    pub fn author(&self) -> Author {
        Author {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    /// Adds points, saturating at `u64::MAX`.
    pub fn add_points(&mut self, points: u64) {
        self.points = self.points.saturating_add(points);
    }

    pub fn increment_update_count(&mut self) {
        self.update_count = self.update_count.saturating_add(1);
    }

    /// Credits one submitted report.
    pub fn record_submission(&mut self, points: u64) {
        self.add_points(points);
        self.increment_update_count();
    }

    /// Back to the guest profile.
    pub fn reset(&mut self) {
        *self = Self::guest();
    }
}
