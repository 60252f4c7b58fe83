use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    db::{ProfileKey, ProfileStore},
    error::AppResult,
    models::ProfileSnapshot,
};

/// In-process snapshot store
///
/// Entries never expire. Suited to tests and single-process hosts.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    entries: RwLock<HashMap<String, ProfileSnapshot>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn load(&self, key: &ProfileKey) -> AppResult<Option<ProfileSnapshot>> {
        Ok(self.entries.read().await.get(&key.to_string()).cloned())
    }

    async fn save(&self, key: &ProfileKey, snapshot: &ProfileSnapshot) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryScores, TimeRange};
    use chrono::Utc;

    fn create_test_snapshot(track_count: usize) -> ProfileSnapshot {
        ProfileSnapshot {
            scores: CategoryScores::neutral(),
            top_tags: Vec::new(),
            genres: Vec::new(),
            track_count,
            built_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_load_missing_key() {
        let store = MemoryProfileStore::new();
        let key = ProfileKey::Playlist("missing".to_string());
        assert_eq!(store.load(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_overwrites_and_keys_are_distinct() {
        let store = MemoryProfileStore::new();
        let short = ProfileKey::TopTracks {
            owner: "listener".to_string(),
            time_range: TimeRange::ShortTerm,
        };
        let long = ProfileKey::TopTracks {
            owner: "listener".to_string(),
            time_range: TimeRange::LongTerm,
        };

        store.save(&short, &create_test_snapshot(1)).await.unwrap();
        store.save(&short, &create_test_snapshot(2)).await.unwrap();
        store.save(&long, &create_test_snapshot(3)).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(store.load(&short).await.unwrap().unwrap().track_count, 2);
        assert_eq!(store.load(&long).await.unwrap().unwrap().track_count, 3);
    }
}
