//! Profile snapshot storage
//!
//! The engine itself is stateless; hosts that want to reuse a listener's profile across
//! requests keep snapshots in a [`ProfileStore`] and pass them back in explicitly.

use std::fmt::Display;

use crate::{
    error::AppResult,
    models::{ProfileSnapshot, TimeRange},
};

pub mod memory;
pub mod redis;

pub use memory::MemoryProfileStore;
pub use self::redis::{create_redis_client, RedisProfileStore, StoreWriterHandle};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProfileKey {
    /// Profile built from a listener's top tracks over a time window
    TopTracks { owner: String, time_range: TimeRange },
    /// Profile built from a playlist
    Playlist(String),
}

impl Display for ProfileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileKey::TopTracks { owner, time_range } => {
                write!(f, "profile:top:{}:{}", owner, time_range)
            }
            ProfileKey::Playlist(id) => write!(f, "profile:playlist:{}", id),
        }
    }
}

/// Keyed storage for profile snapshots
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Returns the stored snapshot, or `None` when absent or expired
    async fn load(&self, key: &ProfileKey) -> AppResult<Option<ProfileSnapshot>>;

    async fn save(&self, key: &ProfileKey, snapshot: &ProfileSnapshot) -> AppResult<()>;
}
