//! Upstream data source abstraction
//!
//! The engine talks to two external services: a tag/similarity service (community tags,
//! similar artists, artists per tag) and a catalog service (playable tracks). Transport,
//! authentication and escaping of free-text arguments are the implementor's concern.
//!
//! Implementations should return an empty list when nothing is found, and may return an
//! error on failure; the engine treats both the same way.

use std::fmt;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{TimeRange, Track},
};

/// Opaque bearer credential for the catalog service, supplied by the caller per request
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Community tag and artist-similarity service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TagSource: Send + Sync {
    /// Tags applied to a specific track, most popular first
    async fn track_tags(&self, title: &str, artist: &str) -> AppResult<Vec<String>>;

    /// Tags applied to an artist, most popular first
    async fn artist_tags(&self, artist: &str) -> AppResult<Vec<String>>;

    /// Most representative artists for a tag
    async fn artists_for_tag(&self, tag: &str, limit: usize) -> AppResult<Vec<String>>;

    /// Artists similar to the given one, most similar first
    async fn similar_artists(&self, artist: &str, limit: usize) -> AppResult<Vec<String>>;
}

/// Track catalog service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Resolves the artist by name and returns their top tracks; empty when not found
    async fn search_artist_top_tracks(
        &self,
        credential: &AccessToken,
        artist: &str,
        limit: usize,
    ) -> AppResult<Vec<Track>>;

    /// Tracks matching a genre or free-text tag
    async fn search_by_genre(
        &self,
        credential: &AccessToken,
        label: &str,
        limit: usize,
    ) -> AppResult<Vec<Track>>;

    /// The credential owner's most played tracks over a time window
    async fn user_top_tracks(
        &self,
        credential: &AccessToken,
        limit: usize,
        time_range: TimeRange,
    ) -> AppResult<Vec<Track>>;

    /// Tracks of a playlist, in playlist order
    async fn playlist_tracks(
        &self,
        credential: &AccessToken,
        playlist_id: &str,
        limit: usize,
    ) -> AppResult<Vec<Track>>;
}

/// The pair of upstream services the engine draws from
#[derive(Clone)]
pub struct Sources {
    pub tags: Arc<dyn TagSource>,
    pub catalog: Arc<dyn CatalogSource>,
}

impl Sources {
    pub fn new(tags: Arc<dyn TagSource>, catalog: Arc<dyn CatalogSource>) -> Self {
        Self { tags, catalog }
    }
}
