//! Caller-facing entry point of the recommendation engine
//!
//! An [`Engine`] bundles the upstream sources, the configuration and the randomness
//! used for final ordering. Every operation is self-contained: nothing is remembered
//! between calls, and profiles are passed in by the caller.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    config::EngineConfig,
    error::or_empty,
    models::{
        Dial, ProfileMixParams, ProfileSnapshot, RecommendationParams, TasteProfile, TimeRange,
        Track, TrackLimit,
    },
    services::{
        collector::{CollectContext, TrackPool},
        playlist, recommendations,
        providers::{AccessToken, Sources},
        taste_profile,
    },
};

pub struct Engine {
    sources: Sources,
    config: Arc<EngineConfig>,
    rng: Mutex<StdRng>,
}

impl Engine {
    /// Creates an engine whose shuffles draw from OS entropy
    pub fn new(sources: Sources, config: EngineConfig) -> Self {
        Self::with_rng(sources, config, StdRng::from_os_rng())
    }

    /// Creates an engine with a fixed shuffle seed, for reproducible ordering
    pub fn with_seed(sources: Sources, config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(sources, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(sources: Sources, config: EngineConfig, rng: StdRng) -> Self {
        Self {
            sources,
            config: Arc::new(config),
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn context<'a>(&'a self, credential: &'a AccessToken) -> CollectContext<'a> {
        CollectContext {
            sources: &self.sources,
            credential,
            config: &self.config,
        }
    }

    /// Shuffles and truncates a finished pool
    fn finish(&self, pool: TrackPool) -> Vec<Track> {
        // poisoning only means another shuffle panicked; the generator is still usable
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        pool.finish(&mut *rng)
    }

    /// Recommends tracks around a seed artist
    ///
    /// Never fails: unavailable sources only shorten the result, possibly to nothing.
    pub async fn generate_recommendations(
        &self,
        params: &RecommendationParams,
        credential: &AccessToken,
    ) -> Vec<Track> {
        let ctx = self.context(credential);
        let pool = recommendations::generate_recommendations(&ctx, params).await;
        let tracks = self.finish(pool);

        tracing::info!(
            requested = params.track_count.get(),
            collected = tracks.len(),
            "Recommendations generated"
        );

        tracks
    }

    pub async fn build_taste_profile(&self, tracks: &[Track]) -> TasteProfile {
        taste_profile::build_profile(Arc::clone(&self.sources.tags), tracks).await
    }

    /// Builds a playlist from a stored profile, a seed artist, both or neither
    ///
    /// `limit` is clamped to 1..=[`MAX_TRACK_COUNT`](crate::models::params::MAX_TRACK_COUNT).
    pub async fn generate_from_profile_and_artist(
        &self,
        profile: Option<&ProfileSnapshot>,
        seed_artist: Option<&str>,
        credential: &AccessToken,
        variety: Dial,
        discovery: Dial,
        limit: usize,
    ) -> Vec<Track> {
        let limit = TrackLimit::from_count(limit).get();
        let ctx = self.context(credential);
        let pool = playlist::generate_from_profile_and_artist(
            &ctx,
            profile,
            seed_artist,
            variety,
            discovery,
            limit,
        )
        .await;
        let tracks = self.finish(pool);

        tracing::info!(
            requested = limit,
            collected = tracks.len(),
            "Profile playlist generated"
        );

        tracks
    }

    /// [`Engine::generate_from_profile_and_artist`] driven by request parameters
    pub async fn generate_from_profile(
        &self,
        profile: Option<&ProfileSnapshot>,
        params: &ProfileMixParams,
        credential: &AccessToken,
    ) -> Vec<Track> {
        self.generate_from_profile_and_artist(
            profile,
            params.seed_artist(),
            credential,
            params.variety,
            params.discovery,
            params.track_count.get(),
        )
        .await
    }

    /// Profiles the credential owner's most played tracks
    pub async fn profile_from_top_tracks(
        &self,
        credential: &AccessToken,
        time_range: TimeRange,
    ) -> TasteProfile {
        let tracks = self
            .sources
            .catalog
            .user_top_tracks(credential, self.config.profile_source_tracks, time_range)
            .await;
        let tracks = or_empty(tracks, "user_top_tracks", &time_range.to_string());

        self.build_taste_profile(&tracks).await
    }

    /// Profiles the tracks of a playlist
    pub async fn profile_from_playlist(
        &self,
        credential: &AccessToken,
        playlist_id: &str,
    ) -> TasteProfile {
        let tracks = self
            .sources
            .catalog
            .playlist_tracks(credential, playlist_id, self.config.profile_source_tracks)
            .await;
        let tracks = or_empty(tracks, "playlist_tracks", playlist_id);

        self.build_taste_profile(&tracks).await
    }
}
