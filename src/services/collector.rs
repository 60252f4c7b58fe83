//! Layered track collection
//!
//! A collection run is an ordered list of [`Strategy`] layers. The driver gives each layer
//! the capacity it may still fill and the URIs already taken; the layer returns only new,
//! distinct tracks. Layers never remove what an earlier layer added, and a layer that finds
//! nothing simply hands over to the next one.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    config::EngineConfig,
    error::or_empty,
    models::Track,
    services::{
        providers::{AccessToken, Sources},
        quota::tracks_per_artist,
    },
};

/// Everything a layer needs to reach the upstream services
pub struct CollectContext<'a> {
    pub sources: &'a Sources,
    pub credential: &'a AccessToken,
    pub config: &'a EngineConfig,
}

/// One layer of the fallback chain
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// The seed artist's own top tracks
    ArtistTopTracks { artist: String, quota: usize },
    /// Top tracks of the artists most associated with each tag, tag by tag
    TagArtists { tags: Vec<String>, quota: usize },
    /// Top tracks of artists similar to the seed artist
    ///
    /// `spread` is the number of tracks the layer is expected to contribute; it sets how
    /// many tracks are requested per similar artist.
    SimilarArtists {
        artist: String,
        artist_count: usize,
        spread: usize,
        quota: Option<usize>,
    },
    /// Catalog search by genre label
    GenreSearch { labels: Vec<String> },
    /// Catalog search using profile tags as free-text keywords
    KeywordSearch { keywords: Vec<String> },
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::ArtistTopTracks { .. } => "artist_top_tracks",
            Strategy::TagArtists { .. } => "tag_artists",
            Strategy::SimilarArtists { .. } => "similar_artists",
            Strategy::GenreSearch { .. } => "genre_search",
            Strategy::KeywordSearch { .. } => "keyword_search",
        }
    }

    /// Most tracks this layer may add; `None` means up to the overall limit
    fn quota(&self) -> Option<usize> {
        match self {
            Strategy::ArtistTopTracks { quota, .. } | Strategy::TagArtists { quota, .. } => {
                Some(*quota)
            }
            Strategy::SimilarArtists { quota, .. } => *quota,
            Strategy::GenreSearch { .. } | Strategy::KeywordSearch { .. } => None,
        }
    }

    /// Returns up to `capacity` distinct tracks whose URIs are not in `seen`
    pub async fn gather(
        &self,
        ctx: &CollectContext<'_>,
        capacity: usize,
        seen: &HashSet<String>,
    ) -> Vec<Track> {
        let mut intake = Intake::new(seen, capacity);
        if intake.is_full() {
            return intake.into_tracks();
        }

        match self {
            Strategy::ArtistTopTracks { artist, .. } => {
                let limit = capacity + ctx.config.overfetch_margin;
                let tracks = ctx
                    .sources
                    .catalog
                    .search_artist_top_tracks(ctx.credential, artist, limit)
                    .await;
                intake.offer(or_empty(tracks, "artist_top_tracks", artist));
            }
            Strategy::TagArtists { tags, .. } => {
                for tag in tags {
                    if intake.is_full() {
                        break;
                    }

                    let artists = or_empty(
                        ctx.sources
                            .tags
                            .artists_for_tag(tag, ctx.config.artists_per_tag)
                            .await,
                        "artists_for_tag",
                        tag,
                    );

                    fan_out_top_tracks(ctx, artists, ctx.config.tracks_per_tag_artist, &mut intake)
                        .await;
                }
            }
            Strategy::SimilarArtists {
                artist,
                artist_count,
                spread,
                ..
            } => {
                let similar = or_empty(
                    ctx.sources.tags.similar_artists(artist, *artist_count).await,
                    "similar_artists",
                    artist,
                );

                if similar.is_empty() {
                    tracing::debug!(artist = %artist, "No similar artists found");
                } else {
                    let per_artist = tracks_per_artist(*spread, similar.len());
                    fan_out_top_tracks(ctx, similar, per_artist, &mut intake).await;
                }
            }
            Strategy::GenreSearch { labels } => {
                search_labels(ctx, labels, &mut intake).await;
            }
            Strategy::KeywordSearch { keywords } => {
                search_labels(ctx, keywords, &mut intake).await;
            }
        }

        intake.into_tracks()
    }
}

/// Fetches top tracks for several artists concurrently and offers them in artist order
///
/// Fetches still pending once the intake is full are aborted.
async fn fan_out_top_tracks(
    ctx: &CollectContext<'_>,
    artists: Vec<String>,
    per_artist: usize,
    intake: &mut Intake<'_>,
) {
    let mut tasks = Vec::with_capacity(artists.len());

    for artist in artists {
        let catalog = Arc::clone(&ctx.sources.catalog);
        let credential = ctx.credential.clone();
        let task = tokio::spawn(async move {
            let result = catalog
                .search_artist_top_tracks(&credential, &artist, per_artist)
                .await;
            or_empty(result, "artist_top_tracks", &artist)
        });
        tasks.push(task);
    }

    for task in tasks {
        if intake.is_full() {
            task.abort();
            continue;
        }

        match task.await {
            Ok(tracks) => intake.offer(tracks),
            Err(e) => tracing::error!(error = %e, "Top tracks task failed"),
        }
    }
}

/// Runs catalog searches label by label until the intake is full
async fn search_labels(ctx: &CollectContext<'_>, labels: &[String], intake: &mut Intake<'_>) {
    for label in labels {
        if intake.is_full() {
            break;
        }

        let limit = intake.remaining() + ctx.config.overfetch_margin;
        let tracks = ctx
            .sources
            .catalog
            .search_by_genre(ctx.credential, label, limit)
            .await;
        intake.offer(or_empty(tracks, "search_by_genre", label));
    }
}

/// New tracks picked by a single layer
struct Intake<'s> {
    seen: &'s HashSet<String>,
    picked: Vec<Track>,
    picked_uris: HashSet<String>,
    capacity: usize,
}

impl<'s> Intake<'s> {
    fn new(seen: &'s HashSet<String>, capacity: usize) -> Self {
        Self {
            seen,
            picked: Vec::new(),
            picked_uris: HashSet::new(),
            capacity,
        }
    }

    fn is_full(&self) -> bool {
        self.picked.len() >= self.capacity
    }

    fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.picked.len())
    }

    fn offer(&mut self, tracks: Vec<Track>) {
        for track in tracks {
            if self.is_full() {
                break;
            }
            if self.seen.contains(&track.uri) || self.picked_uris.contains(&track.uri) {
                continue;
            }
            self.picked_uris.insert(track.uri.clone());
            self.picked.push(track);
        }
    }

    fn into_tracks(self) -> Vec<Track> {
        self.picked
    }
}

/// Tracks accepted so far in one collection run
#[derive(Debug)]
pub struct TrackPool {
    tracks: Vec<Track>,
    seen: HashSet<String>,
    limit: usize,
}

impl TrackPool {
    pub fn new(limit: usize) -> Self {
        Self {
            tracks: Vec::new(),
            seen: HashSet::new(),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tracks.len() >= self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.tracks.len())
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Adds the tracks not seen yet, up to the limit; returns how many were added
    pub fn extend(&mut self, tracks: Vec<Track>) -> usize {
        let before = self.tracks.len();
        for track in tracks {
            if self.is_full() {
                break;
            }
            if self.seen.insert(track.uri.clone()) {
                self.tracks.push(track);
            }
        }
        self.tracks.len() - before
    }

    /// Shuffles the collected tracks uniformly and cuts them to the limit
    pub fn finish<R: Rng + ?Sized>(self, rng: &mut R) -> Vec<Track> {
        let mut tracks = self.tracks;
        tracks.shuffle(rng);
        tracks.truncate(self.limit);
        tracks
    }
}

/// Runs the layers in order until the pool is full or the layers are exhausted
pub async fn collect(ctx: &CollectContext<'_>, strategies: &[Strategy], limit: usize) -> TrackPool {
    let mut pool = TrackPool::new(limit);

    for strategy in strategies {
        if pool.is_full() {
            break;
        }

        let capacity = match strategy.quota() {
            Some(quota) => quota.min(pool.remaining()),
            None => pool.remaining(),
        };
        if capacity == 0 {
            continue;
        }

        let found = strategy.gather(ctx, capacity, &pool.seen).await;
        let added = pool.extend(found);

        tracing::debug!(
            layer = strategy.name(),
            capacity = capacity,
            added = added,
            total = pool.len(),
            "Collection layer finished"
        );
    }

    if pool.len() < limit {
        tracing::info!(
            collected = pool.len(),
            limit = limit,
            "All sources exhausted before reaching the limit"
        );
    }

    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::ArtistRef;
    use crate::services::providers::{MockCatalogSource, MockTagSource};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn track(uri: &str, artist: &str) -> Track {
        Track {
            uri: uri.to_string(),
            name: format!("Track {}", uri),
            artists: vec![ArtistRef {
                name: artist.to_string(),
                uri: None,
            }],
            album: None,
            popularity: None,
        }
    }

    fn tracks_for(artist: &str, count: usize) -> Vec<Track> {
        (0..count)
            .map(|i| track(&format!("{}:{}", artist, i), artist))
            .collect()
    }

    fn uris(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.uri.as_str()).collect()
    }

    fn sources(tags: MockTagSource, catalog: MockCatalogSource) -> Sources {
        Sources::new(Arc::new(tags), Arc::new(catalog))
    }

    #[test]
    fn test_pool_rejects_duplicates_and_respects_limit() {
        let mut pool = TrackPool::new(3);
        assert_eq!(pool.extend(vec![track("a", "x"), track("a", "x"), track("b", "x")]), 2);
        assert_eq!(pool.extend(vec![track("b", "x"), track("c", "x"), track("d", "x")]), 1);
        assert!(pool.is_full());
        assert_eq!(uris(pool.tracks()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pool_finish_is_a_permutation() {
        let mut pool = TrackPool::new(10);
        pool.extend(tracks_for("x", 8));
        let expected: HashSet<String> = pool.tracks().iter().map(|t| t.uri.clone()).collect();

        let mut rng = StdRng::seed_from_u64(7);
        let finished = pool.finish(&mut rng);

        let got: HashSet<String> = finished.iter().map(|t| t.uri.clone()).collect();
        assert_eq!(finished.len(), 8);
        assert_eq!(got, expected);
    }

    #[test]
    fn test_pool_finish_same_seed_same_order() {
        let build = || {
            let mut pool = TrackPool::new(10);
            pool.extend(tracks_for("x", 10));
            pool
        };

        let first = build().finish(&mut StdRng::seed_from_u64(42));
        let second = build().finish(&mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_intake_skips_seen_and_repeated() {
        let seen: HashSet<String> = ["a".to_string()].into_iter().collect();
        let mut intake = Intake::new(&seen, 2);
        intake.offer(vec![track("a", "x"), track("b", "x"), track("b", "x")]);
        assert_eq!(intake.remaining(), 1);
        intake.offer(vec![track("c", "x"), track("d", "x")]);
        assert!(intake.is_full());
        assert_eq!(uris(&intake.into_tracks()), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_artist_layer_overfetches_and_caps_at_quota() {
        let mut catalog = MockCatalogSource::new();
        catalog
            .expect_search_artist_top_tracks()
            .withf(|_, artist: &str, limit: &usize| artist == "Seed" && *limit == 5)
            .times(1)
            .returning(|_, artist, limit| Ok(tracks_for(artist, limit)));

        let sources = sources(MockTagSource::new(), catalog);
        let credential = AccessToken::new("token");
        let config = EngineConfig::default();
        let ctx = CollectContext {
            sources: &sources,
            credential: &credential,
            config: &config,
        };

        let strategies = vec![Strategy::ArtistTopTracks {
            artist: "Seed".to_string(),
            quota: 2,
        }];
        let pool = collect(&ctx, &strategies, 10).await;

        assert_eq!(uris(pool.tracks()), vec!["Seed:0", "Seed:1"]);
    }

    #[tokio::test]
    async fn test_layers_fall_through_on_empty_and_failed_sources() {
        let mut tags = MockTagSource::new();
        tags.expect_similar_artists()
            .returning(|_, _| Err(AppError::ExternalApi("unavailable".to_string())));

        let mut catalog = MockCatalogSource::new();
        catalog
            .expect_search_artist_top_tracks()
            .returning(|_, _, _| Ok(Vec::new()));
        catalog
            .expect_search_by_genre()
            .returning(|_, label, _| Ok(tracks_for(label, 2)));

        let sources = sources(tags, catalog);
        let credential = AccessToken::new("token");
        let config = EngineConfig::default();
        let ctx = CollectContext {
            sources: &sources,
            credential: &credential,
            config: &config,
        };

        let strategies = vec![
            Strategy::ArtistTopTracks {
                artist: "Seed".to_string(),
                quota: 3,
            },
            Strategy::SimilarArtists {
                artist: "Seed".to_string(),
                artist_count: 5,
                spread: 7,
                quota: None,
            },
            Strategy::GenreSearch {
                labels: vec!["rock".to_string(), "pop".to_string(), "indie".to_string()],
            },
        ];
        let pool = collect(&ctx, &strategies, 5).await;

        assert_eq!(
            uris(pool.tracks()),
            vec!["rock:0", "rock:1", "pop:0", "pop:1", "indie:0"]
        );
    }

    #[tokio::test]
    async fn test_similar_artists_merge_in_artist_order_without_duplicates() {
        let mut tags = MockTagSource::new();
        tags.expect_similar_artists()
            .withf(|artist: &str, limit: &usize| artist == "Seed" && *limit == 3)
            .returning(|_, _| Ok(vec!["A".to_string(), "B".to_string(), "C".to_string()]));

        let mut catalog = MockCatalogSource::new();
        catalog
            .expect_search_artist_top_tracks()
            .returning(|_, artist, limit| {
                // every artist shares a featured track with the others
                let mut tracks = vec![track("shared", artist)];
                tracks.extend(tracks_for(artist, limit.saturating_sub(1)));
                Ok(tracks)
            });

        let sources = sources(tags, catalog);
        let credential = AccessToken::new("token");
        let config = EngineConfig::default();
        let ctx = CollectContext {
            sources: &sources,
            credential: &credential,
            config: &config,
        };

        // 6 / 3 artists = 2, + 1 => 3 tracks per artist
        let strategies = vec![Strategy::SimilarArtists {
            artist: "Seed".to_string(),
            artist_count: 3,
            spread: 6,
            quota: None,
        }];
        let pool = collect(&ctx, &strategies, 20).await;

        assert_eq!(
            uris(pool.tracks()),
            vec!["shared", "A:0", "A:1", "B:0", "B:1", "C:0", "C:1"]
        );
    }

    #[tokio::test]
    async fn test_tag_artists_stop_at_quota() {
        let mut tags = MockTagSource::new();
        tags.expect_artists_for_tag()
            .withf(|tag: &str, limit: &usize| tag == "shoegaze" && *limit == 5)
            .times(1)
            .returning(|tag, _| Ok(vec![format!("{} band", tag), format!("{} duo", tag)]));

        let mut catalog = MockCatalogSource::new();
        catalog
            .expect_search_artist_top_tracks()
            .withf(|_, _, limit: &usize| *limit == 3)
            .returning(|_, artist, limit| Ok(tracks_for(artist, limit)));

        let sources = sources(tags, catalog);
        let credential = AccessToken::new("token");
        let config = EngineConfig::default();
        let ctx = CollectContext {
            sources: &sources,
            credential: &credential,
            config: &config,
        };

        let strategies = vec![Strategy::TagArtists {
            tags: vec!["shoegaze".to_string(), "dream pop".to_string()],
            quota: 4,
        }];
        let pool = collect(&ctx, &strategies, 10).await;

        assert_eq!(
            uris(pool.tracks()),
            vec![
                "shoegaze band:0",
                "shoegaze band:1",
                "shoegaze band:2",
                "shoegaze duo:0"
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_limit_issues_no_calls() {
        let sources = sources(MockTagSource::new(), MockCatalogSource::new());
        let credential = AccessToken::new("token");
        let config = EngineConfig::default();
        let ctx = CollectContext {
            sources: &sources,
            credential: &credential,
            config: &config,
        };

        let strategies = vec![Strategy::GenreSearch {
            labels: vec!["rock".to_string()],
        }];
        let pool = collect(&ctx, &strategies, 0).await;
        assert!(pool.is_empty());
    }
}
