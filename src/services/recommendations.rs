use crate::{
    config::EngineConfig,
    models::RecommendationParams,
    services::{
        collector::{collect, CollectContext, Strategy, TrackPool},
        quota::SeedArtistPlan,
    },
};

/// Layers of the seed-artist recommendation path
///
/// The seed artist anchors the list, its similar artists explore around it, and genre
/// search (the request's seed genre first, then the configured defaults) fills whatever
/// is left.
pub fn seed_artist_strategies(
    params: &RecommendationParams,
    config: &EngineConfig,
) -> (SeedArtistPlan, Vec<Strategy>) {
    let artist = params.seed_artist(config).to_string();
    let plan = SeedArtistPlan::new(params.track_count.get(), params.variety, params.discovery);

    let strategies = vec![
        Strategy::ArtistTopTracks {
            artist: artist.clone(),
            quota: plan.anchor_target,
        },
        Strategy::SimilarArtists {
            artist,
            artist_count: plan.similar_artists,
            spread: plan.exploration_target,
            quota: None,
        },
        Strategy::GenreSearch {
            labels: genre_labels(params.seed_genre(config), config),
        },
    ];

    (plan, strategies)
}

/// The requested genre followed by the configured fallbacks, without repeats
fn genre_labels(seed_genre: &str, config: &EngineConfig) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();

    let fallbacks = config.fallback_genres.iter().map(String::as_str);

    for label in std::iter::once(seed_genre).chain(fallbacks) {
        let label = label.trim();
        if label.is_empty() || labels.iter().any(|l| l.eq_ignore_ascii_case(label)) {
            continue;
        }
        labels.push(label.to_string());
    }

    labels.truncate(config.max_fallback_genres);
    labels
}

/// Collects recommendation candidates around a seed artist
///
/// Returns the unshuffled pool; the caller owns the final ordering.
pub async fn generate_recommendations(
    ctx: &CollectContext<'_>,
    params: &RecommendationParams,
) -> TrackPool {
    let (plan, strategies) = seed_artist_strategies(params, ctx.config);

    tracing::info!(
        seed_artist = %params.seed_artist(ctx.config),
        total = plan.total,
        anchor = plan.anchor_target,
        exploration = plan.exploration_target,
        similar_artists = plan.similar_artists,
        "Generating recommendations"
    );

    collect(ctx, &strategies, plan.total).await
}
