use crate::{
    config::EngineConfig,
    models::{Dial, ProfileSnapshot},
    services::{
        collector::{collect, CollectContext, Strategy, TrackPool},
        quota::ProfilePlan,
    },
};

/// Layers of the profile-driven generator
///
/// Either input may be missing. With a seed artist its own top tracks come first, then
/// artists of the profile's top tags (never more than the profile share, even without a
/// seed), then artists similar to the seed. Genre search always follows; the profile's
/// tags are finally reused as search keywords.
pub fn profile_strategies(
    profile: Option<&ProfileSnapshot>,
    seed_artist: Option<&str>,
    variety: Dial,
    discovery: Dial,
    limit: usize,
    config: &EngineConfig,
) -> (ProfilePlan, Vec<Strategy>) {
    let plan = ProfilePlan::new(limit, variety, discovery);
    let mut strategies = Vec::new();

    if let Some(artist) = seed_artist {
        strategies.push(Strategy::ArtistTopTracks {
            artist: artist.to_string(),
            quota: plan.seed_target,
        });
    }

    if let Some(profile) = profile {
        let tags: Vec<String> = profile
            .tag_names()
            .take(plan.tag_count)
            .map(str::to_string)
            .collect();

        if !tags.is_empty() {
            strategies.push(Strategy::TagArtists {
                tags,
                quota: plan.profile_target,
            });
        }
    }

    if let Some(artist) = seed_artist {
        strategies.push(Strategy::SimilarArtists {
            artist: artist.to_string(),
            artist_count: (variety.get() as usize).max(2),
            spread: plan.seed_target,
            quota: None,
        });
    }

    let genres = match profile {
        Some(p) if !p.genres.is_empty() => p.genres.clone(),
        _ => config.fallback_genres.clone(),
    };
    strategies.push(Strategy::GenreSearch {
        labels: genres.into_iter().take(config.max_fallback_genres).collect(),
    });

    if let Some(profile) = profile {
        let keywords: Vec<String> = profile
            .tag_names()
            .take(config.max_keyword_tags)
            .map(str::to_string)
            .collect();

        if !keywords.is_empty() {
            strategies.push(Strategy::KeywordSearch { keywords });
        }
    }

    (plan, strategies)
}

/// Collects tracks for a stored profile and/or a seed artist
///
/// Returns the unshuffled pool; the caller owns the final ordering.
pub async fn generate_from_profile_and_artist(
    ctx: &CollectContext<'_>,
    profile: Option<&ProfileSnapshot>,
    seed_artist: Option<&str>,
    variety: Dial,
    discovery: Dial,
    limit: usize,
) -> TrackPool {
    let seed_artist = seed_artist.map(str::trim).filter(|a| !a.is_empty());
    let (plan, strategies) =
        profile_strategies(profile, seed_artist, variety, discovery, limit, ctx.config);

    tracing::info!(
        has_profile = profile.is_some(),
        seed_artist = seed_artist.unwrap_or(""),
        total = plan.total,
        profile_target = plan.profile_target,
        seed_target = plan.seed_target,
        tags = plan.tag_count,
        "Generating playlist from profile"
    );

    collect(ctx, &strategies, limit).await
}
