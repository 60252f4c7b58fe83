use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    error::or_empty,
    models::{Category, CategoryScores, TagCount, TasteProfile, Track, TrackTagAnalysis},
    services::{providers::TagSource, tag_classifier::score_categories},
};

/// Tags kept from a single track or artist lookup
pub const MAX_TAGS_PER_LOOKUP: usize = 10;
/// Tags shown per track analysis
pub const SAMPLE_TAGS: usize = 5;
/// Length of the ranked tag list of a profile
pub const TOP_TAGS: usize = 20;
/// Genres inferred per profile
pub const MAX_GENRES: usize = 5;

/// Substrings marking a tag as a genre label
const GENRE_KEYWORDS: &[&str] = &[
    "rock",
    "pop",
    "hip hop",
    "rap",
    "electronic",
    "jazz",
    "classical",
    "metal",
    "punk",
    "indie",
    "alternative",
    "r&b",
    "soul",
    "country",
    "folk",
    "blues",
    "reggae",
    "latin",
    "dance",
    "house",
    "techno",
];

/// Builds a taste profile from a list of tracks
///
/// Tags are looked up per track (falling back to the primary artist's tags when the track
/// has none), concurrently, and merged back in input order. A failed lookup only empties
/// that track's tag list.
pub async fn build_profile(tag_source: Arc<dyn TagSource>, tracks: &[Track]) -> TasteProfile {
    if tracks.is_empty() {
        return TasteProfile::empty();
    }

    let mut tasks = Vec::with_capacity(tracks.len());

    for track in tracks {
        let source = Arc::clone(&tag_source);
        let title = track.name.clone();
        let artist = track.primary_artist().to_string();
        let task =
            tokio::spawn(async move { lookup_tags(source.as_ref(), &title, &artist).await });
        tasks.push(task);
    }

    let mut tag_sets = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(tags) => tag_sets.push(tags),
            Err(e) => {
                tracing::error!(error = %e, "Tag lookup task failed");
                tag_sets.push(Vec::new());
            }
        }
    }

    let profile = aggregate(tracks, tag_sets);

    tracing::info!(
        tracks = profile.track_count,
        tagged = profile
            .track_analyses
            .iter()
            .filter(|a| !a.tags.is_empty())
            .count(),
        top_tags = profile.top_tags.len(),
        genres = ?profile.genres,
        "Taste profile built"
    );

    profile
}

/// Track tags, or the primary artist's tags when the track has none
async fn lookup_tags(source: &dyn TagSource, title: &str, artist: &str) -> Vec<String> {
    let tags = normalize_tags(or_empty(
        source.track_tags(title, artist).await,
        "track_tags",
        title,
    ));

    if !tags.is_empty() || artist.is_empty() {
        return tags;
    }

    tracing::debug!(track = %title, artist = %artist, "No track tags, using artist tags");

    normalize_tags(or_empty(
        source.artist_tags(artist).await,
        "artist_tags",
        artist,
    ))
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS_PER_LOOKUP)
        .collect()
}

/// Combines per-track tag lists into a profile
///
/// `tag_sets[i]` holds the tags found for `tracks[i]`.
pub fn aggregate(tracks: &[Track], tag_sets: Vec<Vec<String>>) -> TasteProfile {
    let mut analyses = Vec::with_capacity(tracks.len());

    for (track, tags) in tracks.iter().zip(tag_sets.iter()) {
        analyses.push(TrackTagAnalysis {
            name: track.name.clone(),
            artist: track.primary_artist().to_string(),
            tags: tags.iter().take(SAMPLE_TAGS).cloned().collect(),
            scores: score_categories(tags.as_slice()),
        });
    }

    let top_tags = rank_tags(tag_sets.iter().flatten().map(String::as_str));
    let genres = infer_genres(&top_tags);

    TasteProfile {
        scores: average_scores(&analyses),
        top_tags,
        genres,
        track_count: tracks.len(),
        track_analyses: analyses,
    }
}

/// Mean score per category over the tracks that produced tags
fn average_scores(analyses: &[TrackTagAnalysis]) -> CategoryScores {
    let tagged: Vec<&TrackTagAnalysis> = analyses.iter().filter(|a| !a.tags.is_empty()).collect();
    let mut scores = CategoryScores::neutral();

    if tagged.is_empty() {
        return scores;
    }

    for category in Category::ALL {
        let sum: f64 = tagged.iter().map(|a| a.scores.get(category)).sum();
        scores.set(category, sum / tagged.len() as f64);
    }

    scores
}

/// Counts tags and returns the most frequent, first-seen order breaking ties
fn rank_tags<'a>(tags: impl Iterator<Item = &'a str>) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for tag in tags {
        match positions.get(tag) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                positions.insert(tag, counts.len());
                counts.push(TagCount {
                    tag: tag.to_string(),
                    count: 1,
                });
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_TAGS);
    counts
}

fn infer_genres(top_tags: &[TagCount]) -> Vec<String> {
    top_tags
        .iter()
        .filter(|t| GENRE_KEYWORDS.iter().any(|g| t.tag.contains(g)))
        .take(MAX_GENRES)
        .map(|t| t.tag.clone())
        .collect()
}
