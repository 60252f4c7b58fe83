use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod params;

pub use params::{Dial, NumericInput, ProfileMixParams, RecommendationParams, TrackLimit};

/// Number of tags kept when a profile is reduced to a snapshot
pub const SNAPSHOT_TOP_TAGS: usize = 10;

// ============================================================================
// Catalog Types
// ============================================================================

/// A playable track as returned by the catalog service
///
/// The URI is the identity used for de-duplication; everything else is descriptive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub popularity: Option<u8>,
}

impl Track {
    /// Name of the first credited artist, or an empty string for uncredited tracks
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(|a| a.name.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistRef {
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumRef {
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
}

/// Listening-history window for a listener's top tracks
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    /// Roughly the last four weeks
    ShortTerm,
    /// Roughly the last six months
    #[default]
    MediumTerm,
    /// Several years of history
    LongTerm,
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeRange::ShortTerm => write!(f, "short_term"),
            TimeRange::MediumTerm => write!(f, "medium_term"),
            TimeRange::LongTerm => write!(f, "long_term"),
        }
    }
}

// ============================================================================
// Profile Types
// ============================================================================

/// Mood/energy dimension scored from community tags
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Energy,
    Mood,
    Danceability,
    Acousticness,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Energy,
        Category::Mood,
        Category::Danceability,
        Category::Acousticness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Energy => "energy",
            Category::Mood => "mood",
            Category::Danceability => "danceability",
            Category::Acousticness => "acousticness",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-category scores, each in [0, 1]; 0.5 means "no signal"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CategoryScores {
    pub energy: f64,
    pub mood: f64,
    pub danceability: f64,
    pub acousticness: f64,
}

impl CategoryScores {
    pub const NEUTRAL: f64 = 0.5;

    pub fn neutral() -> Self {
        Self {
            energy: Self::NEUTRAL,
            mood: Self::NEUTRAL,
            danceability: Self::NEUTRAL,
            acousticness: Self::NEUTRAL,
        }
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Energy => self.energy,
            Category::Mood => self.mood,
            Category::Danceability => self.danceability,
            Category::Acousticness => self.acousticness,
        }
    }

    pub fn set(&mut self, category: Category, score: f64) {
        let slot = match category {
            Category::Energy => &mut self.energy,
            Category::Mood => &mut self.mood,
            Category::Danceability => &mut self.danceability,
            Category::Acousticness => &mut self.acousticness,
        };
        *slot = score;
    }
}

impl Default for CategoryScores {
    fn default() -> Self {
        Self::neutral()
    }
}

/// A tag with its number of occurrences across the analysed tracks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: u32,
}

/// Tag analysis for a single source track
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackTagAnalysis {
    pub name: String,
    pub artist: String,
    /// Up to five of the tags found for the track
    pub tags: Vec<String>,
    pub scores: CategoryScores,
}

/// Aggregated taste profile of a set of tracks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TasteProfile {
    pub scores: CategoryScores,
    /// Most frequent tags, count descending, first-seen order on ties
    pub top_tags: Vec<TagCount>,
    pub genres: Vec<String>,
    pub track_count: usize,
    pub track_analyses: Vec<TrackTagAnalysis>,
}

impl TasteProfile {
    /// Profile of an empty track list
    pub fn empty() -> Self {
        Self {
            scores: CategoryScores::neutral(),
            top_tags: Vec::new(),
            genres: Vec::new(),
            track_count: 0,
            track_analyses: Vec::new(),
        }
    }
}

/// The cacheable part of a profile, consumed by the profile-driven generator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileSnapshot {
    pub scores: CategoryScores,
    pub top_tags: Vec<TagCount>,
    pub genres: Vec<String>,
    pub track_count: usize,
    pub built_at: DateTime<Utc>,
}

impl ProfileSnapshot {
    /// Tag labels in rank order
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.top_tags.iter().map(|t| t.tag.as_str())
    }
}

impl From<&TasteProfile> for ProfileSnapshot {
    fn from(profile: &TasteProfile) -> Self {
        ProfileSnapshot {
            scores: profile.scores,
            top_tags: profile
                .top_tags
                .iter()
                .take(SNAPSHOT_TOP_TAGS)
                .cloned()
                .collect(),
            genres: profile.genres.clone(),
            track_count: profile.track_count,
            built_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(uri: &str, artists: &[&str]) -> Track {
        Track {
            uri: uri.to_string(),
            name: "Song".to_string(),
            artists: artists
                .iter()
                .map(|name| ArtistRef {
                    name: name.to_string(),
                    uri: None,
                })
                .collect(),
            album: None,
            popularity: None,
        }
    }

    #[test]
    fn test_primary_artist_is_first_listed() {
        let t = track("spotify:track:1", &["Massive Attack", "Tracey Thorn"]);
        assert_eq!(t.primary_artist(), "Massive Attack");
    }

    #[test]
    fn test_primary_artist_empty_when_uncredited() {
        let t = track("spotify:track:1", &[]);
        assert_eq!(t.primary_artist(), "");
    }

    #[test]
    fn test_track_deserialization_with_missing_optionals() {
        let json = r#"{
            "uri": "spotify:track:4uLU6hMCjMI75M1A2tKUQC",
            "name": "Never Gonna Give You Up",
            "artists": [{"name": "Rick Astley"}]
        }"#;

        let t: Track = serde_json::from_str(json).unwrap();
        assert_eq!(t.primary_artist(), "Rick Astley");
        assert_eq!(t.album, None);
        assert_eq!(t.popularity, None);
    }

    #[test]
    fn test_category_scores_get_set() {
        let mut scores = CategoryScores::neutral();
        scores.set(Category::Mood, 0.25);
        assert_eq!(scores.get(Category::Mood), 0.25);
        assert_eq!(scores.get(Category::Energy), 0.5);
    }

    #[test]
    fn test_category_scores_serialize_as_map() {
        let json = serde_json::to_value(CategoryScores::neutral()).unwrap();
        for category in Category::ALL {
            assert_eq!(json[category.as_str()], 0.5);
        }
    }

    #[test]
    fn test_time_range_display_matches_serde() {
        for range in [TimeRange::ShortTerm, TimeRange::MediumTerm, TimeRange::LongTerm] {
            let json = serde_json::to_string(&range).unwrap();
            assert_eq!(json, format!("\"{}\"", range));
        }
    }

    #[test]
    fn test_snapshot_keeps_top_ten_tags() {
        let mut profile = TasteProfile::empty();
        profile.top_tags = (0..20)
            .map(|i| TagCount {
                tag: format!("tag{}", i),
                count: 20 - i,
            })
            .collect();
        profile.genres = vec!["rock".to_string()];
        profile.track_count = 7;

        let snapshot = ProfileSnapshot::from(&profile);
        assert_eq!(snapshot.top_tags.len(), SNAPSHOT_TOP_TAGS);
        assert_eq!(snapshot.top_tags[0].tag, "tag0");
        assert_eq!(snapshot.genres, vec!["rock"]);
        assert_eq!(snapshot.track_count, 7);
    }
}
