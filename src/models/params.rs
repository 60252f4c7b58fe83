use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// Largest playlist the engine will assemble in one request
pub const MAX_TRACK_COUNT: usize = 100;

/// A numeric request field as sent by form-style clients: a number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumericInput {
    /// Fractions are truncated; out-of-range values saturate and are clamped by the caller
    pub fn into_i64(self) -> Result<i64, String> {
        match self {
            NumericInput::Int(v) => Ok(v),
            NumericInput::Float(v) if v.is_finite() => Ok(v as i64),
            NumericInput::Float(v) => Err(format!("expected a finite number, got {}", v)),
            NumericInput::Text(text) => {
                let trimmed = text.trim();
                trimmed
                    .parse::<i64>()
                    .or_else(|_| {
                        trimmed
                            .parse::<f64>()
                            .ok()
                            .filter(|v| v.is_finite())
                            .map(|v| v as i64)
                            .ok_or(())
                    })
                    .map_err(|_| format!("expected a number, got {:?}", text))
            }
        }
    }
}

/// A 1..=10 slider setting (variety, discovery)
///
/// Out-of-range inputs are clamped on construction, so the quota policies can rely on
/// the range without re-checking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "NumericInput", into = "u8")]
pub struct Dial(u8);

impl Dial {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Dial {
    fn default() -> Self {
        Self(5)
    }
}

impl From<i64> for Dial {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl TryFrom<NumericInput> for Dial {
    type Error = String;

    fn try_from(input: NumericInput) -> Result<Self, Self::Error> {
        input.into_i64().map(Self::new)
    }
}

impl From<Dial> for u8 {
    fn from(dial: Dial) -> Self {
        dial.0
    }
}

/// Requested playlist length, clamped to 1..=MAX_TRACK_COUNT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NumericInput", into = "usize")]
pub struct TrackLimit(usize);

impl TrackLimit {
    pub fn new(value: i64) -> Self {
        Self(value.clamp(1, MAX_TRACK_COUNT as i64) as usize)
    }

    /// Clamps an already non-negative count
    pub fn from_count(count: usize) -> Self {
        Self(count.clamp(1, MAX_TRACK_COUNT))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl From<i64> for TrackLimit {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl TryFrom<NumericInput> for TrackLimit {
    type Error = String;

    fn try_from(input: NumericInput) -> Result<Self, Self::Error> {
        input.into_i64().map(Self::new)
    }
}

impl From<TrackLimit> for usize {
    fn from(limit: TrackLimit) -> Self {
        limit.0
    }
}

fn default_recommendation_count() -> TrackLimit {
    TrackLimit(10)
}

fn default_profile_mix_count() -> TrackLimit {
    TrackLimit(15)
}

/// Returns the trimmed value, or `None` when it is missing or blank
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parameters of the seed-artist recommendation path
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RecommendationParams {
    #[serde(default = "default_recommendation_count")]
    pub track_count: TrackLimit,
    /// Breadth of similar artists explored
    #[serde(default, alias = "danceability")]
    pub variety: Dial,
    /// Balance between the seed artist and similar artists
    #[serde(default, alias = "energy")]
    pub discovery: Dial,
    #[serde(default)]
    pub seed_genre: Option<String>,
    #[serde(default)]
    pub seed_artist: Option<String>,
}

impl Default for RecommendationParams {
    fn default() -> Self {
        Self {
            track_count: default_recommendation_count(),
            variety: Dial::default(),
            discovery: Dial::default(),
            seed_genre: None,
            seed_artist: None,
        }
    }
}

impl RecommendationParams {
    /// Seed artist for this request, falling back to the configured default when blank
    pub fn seed_artist<'a>(&'a self, config: &'a EngineConfig) -> &'a str {
        non_blank(&self.seed_artist).unwrap_or(config.default_seed_artist.as_str())
    }

    /// Seed genre for this request, falling back to the configured default when blank
    pub fn seed_genre<'a>(&'a self, config: &'a EngineConfig) -> &'a str {
        non_blank(&self.seed_genre).unwrap_or(config.default_seed_genre.as_str())
    }
}

/// Parameters of the profile-driven generator
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ProfileMixParams {
    #[serde(default = "default_profile_mix_count", alias = "track_count")]
    pub track_count: TrackLimit,
    #[serde(default)]
    pub variety: Dial,
    #[serde(default)]
    pub discovery: Dial,
    #[serde(default, alias = "seed_artist")]
    pub seed_artist: Option<String>,
}

impl Default for ProfileMixParams {
    fn default() -> Self {
        Self {
            track_count: default_profile_mix_count(),
            variety: Dial::default(),
            discovery: Dial::default(),
            seed_artist: None,
        }
    }
}

impl ProfileMixParams {
    /// Seed artist, if one was given; there is no default on this path
    pub fn seed_artist(&self) -> Option<&str> {
        non_blank(&self.seed_artist)
    }
}
