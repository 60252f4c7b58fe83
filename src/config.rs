use serde::Deserialize;

/// Engine configuration loaded from `MOODMIX_`-prefixed environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EngineConfig {
    /// Seed artist used when a recommendation request leaves it blank
    #[serde(default = "default_seed_artist")]
    pub default_seed_artist: String,

    /// Genre searched when the request names none
    #[serde(default = "default_seed_genre")]
    pub default_seed_genre: String,

    /// Genre labels searched when no profile-derived genres are available
    #[serde(default = "default_fallback_genres")]
    pub fallback_genres: Vec<String>,

    /// Extra tracks requested per top-tracks lookup to survive de-dup collisions
    #[serde(default = "default_overfetch_margin")]
    pub overfetch_margin: usize,

    /// Maximum number of genre labels consulted by the genre fallback
    #[serde(default = "default_max_fallback_genres")]
    pub max_fallback_genres: usize,

    /// Maximum number of profile tags reused as search keywords
    #[serde(default = "default_max_keyword_tags")]
    pub max_keyword_tags: usize,

    /// Artists fetched per profile tag
    #[serde(default = "default_artists_per_tag")]
    pub artists_per_tag: usize,

    /// Top tracks fetched per tag-derived artist
    #[serde(default = "default_tracks_per_tag_artist")]
    pub tracks_per_tag_artist: usize,

    /// Tracks pulled from a listener's history or a playlist to build a profile
    #[serde(default = "default_profile_source_tracks")]
    pub profile_source_tracks: usize,

    /// Redis connection URL for the profile snapshot store
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Lifetime of a cached profile snapshot, in seconds
    #[serde(default = "default_profile_ttl_secs")]
    pub profile_ttl_secs: u64,
}

fn default_seed_artist() -> String {
    "Rage Against The Machine".to_string()
}

fn default_seed_genre() -> String {
    "rock".to_string()
}

fn default_fallback_genres() -> Vec<String> {
    vec!["rock".to_string(), "pop".to_string(), "indie".to_string()]
}

fn default_overfetch_margin() -> usize {
    3
}

fn default_max_fallback_genres() -> usize {
    3
}

fn default_max_keyword_tags() -> usize {
    10
}

fn default_artists_per_tag() -> usize {
    5
}

fn default_tracks_per_tag_artist() -> usize {
    3
}

fn default_profile_source_tracks() -> usize {
    30
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_profile_ttl_secs() -> u64 {
    3600
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_seed_artist: default_seed_artist(),
            default_seed_genre: default_seed_genre(),
            fallback_genres: default_fallback_genres(),
            overfetch_margin: default_overfetch_margin(),
            max_fallback_genres: default_max_fallback_genres(),
            max_keyword_tags: default_max_keyword_tags(),
            artists_per_tag: default_artists_per_tag(),
            tracks_per_tag_artist: default_tracks_per_tag_artist(),
            profile_source_tracks: default_profile_source_tracks(),
            redis_url: default_redis_url(),
            profile_ttl_secs: default_profile_ttl_secs(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed("MOODMIX_")
            .from_env::<EngineConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_serde_defaults() {
        let vars: Vec<(String, String)> = Vec::new();
        let parsed: EngineConfig = envy::prefixed("MOODMIX_").from_iter(vars).unwrap();
        assert_eq!(parsed, EngineConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let vars = vec![
            ("MOODMIX_DEFAULT_SEED_GENRE".to_string(), "jazz".to_string()),
            (
                "MOODMIX_FALLBACK_GENRES".to_string(),
                "jazz,soul".to_string(),
            ),
            ("MOODMIX_OVERFETCH_MARGIN".to_string(), "5".to_string()),
        ];

        let parsed: EngineConfig = envy::prefixed("MOODMIX_").from_iter(vars).unwrap();
        assert_eq!(parsed.default_seed_genre, "jazz");
        assert_eq!(parsed.fallback_genres, vec!["jazz", "soul"]);
        assert_eq!(parsed.overfetch_margin, 5);
        assert_eq!(parsed.default_seed_artist, "Rage Against The Machine");
    }
}
