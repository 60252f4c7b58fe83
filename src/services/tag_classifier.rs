use crate::models::{Category, CategoryScores};

/// Keywords whose presence in a tag pushes a category towards 1.0 (`high`) or 0.0 (`low`)
struct CategoryKeywords {
    high: &'static [&'static str],
    low: &'static [&'static str],
}

fn keywords(category: Category) -> CategoryKeywords {
    match category {
        Category::Energy => CategoryKeywords {
            high: &[
                "energetic",
                "powerful",
                "intense",
                "aggressive",
                "heavy",
                "fast",
                "upbeat",
                "driving",
                "hard",
            ],
            low: &[
                "calm", "chill", "relaxing", "mellow", "soft", "slow", "ambient", "peaceful",
                "gentle",
            ],
        },
        Category::Mood => CategoryKeywords {
            high: &[
                "happy",
                "uplifting",
                "cheerful",
                "fun",
                "feel good",
                "joyful",
                "optimistic",
                "bright",
            ],
            low: &[
                "sad",
                "melancholic",
                "dark",
                "depressing",
                "angry",
                "aggressive",
                "haunting",
                "moody",
            ],
        },
        Category::Danceability => CategoryKeywords {
            high: &[
                "dance", "danceable", "groovy", "funky", "rhythm", "beat", "club", "party", "disco",
            ],
            low: &[
                "ballad",
                "slow",
                "ambient",
                "atmospheric",
                "experimental",
                "noise",
            ],
        },
        Category::Acousticness => CategoryKeywords {
            high: &[
                "acoustic",
                "unplugged",
                "folk",
                "singer-songwriter",
                "organic",
                "live",
            ],
            low: &[
                "electronic",
                "synth",
                "digital",
                "produced",
                "industrial",
                "edm",
            ],
        },
    }
}

fn mentions_any(tag: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| tag.contains(kw))
}

/// Scores each category from a set of free-text tags
///
/// A tag counts as a high (low) indicator when it contains any of the category's high (low)
/// keywords, case-insensitively. One tag can count on both sides. The score is
/// `high / (high + low)`, or 0.5 when no tag mentions the category at all.
pub fn score_categories<S: AsRef<str>>(tags: &[S]) -> CategoryScores {
    let lowered: Vec<String> = tags.iter().map(|t| t.as_ref().to_lowercase()).collect();
    let mut scores = CategoryScores::neutral();

    for category in Category::ALL {
        let kw = keywords(category);
        let high = lowered.iter().filter(|t| mentions_any(t, kw.high)).count();
        let low = lowered.iter().filter(|t| mentions_any(t, kw.low)).count();

        let total = high + low;
        if total > 0 {
            scores.set(category, high as f64 / total as f64);
        }
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energetic_heavy_dance() {
        let scores = score_categories(&["energetic", "heavy", "dance"]);
        assert_eq!(scores.energy, 1.0);
        assert_eq!(scores.danceability, 1.0);
        assert_eq!(scores.mood, 0.5);
        assert_eq!(scores.acousticness, 0.5);
    }

    #[test]
    fn test_empty_tags_are_neutral() {
        let tags: Vec<String> = Vec::new();
        assert_eq!(score_categories(tags.as_slice()), CategoryScores::neutral());
    }

    #[test]
    fn test_unrelated_tags_are_neutral() {
        let scores = score_categories(&["seen live", "favourites", "00s"]);
        assert_eq!(scores.energy, 0.5);
        assert_eq!(scores.mood, 0.5);
        assert_eq!(scores.danceability, 0.5);
        // "seen live" contains "live"
        assert_eq!(scores.acousticness, 1.0);
    }

    #[test]
    fn test_mixed_signal_ratio() {
        let scores = score_categories(&["chill", "mellow", "intense"]);
        assert!((scores.energy - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_tag_can_count_on_both_sides() {
        // "aggressive" is a high-energy keyword and a low-mood keyword;
        // "slow dance" hits both danceability lists
        let scores = score_categories(&["aggressive", "slow dance"]);
        assert_eq!(scores.mood, 0.0);
        assert_eq!(scores.danceability, 0.5);
        assert_eq!(scores.energy, 0.5);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let upper = score_categories(&["Electronic", "SYNTHPOP"]);
        let lower = score_categories(&["electronic", "synthpop"]);
        assert_eq!(upper, lower);
        assert_eq!(upper.acousticness, 0.0);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let tag_sets: Vec<Vec<&str>> = vec![
            vec!["happy", "sad", "dark", "fun", "acoustic", "edm"],
            vec!["party", "disco", "ballad"],
            vec!["hard rock", "soft rock", "folk punk"],
        ];

        for tags in tag_sets {
            let scores = score_categories(tags.as_slice());
            for category in Category::ALL {
                let score = scores.get(category);
                assert!((0.0..=1.0).contains(&score), "{} = {}", category, score);
            }
        }
    }

    #[test]
    fn test_scoring_is_order_independent() {
        let forward = score_categories(&["groovy", "sad", "acoustic", "fast"]);
        let reversed = score_categories(&["fast", "acoustic", "sad", "groovy"]);
        assert_eq!(forward, reversed);
    }
}
