//! Quota policies splitting a playlist between anchor and exploration sources
//!
//! Ratios are expressed in tenths of the playlist so rounding is exact integer
//! arithmetic. Halves round up: 15 tracks at 0.3 give an anchor of 5, not the 4 that
//! truncation or half-to-even rounding would give.

use crate::models::Dial;

/// `round(total * tenths / 10)`, half rounding up
fn share_of(total: usize, tenths: usize) -> usize {
    total.saturating_mul(tenths).saturating_add(5) / 10
}

/// Quota plan of the seed-artist recommendation path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedArtistPlan {
    pub total: usize,
    /// Tracks taken from the seed artist's own top tracks
    pub anchor_target: usize,
    /// Tracks left for similar artists
    pub exploration_target: usize,
    /// Similar artists requested from the tag service
    pub similar_artists: usize,
}

impl SeedArtistPlan {
    /// Builds the plan; the seed artist keeps at least 10% of the playlist and at least one track
    pub fn new(total: usize, variety: Dial, discovery: Dial) -> Self {
        let anchor_tenths = 10usize.saturating_sub(discovery.get() as usize).max(1);
        let anchor_target = share_of(total, anchor_tenths).max(1).min(total);

        Self {
            total,
            anchor_target,
            exploration_target: total - anchor_target,
            similar_artists: (variety.get() as usize).max(2),
        }
    }

    /// Top tracks requested per similar artist when `found` artists came back
    pub fn tracks_per_artist(&self, found: usize) -> usize {
        tracks_per_artist(self.exploration_target, found)
    }
}

/// Tracks to request from each of `found` artists expected to share `spread` tracks
///
/// Rounds up by one; the surplus is cut by the final truncation.
pub fn tracks_per_artist(spread: usize, found: usize) -> usize {
    (spread / found.max(1)).max(1).saturating_add(1)
}

/// Quota plan of the profile-driven generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfilePlan {
    pub total: usize,
    /// Tracks drawn from artists of the profile's top tags
    pub profile_target: usize,
    /// Tracks drawn from the seed artist
    pub seed_target: usize,
    /// Profile tags consulted
    pub tag_count: usize,
}

impl ProfilePlan {
    /// Builds the plan; unlike [`SeedArtistPlan`] the profile share has no 10% floor,
    /// so a discovery of 10 leaves it only the one-track minimum
    pub fn new(total: usize, variety: Dial, discovery: Dial) -> Self {
        let profile_tenths = 10usize.saturating_sub(discovery.get() as usize);
        let profile_target = share_of(total, profile_tenths).max(1).min(total);

        Self {
            total,
            profile_target,
            seed_target: total - profile_target,
            tag_count: (variety.get() as usize).max(3),
        }
    }
}
