//! Get-or-build helpers for profile snapshots
//!
//! These sit outside the engine: the host picks a store, and the engine only ever sees
//! the snapshot it is handed.

use crate::{
    cached,
    db::{ProfileKey, ProfileStore},
    engine::Engine,
    error::{AppError, AppResult},
    models::{ProfileSnapshot, TasteProfile, TimeRange},
    services::providers::AccessToken,
};

/// Snapshot of a listener's top-tracks profile, built on a store miss
pub async fn top_tracks_snapshot(
    engine: &Engine,
    store: &dyn ProfileStore,
    owner: &str,
    credential: &AccessToken,
    time_range: TimeRange,
) -> AppResult<ProfileSnapshot> {
    let key = ProfileKey::TopTracks {
        owner: owner.to_string(),
        time_range,
    };

    cached!(store, key, async {
        let profile = engine.profile_from_top_tracks(credential, time_range).await;
        snapshot_of(&profile, &key)
    })
}

/// Snapshot of a playlist's profile, built on a store miss
pub async fn playlist_snapshot(
    engine: &Engine,
    store: &dyn ProfileStore,
    credential: &AccessToken,
    playlist_id: &str,
) -> AppResult<ProfileSnapshot> {
    let key = ProfileKey::Playlist(playlist_id.to_string());

    cached!(store, key, async {
        let profile = engine.profile_from_playlist(credential, playlist_id).await;
        snapshot_of(&profile, &key)
    })
}

/// A profile built from nothing is not worth keeping
fn snapshot_of(profile: &TasteProfile, key: &ProfileKey) -> AppResult<ProfileSnapshot> {
    if profile.track_count == 0 {
        return Err(AppError::NotFound(format!("no source tracks for {}", key)));
    }
    Ok(ProfileSnapshot::from(profile))
}
