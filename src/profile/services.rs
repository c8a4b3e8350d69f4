use tracing::{info, instrument};

use super::dto::UserProfile;
use super::repo::ProfileRepo;
use crate::clock::now_ms;
use crate::tips::services::TipsEngine;

/// Persists the profile; a complete profile also regenerates the tip cache.
#[instrument(skip(profiles, tips, profile))]
pub async fn save_profile(
    profiles: &ProfileRepo,
    tips: &TipsEngine,
    profile: UserProfile,
) -> anyhow::Result<UserProfile> {
    let saved = profiles.save(profile, now_ms()).await?;
    if saved.is_complete() {
        let refreshed = tips.force_refresh(&saved).await;
        info!(count = refreshed.len(), "tips refreshed after profile save");
    }
    Ok(saved)
}
