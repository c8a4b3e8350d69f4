use tracing::error;

use super::dto::UserProfile;
use crate::storage::{Store, PROFILE_KEY};

#[derive(Clone)]
pub struct ProfileRepo {
    store: Store,
}

impl ProfileRepo {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Stamps `completedAt`, refreshes the completeness flag and persists.
    pub async fn save(&self, profile: UserProfile, now: i64) -> anyhow::Result<UserProfile> {
        let mut profile = profile.with_completeness();
        profile.completed_at = now;
        self.store.write_json(PROFILE_KEY, &profile).await?;
        Ok(profile)
    }

    pub async fn load(&self) -> Option<UserProfile> {
        match self.store.read_json::<UserProfile>(PROFILE_KEY).await {
            Ok(p) => p.map(UserProfile::with_completeness),
            Err(e) => {
                error!(error = %e, key = PROFILE_KEY, "error getting profile data");
                None
            }
        }
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        self.store.remove(PROFILE_KEY).await
    }
}

#[cfg(test)]
mod profile_repo_tests {
    use super::*;
    use crate::profile::dto::complete_profile;
    use crate::storage::test_support::broken_store;

    #[tokio::test]
    async fn save_stamps_and_flags() {
        let repo = ProfileRepo::new(Store::in_memory());
        let saved = repo.save(complete_profile(), 1_000).await.unwrap();
        assert!(saved.complete);
        assert_eq!(saved.completed_at, 1_000);

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn load_recomputes_flag_from_fields() {
        let store = Store::in_memory();
        let mut forged = UserProfile::default();
        forged.complete = true;
        store.write_json(PROFILE_KEY, &forged).await.unwrap();

        let loaded = ProfileRepo::new(store).load().await.unwrap();
        assert!(!loaded.complete);
    }

    #[tokio::test]
    async fn clear_and_failures() {
        let repo = ProfileRepo::new(Store::in_memory());
        repo.save(complete_profile(), 1).await.unwrap();
        repo.clear().await.unwrap();
        assert!(repo.load().await.is_none());

        let broken = ProfileRepo::new(broken_store());
        assert!(broken.load().await.is_none());
        assert!(broken.save(complete_profile(), 1).await.is_err());
    }
}
