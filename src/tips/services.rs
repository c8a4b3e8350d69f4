use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use super::dto::{NutritionTip, TipBatch, TipCache, TipCategory, TipPriority, TipSource};
use super::generator::{build_prompt, parse_tips, GeminiClient, TextGenerator};
use super::mock::mock_tips;
use crate::clock::{now_ms, DAY_MS};
use crate::config::GeminiConfig;
use crate::profile::dto::UserProfile;
use crate::storage::{Store, NUTRITION_TIPS_KEY};

pub const TIPS_REFRESH_INTERVAL_MS: i64 = 7 * DAY_MS;
const EXPECTED_BATCH: usize = 10;

/// How tip batches are produced, chosen once at startup.
#[derive(Clone)]
pub enum TipGeneration {
    Live(Arc<dyn TextGenerator>),
    Mock,
}

impl TipGeneration {
    pub fn from_config(config: &GeminiConfig, client: reqwest::Client) -> Self {
        match &config.api_key {
            Some(key) => Self::Live(Arc::new(GeminiClient::new(
                client,
                key.clone(),
                config.endpoint.clone(),
            ))),
            None => {
                warn!("text-generation API key not configured; using rule-based tips");
                Self::Mock
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Live(_) => "live",
            Self::Mock => "mock",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashedFields<'a> {
    age: &'a str,
    gender: &'a str,
    activity_level: &'a str,
    primary_goals: &'a [String],
    allergies: &'a [String],
    health_conditions: &'a [String],
    dietary_restrictions: &'a [String],
    cooking_habits: &'a str,
    budget: &'a str,
    time_constraints: &'a str,
}

/// Fingerprint over the profile fields that shape tips. Other fields never
/// change it.
pub fn profile_hash(p: &UserProfile) -> String {
    let fields = HashedFields {
        age: &p.age,
        gender: &p.gender,
        activity_level: &p.activity_level,
        primary_goals: &p.primary_goals,
        allergies: &p.allergies,
        health_conditions: &p.health_conditions,
        dietary_restrictions: &p.dietary_restrictions,
        cooking_habits: &p.cooking_habits,
        budget: &p.budget,
        time_constraints: &p.time_constraints,
    };
    // serializing borrowed strings and string slices cannot fail.
    let json = serde_json::to_string(&fields).unwrap_or_default();
    STANDARD.encode(json)
}

fn needs_refresh(cache: Option<&TipCache>, hash: &str, now: i64) -> bool {
    match cache {
        None => true,
        Some(c) => {
            c.profile_hash != hash
                || now - c.generated_at > TIPS_REFRESH_INTERVAL_MS
                || c.tips.is_empty()
        }
    }
}

#[derive(Clone)]
pub struct TipsEngine {
    store: Store,
    generation: TipGeneration,
}

impl TipsEngine {
    pub fn new(store: Store, generation: TipGeneration) -> Self {
        Self { store, generation }
    }

    /// Produces a fresh batch. Never fails: any upstream or parse problem
    /// yields the rule-based batch tagged [`TipSource::Fallback`].
    #[instrument(skip(self, profile))]
    pub async fn generate(&self, profile: &UserProfile) -> TipBatch {
        let now = now_ms();
        let fallback = || TipBatch {
            tips: mock_tips(profile, now),
            source: TipSource::Fallback,
        };

        let generator = match &self.generation {
            TipGeneration::Mock => return fallback(),
            TipGeneration::Live(g) => g,
        };

        let text = match generator.generate(&build_prompt(profile)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "tip generation failed; using rule-based tips");
                return fallback();
            }
        };

        match parse_tips(&text, now) {
            Ok(tips) => {
                if tips.len() != EXPECTED_BATCH {
                    debug!(count = tips.len(), "generated tip batch has unexpected size");
                }
                TipBatch {
                    tips,
                    source: TipSource::Generated,
                }
            }
            Err(e) => {
                warn!(error = %e, "could not parse generated tips; using rule-based tips");
                fallback()
            }
        }
    }

    pub async fn cached(&self) -> Option<TipCache> {
        match self.store.read_json::<TipCache>(NUTRITION_TIPS_KEY).await {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, key = NUTRITION_TIPS_KEY, "error getting stored tips");
                None
            }
        }
    }

    async fn regenerate(&self, profile: &UserProfile) -> TipCache {
        let batch = self.generate(profile).await;
        let cache = TipCache {
            tips: batch.tips,
            generated_at: now_ms(),
            profile_hash: profile_hash(profile),
            last_shown_index: 0,
            source: batch.source,
        };
        if let Err(e) = self.store.write_json(NUTRITION_TIPS_KEY, &cache).await {
            error!(error = %e, key = NUTRITION_TIPS_KEY, "error saving nutrition tips");
        }
        info!(count = cache.tips.len(), source = ?cache.source, "nutrition tips regenerated");
        cache
    }

    /// Cache for `profile`, regenerated first when stale.
    async fn fresh_cache(&self, profile: &UserProfile) -> Option<TipCache> {
        if !profile.is_complete() {
            return None;
        }
        let cached = self.cached().await;
        if needs_refresh(cached.as_ref(), &profile_hash(profile), now_ms()) {
            return Some(self.regenerate(profile).await);
        }
        cached
    }

    pub async fn tips(&self, profile: &UserProfile) -> Vec<NutritionTip> {
        self.fresh_cache(profile)
            .await
            .map(|c| c.tips)
            .unwrap_or_default()
    }

    pub async fn current_tip(&self, profile: &UserProfile) -> Option<NutritionTip> {
        self.fresh_cache(profile).await?.current().cloned()
    }

    /// Moves to the next cached tip and persists the new position.
    pub async fn advance_tip(&self) -> Option<NutritionTip> {
        let res = self
            .store
            .update_json::<TipCache, _, _>(NUTRITION_TIPS_KEY, |slot| {
                let cache = slot.as_mut().filter(|c| !c.tips.is_empty())?;
                cache.last_shown_index = (cache.last_shown_index + 1) % cache.tips.len();
                cache.current().cloned()
            })
            .await;
        res.unwrap_or_else(|e| {
            error!(error = %e, key = NUTRITION_TIPS_KEY, "error advancing nutrition tip");
            None
        })
    }

    pub async fn force_refresh(&self, profile: &UserProfile) -> Vec<NutritionTip> {
        if !profile.is_complete() {
            return Vec::new();
        }
        self.regenerate(profile).await.tips
    }

    pub async fn tips_by_category(
        &self,
        profile: &UserProfile,
        category: TipCategory,
    ) -> Vec<NutritionTip> {
        let mut tips = self.tips(profile).await;
        tips.retain(|t| t.category == category);
        tips
    }

    pub async fn tips_by_priority(
        &self,
        profile: &UserProfile,
        priority: TipPriority,
    ) -> Vec<NutritionTip> {
        let mut tips = self.tips(profile).await;
        tips.retain(|t| t.priority == priority);
        tips
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(NUTRITION_TIPS_KEY).await {
            error!(error = %e, key = NUTRITION_TIPS_KEY, "error clearing nutrition tips");
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::NetworkError;

    /// Generator with a canned reply that counts calls.
    pub struct FakeGenerator {
        pub reply: Result<String, u16>,
        pub calls: AtomicUsize,
    }

    impl FakeGenerator {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(NetworkError::Status { status: *status }),
            }
        }
    }

    pub fn ten_tips_json() -> String {
        let tips: Vec<String> = (0..10)
            .map(|i| {
                format!(
                    r#"{{"tip":"Tip number {}","category":"hydration","priority":"{}"}}"#,
                    i,
                    if i % 2 == 0 { "high" } else { "low" }
                )
            })
            .collect();
        format!(r#"{{"tips":[{}]}}"#, tips.join(","))
    }
}
