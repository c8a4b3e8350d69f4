use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::error;

use crate::clock::{from_ms, to_ms, DAY_MS};
use crate::storage::{Store, LAST_WELLNESS_CHECK_KEY, WELLNESS_KEY};

pub const SCORE_RANGE: std::ops::RangeInclusive<u8> = 1..=10;
const SUPPORT_BELOW: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessEntry {
    pub mood_score: u8,
    pub energy_level: u8,
    pub timestamp: i64,
    #[serde(default)]
    pub support_option: Option<String>,
}

impl WellnessEntry {
    pub fn is_valid(&self) -> bool {
        SCORE_RANGE.contains(&self.mood_score) && SCORE_RANGE.contains(&self.energy_level)
    }

    /// Low mood or low energy.
    pub fn needs_support(&self) -> bool {
        self.mood_score < SUPPORT_BELOW || self.energy_level < SUPPORT_BELOW
    }
}

#[derive(Clone)]
pub struct WellnessRepo {
    store: Store,
}

impl WellnessRepo {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn save(&self, entry: &WellnessEntry, now: OffsetDateTime) -> anyhow::Result<()> {
        anyhow::ensure!(entry.is_valid(), "wellness scores out of range");
        self.store.write_json(WELLNESS_KEY, entry).await?;
        self.store
            .write_json(LAST_WELLNESS_CHECK_KEY, &to_ms(now))
            .await
    }

    pub async fn latest(&self) -> Option<WellnessEntry> {
        self.store
            .read_json::<WellnessEntry>(WELLNESS_KEY)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, key = WELLNESS_KEY, "error getting wellness data");
                None
            })
    }

    /// The latest entry, if it was recorded on `now`'s UTC date.
    pub async fn todays(&self, now: OffsetDateTime) -> Option<WellnessEntry> {
        let entry = self.latest().await?;
        let recorded = from_ms(entry.timestamp)?;
        (recorded.date() == now.date()).then_some(entry)
    }

    /// True on first use, after 24 hours, or when the last check can't be read.
    pub async fn should_show_check(&self, now: OffsetDateTime) -> bool {
        match self.store.read_json::<i64>(LAST_WELLNESS_CHECK_KEY).await {
            Ok(Some(last)) => to_ms(now) - last > DAY_MS,
            Ok(None) => true,
            Err(e) => {
                error!(error = %e, key = LAST_WELLNESS_CHECK_KEY, "error checking wellness status");
                true
            }
        }
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        self.store.remove(WELLNESS_KEY).await?;
        self.store.remove(LAST_WELLNESS_CHECK_KEY).await
    }
}
