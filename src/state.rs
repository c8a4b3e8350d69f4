use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::db;
use crate::food::services::{ClassificationMode, VisionClassifier};
use crate::history::repo::HistoryStore;
use crate::profile::repo::ProfileRepo;
use crate::recipes::repo::RecipeRepo;
use crate::reminders::repo::ReminderRepo;
use crate::storage::{PgKvStore, Store};
use crate::tips::services::{TipGeneration, TipsEngine};
use crate::wellness::repo::WellnessRepo;

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<VisionClassifier>,
    pub history: HistoryStore,
    pub profiles: ProfileRepo,
    pub tips: TipsEngine,
    pub wellness: WellnessRepo,
    pub recipes: RecipeRepo,
    pub reminders: ReminderRepo,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let store = match &config.database_url {
            Some(url) => {
                let pool = db::connect(url).await?;
                info!("using postgres key-value store");
                Store::new(Arc::new(PgKvStore::new(pool)))
            }
            None => {
                warn!("DATABASE_URL not set; state is kept in memory and lost on restart");
                Store::in_memory()
            }
        };

        let http = reqwest::Client::new();
        let mode = ClassificationMode::from_config(&config.vision, http.clone());
        let generation = TipGeneration::from_config(&config.gemini, http);
        info!(classification = mode.name(), tips = generation.name(), "upstream modes selected");

        Ok(Self::from_parts(
            store,
            VisionClassifier::new(mode, config.vision.max_results),
            generation,
        ))
    }

    pub fn from_parts(store: Store, classifier: VisionClassifier, generation: TipGeneration) -> Self {
        Self {
            classifier: Arc::new(classifier),
            history: HistoryStore::new(store.clone()),
            profiles: ProfileRepo::new(store.clone()),
            tips: TipsEngine::new(store.clone(), generation),
            wellness: WellnessRepo::new(store.clone()),
            recipes: RecipeRepo::new(store.clone()),
            reminders: ReminderRepo::new(store),
        }
    }

    /// In-memory state with demo classification and rule-based tips.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::from_parts(
            Store::in_memory(),
            VisionClassifier::new(ClassificationMode::Demo, 20),
            TipGeneration::Mock,
        )
    }
}
