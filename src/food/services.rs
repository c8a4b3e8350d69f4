use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::category::{categorize, FoodCategory};
use super::labels::{best_food_label, is_food_related, Label};
use super::nutrition::{lookup, NutritionalInfo};
use super::vision::{GoogleVisionClient, LabelDetector};
use crate::clock::now_ms;
use crate::config::VisionConfig;
use crate::error::NetworkError;

/// A classified food item as stored in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodIdentification {
    pub name: String,
    pub confidence: f64,
    pub category: FoodCategory,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<NutritionalInfo>,
}

impl FoodIdentification {
    pub fn demo(timestamp: i64) -> Self {
        Self {
            name: "Demo Food Item".into(),
            confidence: 0.95,
            category: FoodCategory::Food,
            timestamp,
            nutritional_info: Some(NutritionalInfo::new("150 per serving", "5g", "25g", "3g")),
        }
    }

    pub fn from_label(label: &Label, timestamp: i64) -> Self {
        Self {
            name: label.description.clone(),
            confidence: round_confidence(label.score),
            category: categorize(&label.description),
            timestamp,
            nutritional_info: Some(lookup(&label.description)),
        }
    }
}

fn round_confidence(score: f64) -> f64 {
    ((score * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

/// Chosen once at startup from whether a vision key is configured.
#[derive(Clone)]
pub enum ClassificationMode {
    Demo,
    Live(Arc<dyn LabelDetector>),
}

impl ClassificationMode {
    pub fn from_config(config: &VisionConfig, client: reqwest::Client) -> Self {
        match &config.api_key {
            Some(key) => Self::Live(Arc::new(GoogleVisionClient::new(
                client,
                key.clone(),
                config.endpoint.clone(),
            ))),
            None => {
                warn!("vision API key not configured; classification runs in demo mode");
                Self::Demo
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::Live(_) => "live",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Identification {
    Detected(FoodIdentification),
    /// Fixed record returned when no credential is configured.
    Demo(FoodIdentification),
    NoFood,
}

impl Identification {
    pub fn food(&self) -> Option<&FoodIdentification> {
        match self {
            Self::Detected(f) | Self::Demo(f) => Some(f),
            Self::NoFood => None,
        }
    }

    pub fn into_food(self) -> Option<FoodIdentification> {
        match self {
            Self::Detected(f) | Self::Demo(f) => Some(f),
            Self::NoFood => None,
        }
    }
}

/// Runs the relevance filter and picks the best label, then builds the record.
pub fn identify_from_labels(labels: &[Label], timestamp: i64) -> Option<FoodIdentification> {
    if !is_food_related(labels) {
        return None;
    }
    best_food_label(labels).map(|l| FoodIdentification::from_label(l, timestamp))
}

#[derive(Clone)]
pub struct VisionClassifier {
    mode: ClassificationMode,
    max_results: u32,
}

impl VisionClassifier {
    pub fn new(mode: ClassificationMode, max_results: u32) -> Self {
        Self { mode, max_results }
    }

    /// One upstream call, no retry. Upstream failures propagate.
    #[instrument(skip(self, image), fields(mode = self.mode.name(), image_bytes = image.len()))]
    pub async fn identify_food(&self, image: &[u8]) -> Result<Identification, NetworkError> {
        let detector = match &self.mode {
            ClassificationMode::Demo => {
                return Ok(Identification::Demo(FoodIdentification::demo(now_ms())));
            }
            ClassificationMode::Live(d) => d,
        };

        let labels = detector.detect_labels(image, self.max_results).await?;
        match identify_from_labels(&labels, now_ms()) {
            Some(food) => {
                if food.nutritional_info.as_ref().is_some_and(NutritionalInfo::is_unknown) {
                    debug!(name = %food.name, "no nutrition data for food");
                }
                info!(name = %food.name, confidence = food.confidence, category = %food.category, "food identified");
                Ok(Identification::Detected(food))
            }
            None => {
                info!(labels = labels.len(), "no food detected");
                Ok(Identification::NoFood)
            }
        }
    }
}
