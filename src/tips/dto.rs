use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TipCategory {
    Hydration,
    MealPlanning,
    Nutrients,
    PortionControl,
    Timing,
    Supplements,
    Cooking,
    Snacks,
    Goals,
    Health,
}

impl TipCategory {
    pub const ALL: [TipCategory; 10] = [
        Self::Hydration,
        Self::MealPlanning,
        Self::Nutrients,
        Self::PortionControl,
        Self::Timing,
        Self::Supplements,
        Self::Cooking,
        Self::Snacks,
        Self::Goals,
        Self::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hydration => "hydration",
            Self::MealPlanning => "meal-planning",
            Self::Nutrients => "nutrients",
            Self::PortionControl => "portion-control",
            Self::Timing => "timing",
            Self::Supplements => "supplements",
            Self::Cooking => "cooking",
            Self::Snacks => "snacks",
            Self::Goals => "goals",
            Self::Health => "health",
        }
    }
}

impl fmt::Display for TipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercases and maps spaces/underscores to `-` before matching.
fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .collect()
}

impl FromStr for TipCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipPriority {
    High,
    Medium,
    Low,
}

impl FromStr for TipPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionTip {
    pub id: String,
    pub tip: String,
    pub category: TipCategory,
    pub priority: TipPriority,
    pub created_at: i64,
}

/// Which strategy produced a batch of tips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TipBatch {
    pub tips: Vec<NutritionTip>,
    pub source: TipSource,
}

/// Persisted tip cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipCache {
    pub tips: Vec<NutritionTip>,
    pub generated_at: i64,
    pub profile_hash: String,
    pub last_shown_index: usize,
    #[serde(default = "fallback_source")]
    pub source: TipSource,
}

fn fallback_source() -> TipSource {
    TipSource::Fallback
}

impl TipCache {
    pub fn current(&self) -> Option<&NutritionTip> {
        if self.tips.is_empty() {
            return None;
        }
        self.tips.get(self.last_shown_index % self.tips.len())
    }
}

#[derive(Debug, Deserialize)]
pub struct TipFilter {
    pub category: Option<String>,
    pub priority: Option<String>,
}
