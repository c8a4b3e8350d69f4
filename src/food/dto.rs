use serde::{Deserialize, Serialize};

use super::services::{FoodIdentification, Identification};

#[derive(Debug, Deserialize)]
pub struct IdentifyRequest {
    /// Base64 JPEG, optionally with a `data:image/...;base64,` prefix.
    pub image_b64: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifyOutcome {
    Detected,
    Demo,
    NoFood,
}

#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
    pub outcome: IdentifyOutcome,
    pub food: Option<FoodIdentification>,
}

impl From<Identification> for IdentifyResponse {
    fn from(id: Identification) -> Self {
        let outcome = match &id {
            Identification::Detected(_) => IdentifyOutcome::Detected,
            Identification::Demo(_) => IdentifyOutcome::Demo,
            Identification::NoFood => IdentifyOutcome::NoFood,
        };
        Self {
            outcome,
            food: id.into_food(),
        }
    }
}
