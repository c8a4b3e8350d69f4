use serde::Deserialize;

const VISION_PLACEHOLDER_KEY: &str = "your_google_vision_api_key_here";
const GEMINI_PLACEHOLDER_KEY: &str = "your_gemini_api_key_here";

#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    /// `None` selects demo mode.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub max_results: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// `None` selects the rule-based tip generator.
    pub api_key: Option<String>,
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub vision: VisionConfig,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let vision = VisionConfig {
            api_key: api_key_from_env("GOOGLE_VISION_API_KEY", VISION_PLACEHOLDER_KEY),
            endpoint: std::env::var("VISION_API_URL")
                .unwrap_or_else(|_| "https://vision.googleapis.com/v1/images:annotate".into()),
            max_results: std::env::var("VISION_MAX_RESULTS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(20),
        };
        let gemini = GeminiConfig {
            api_key: api_key_from_env("GEMINI_API_KEY", GEMINI_PLACEHOLDER_KEY),
            endpoint: std::env::var("GEMINI_API_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
                    .into()
            }),
        };
        Ok(Self {
            database_url,
            vision,
            gemini,
        })
    }
}

fn api_key_from_env(var: &str, placeholder: &str) -> Option<String> {
    normalize_api_key(std::env::var(var).ok(), placeholder)
}

/// Treats unset, blank and placeholder keys as absent.
fn normalize_api_key(raw: Option<String>, placeholder: &str) -> Option<String> {
    raw.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != placeholder)
}
