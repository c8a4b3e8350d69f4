use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::dto::{NutritionTip, TipCategory, TipPriority};
use crate::error::NetworkError;
use crate::profile::dto::UserProfile;

/// Free-text completion source.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, NetworkError>;
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: String, endpoint: String) -> Self {
        Self {
            client,
            api_key,
            endpoint,
        }
    }
}

pub(crate) fn generate_request(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "temperature": 0.7,
            "topK": 40,
            "topP": 0.95,
            "maxOutputTokens": 2048
        }
    })
}

pub(crate) fn extract_generated_text(body: &serde_json::Value) -> Option<&str> {
    body["candidates"][0]["content"]["parts"][0]["text"].as_str()
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, NetworkError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&generate_request(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response.json().await?;
        let text = extract_generated_text(&body)
            .ok_or_else(|| NetworkError::Malformed("no content generated".into()))?;
        debug!(text_len = text.len(), "text generated");
        Ok(text.to_string())
    }
}

#[derive(Debug, Error)]
pub enum TipParseError {
    #[error("no JSON object in generated text")]
    NoJson,
    #[error("invalid tips JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown tip category {0:?}")]
    UnknownCategory(String),
    #[error("unknown tip priority {0:?}")]
    UnknownPriority(String),
    #[error("generated tip list is empty")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct RawTips {
    tips: Vec<RawTip>,
}

#[derive(Debug, Deserialize)]
struct RawTip {
    tip: String,
    category: String,
    priority: String,
}

fn convert(raw: RawTip) -> Result<(String, TipCategory, TipPriority), TipParseError> {
    let category = raw
        .category
        .parse::<TipCategory>()
        .map_err(TipParseError::UnknownCategory)?;
    let priority = raw
        .priority
        .parse::<TipPriority>()
        .map_err(TipParseError::UnknownPriority)?;
    Ok((raw.tip, category, priority))
}

/// Pulls the outermost `{...}` out of `text` and turns it into tips.
/// Entries with an unknown category or priority are skipped; the batch only
/// fails when nothing usable is left.
pub fn parse_tips(text: &str, now: i64) -> Result<Vec<NutritionTip>, TipParseError> {
    lazy_static! {
        static ref JSON_OBJECT_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
    }
    let json = JSON_OBJECT_RE
        .find(text)
        .ok_or(TipParseError::NoJson)?
        .as_str();
    let raw: RawTips = serde_json::from_str(json)?;

    let tips: Vec<NutritionTip> = raw
        .tips
        .into_iter()
        .filter_map(|t| match convert(t) {
            Ok(parts) => Some(parts),
            Err(e) => {
                warn!(error = %e, "skipping generated tip");
                None
            }
        })
        .enumerate()
        .map(|(i, (tip, category, priority))| NutritionTip {
            id: format!("tip_{}_{}", now, i),
            tip,
            category,
            priority,
            created_at: now,
        })
        .collect();

    if tips.is_empty() {
        return Err(TipParseError::Empty);
    }
    Ok(tips)
}

fn listed(items: &[String], none_marker: Option<&str>) -> Option<String> {
    if items.is_empty() || none_marker.is_some_and(|m| items.iter().any(|i| i == m)) {
        None
    } else {
        Some(items.join(", "))
    }
}

/// Human-readable profile digest embedded in the prompt.
pub fn profile_summary(p: &UserProfile) -> String {
    let mut lines = vec![
        format!(
            "Demographics: {} years old, {}, {}, current weight {}, target weight {}",
            p.age, p.gender, p.height, p.current_weight, p.target_weight
        ),
        format!("Activity Level: {}", p.activity_level),
    ];
    if !p.primary_goals.is_empty() {
        lines.push(format!("Primary Goals: {}", p.primary_goals.join(", ")));
    }

    let optional = [
        ("Food Allergies", listed(&p.allergies, Some("None"))),
        ("Food Intolerances", listed(&p.intolerances, Some("None"))),
        ("Health Conditions", listed(&p.health_conditions, Some("None"))),
        ("Dietary Restrictions", listed(&p.dietary_restrictions, Some("No restrictions"))),
        ("Meat Preferences", listed(&p.meat_preferences, None)),
        ("Dislikes", listed(&p.disliked_foods, Some("None of the above"))),
    ];
    lines.extend(
        optional
            .into_iter()
            .filter_map(|(label, v)| v.map(|v| format!("{}: {}", label, v))),
    );

    lines.push(format!("Cooking Habits: {}", p.cooking_habits));
    lines.push(format!("Meal Frequency: {}", p.meal_frequency));
    lines.push(format!("Daily Water Intake: {}", p.daily_water_intake));
    if let Some(v) = listed(&p.eating_behaviors, Some("None of the above")) {
        lines.push(format!("Eating Behaviors: {}", v));
    }

    lines.push(format!("Budget: {}", p.budget));
    lines.push(format!("Time Constraints: {}", p.time_constraints));
    if let Some(v) = listed(&p.cultural_prefs, Some("No specific preference")) {
        lines.push(format!("Cultural Preferences: {}", v));
    }
    if let Some(v) = listed(&p.special_considerations, Some("None")) {
        lines.push(format!("Special Considerations: {}", v));
    }

    lines.join("\n")
}

pub fn build_prompt(p: &UserProfile) -> String {
    let categories = TipCategory::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"Based on the following user profile, provide exactly 10 personalized nutrition tips. Each tip should be practical, specific, and tailored to this user's needs, goals, and restrictions.

User Profile:
{summary}

Please provide 10 nutrition tips in the following JSON format:
{{
  "tips": [
    {{
      "tip": "Specific, actionable nutrition advice",
      "category": "one of: {categories}",
      "priority": "high, medium, or low based on importance for this user"
    }}
  ]
}}

Make sure each tip is:
- Specific to their goals, dietary restrictions, and health conditions
- Actionable and practical
- Considers their cooking habits, time constraints, and budget
- Addresses their activity level and lifestyle
- Takes into account any allergies or intolerances
- Relevant to their cultural preferences if specified

Focus on tips that will have the most impact for this specific user profile."#,
        summary = profile_summary(p),
        categories = categories,
    )
}

#[cfg(test)]
mod generator_tests {
    use super::*;
    use crate::profile::dto::complete_profile;

    #[test]
    fn parses_json_wrapped_in_prose() {
        let text = r#"Sure! Here you go:
```json
{"tips":[
  {"tip":"Drink water","category":"hydration","priority":"high"},
  {"tip":"Plan meals","category":"Meal Planning","priority":"Medium"}
]}
```
Enjoy."#;
        let tips = parse_tips(text, 7).unwrap();
        assert_eq!(tips.len(), 2);
        assert_eq!(tips[0].id, "tip_7_0");
        assert_eq!(tips[1].category, TipCategory::MealPlanning);
        assert_eq!(tips[1].priority, TipPriority::Medium);
        assert_eq!(tips[1].created_at, 7);
    }

    #[test]
    fn parse_failures() {
        assert!(matches!(parse_tips("no json here", 1), Err(TipParseError::NoJson)));
        assert!(matches!(parse_tips("{not json}", 1), Err(TipParseError::Json(_))));
        assert!(matches!(parse_tips(r#"{"tips":[]}"#, 1), Err(TipParseError::Empty)));
        assert!(matches!(
            parse_tips(r#"{"tips":[{"tip":"x","category":"dessert","priority":"low"}]}"#, 1),
            Err(TipParseError::Empty)
        ));
        assert!(matches!(
            parse_tips(r#"{"tips":[{"tip":"x","category":"goals","priority":"urgent"}]}"#, 1),
            Err(TipParseError::Empty)
        ));
    }

    #[test]
    fn unknown_entries_are_dropped_and_the_rest_kept() {
        let text = r#"{"tips":[
            {"tip":"Eat lean meat","category":"protein","priority":"high"},
            {"tip":"Drink water","category":"hydration","priority":"high"},
            {"tip":"Plan lunches","category":"meal planning","priority":"whenever"},
            {"tip":"Keep nuts handy","category":"snacks","priority":"low"}
        ]}"#;
        let tips = parse_tips(text, 5).unwrap();
        assert_eq!(tips.len(), 2);
        assert_eq!(tips[0].tip, "Drink water");
        assert_eq!(tips[0].id, "tip_5_0");
        assert_eq!(tips[1].category, TipCategory::Snacks);
        assert_eq!(tips[1].id, "tip_5_1");
    }

    #[test]
    fn unknown_values_are_reported_per_entry() {
        let bad = RawTip {
            tip: "x".into(),
            category: "protein".into(),
            priority: "high".into(),
        };
        assert!(matches!(convert(bad), Err(TipParseError::UnknownCategory(c)) if c == "protein"));
        let bad = RawTip {
            tip: "x".into(),
            category: "goals".into(),
            priority: "urgent".into(),
        };
        assert!(matches!(convert(bad), Err(TipParseError::UnknownPriority(p)) if p == "urgent"));
    }

    #[test]
    fn request_and_response_shapes() {
        let body = generate_request("hello");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);

        let resp = json!({"candidates":[{"content":{"parts":[{"text":"out"}]}}]});
        assert_eq!(extract_generated_text(&resp), Some("out"));
        assert_eq!(extract_generated_text(&json!({})), None);
    }

    #[test]
    fn summary_skips_none_markers() {
        let p = complete_profile();
        let s = profile_summary(&p);
        assert!(s.contains("Demographics: 32 years old, Female"));
        assert!(s.contains("Primary Goals: Weight loss"));
        assert!(s.contains("Health Conditions: Diabetes"));
        assert!(!s.contains("Food Allergies"));
        assert!(!s.contains("Dietary Restrictions"));

        let prompt = build_prompt(&p);
        assert!(prompt.contains("exactly 10 personalized nutrition tips"));
        assert!(prompt.contains("meal-planning, nutrients"));
    }
}
