use serde::{Deserialize, Serialize};

/// Flat questionnaire record. Unset fields deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    // demographics
    pub age: String,
    pub gender: String,
    pub height: String,
    pub current_weight: String,
    pub target_weight: String,

    pub activity_level: String,
    pub primary_goals: Vec<String>,

    pub allergies: Vec<String>,
    pub intolerances: Vec<String>,

    pub dietary_restrictions: Vec<String>,
    pub meat_preferences: Vec<String>,
    pub seafood_preferences: Vec<String>,
    pub disliked_foods: Vec<String>,

    pub cooking_habits: String,
    pub meal_frequency: String,
    pub hydration_prefs: Vec<String>,
    pub daily_water_intake: String,

    pub health_conditions: Vec<String>,
    pub medications: Vec<String>,
    pub eating_behaviors: Vec<String>,

    pub budget: String,
    pub time_constraints: String,
    pub cultural_prefs: Vec<String>,
    pub special_considerations: Vec<String>,

    pub completed_at: i64,
    /// Cached result of [`UserProfile::is_complete`]; never trusted on read.
    #[serde(rename = "isComplete")]
    pub complete: bool,
}

impl UserProfile {
    /// Every essential field is non-blank and at least one goal is chosen.
    pub fn is_complete(&self) -> bool {
        let essentials = [
            &self.age,
            &self.gender,
            &self.height,
            &self.current_weight,
            &self.activity_level,
            &self.cooking_habits,
            &self.meal_frequency,
            &self.daily_water_intake,
            &self.budget,
            &self.time_constraints,
        ];
        essentials.iter().all(|f| !f.trim().is_empty()) && !self.primary_goals.is_empty()
    }

    /// Recomputes the stored completeness flag from the raw fields.
    pub fn with_completeness(mut self) -> Self {
        self.complete = self.is_complete();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub demographics: String,
    pub goals: String,
    pub dietary: String,
    pub health: String,
}

impl ProfileSummary {
    pub fn from_profile(p: &UserProfile) -> Self {
        let demographics = format!(
            "{} • {} • {} • {}",
            p.age, p.gender, p.height, p.current_weight
        );
        let goals = first_two(&p.primary_goals).unwrap_or_else(|| "No goals specified".into());
        let dietary =
            first_two(&p.dietary_restrictions).unwrap_or_else(|| "No restrictions".into());
        let health_items: Vec<String> = p
            .allergies
            .iter()
            .chain(p.health_conditions.iter())
            .cloned()
            .collect();
        let health = first_two(&health_items).unwrap_or_else(|| "No conditions reported".into());
        Self {
            demographics,
            goals,
            dietary,
            health,
        }
    }
}

fn first_two(items: &[String]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let mut out = items.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
    if items.len() > 2 {
        out.push_str("...");
    }
    Some(out)
}

#[cfg(test)]
pub(crate) fn complete_profile() -> UserProfile {
    UserProfile {
        age: "32".into(),
        gender: "Female".into(),
        height: "168 cm".into(),
        current_weight: "70 kg".into(),
        target_weight: "64 kg".into(),
        activity_level: "Sedentary (little to no exercise)".into(),
        primary_goals: vec!["Weight loss".into()],
        allergies: vec!["None".into()],
        dietary_restrictions: vec!["No restrictions".into()],
        cooking_habits: "I rarely cook".into(),
        meal_frequency: "3 meals".into(),
        daily_water_intake: "Less than 1L".into(),
        health_conditions: vec!["Diabetes".into()],
        budget: "Very limited".into(),
        time_constraints: "Less than 15 minutes".into(),
        ..UserProfile::default()
    }
}

#[cfg(test)]
mod profile_dto_tests {
    use super::*;

    #[test]
    fn completeness_needs_essentials_and_a_goal() {
        let p = complete_profile();
        assert!(p.is_complete());

        let mut no_goal = p.clone();
        no_goal.primary_goals.clear();
        assert!(!no_goal.is_complete());

        let mut blank_budget = p.clone();
        blank_budget.budget = "   ".into();
        assert!(!blank_budget.is_complete());

        // target weight is not essential.
        let mut no_target = p;
        no_target.target_weight.clear();
        assert!(no_target.is_complete());
    }

    #[test]
    fn stored_flag_is_ignored_until_recomputed() {
        let mut p = UserProfile::default();
        p.complete = true;
        assert!(!p.is_complete());
        assert!(!p.with_completeness().complete);
    }

    #[test]
    fn deserializes_partial_camel_case() {
        let p: UserProfile =
            serde_json::from_str(r#"{"age":"40","primaryGoals":["Energy"],"isComplete":true}"#)
                .unwrap();
        assert_eq!(p.age, "40");
        assert_eq!(p.primary_goals, vec!["Energy".to_string()]);
        assert!(p.complete);
        assert!(p.gender.is_empty());
    }

    #[test]
    fn summary_truncates_lists() {
        let mut p = complete_profile();
        p.primary_goals = vec!["A".into(), "B".into(), "C".into()];
        p.dietary_restrictions.clear();
        p.allergies = vec!["Peanuts".into()];
        let s = ProfileSummary::from_profile(&p);
        assert_eq!(s.demographics, "32 • Female • 168 cm • 70 kg");
        assert_eq!(s.goals, "A, B...");
        assert_eq!(s.dietary, "No restrictions");
        assert_eq!(s.health, "Peanuts, Diabetes");

        let empty = ProfileSummary::from_profile(&UserProfile::default());
        assert_eq!(empty.goals, "No goals specified");
        assert_eq!(empty.health, "No conditions reported");
    }
}
