use super::dto::{NutritionTip, TipCategory, TipPriority};
use crate::profile::dto::UserProfile;

const MAX_TIPS: usize = 10;

const GENERAL_TIPS: &[(&str, TipCategory)] = &[
    (
        "Include a variety of colorful fruits and vegetables to ensure you're getting a wide range of vitamins and antioxidants.",
        TipCategory::Nutrients,
    ),
    (
        "Practice mindful eating by chewing slowly and paying attention to hunger and fullness cues.",
        TipCategory::Goals,
    ),
    (
        "Plan your meals and snacks in advance to avoid impulsive food choices and ensure balanced nutrition.",
        TipCategory::MealPlanning,
    ),
];

/// Rule-based tips derived from the profile, used without a text-generation source.
pub fn mock_tips(p: &UserProfile, now: i64) -> Vec<NutritionTip> {
    let mut picked: Vec<(&str, TipCategory, TipPriority)> = vec![(
        "Start your day with a protein-rich breakfast to maintain stable blood sugar levels and reduce cravings throughout the day.",
        TipCategory::MealPlanning,
        TipPriority::High,
    )];

    let activity = p.activity_level.as_str();
    if activity.contains("Sedentary") {
        picked.push((
            "Focus on smaller, more frequent meals to boost metabolism and maintain energy levels during desk work.",
            TipCategory::Timing,
            TipPriority::High,
        ));
    } else if activity.contains("Very active") || activity.contains("Extremely active") {
        picked.push((
            "Consume a combination of carbs and protein within 30 minutes after intense workouts to optimize recovery.",
            TipCategory::Timing,
            TipPriority::High,
        ));
    }

    let has_goal = |g: &str| p.primary_goals.iter().any(|x| x == g);
    if has_goal("Weight loss") {
        picked.push((
            "Fill half your plate with non-starchy vegetables to increase fiber intake and promote satiety while managing calories.",
            TipCategory::PortionControl,
            TipPriority::High,
        ));
    } else if has_goal("Weight gain/muscle building") {
        picked.push((
            "Add healthy calorie-dense foods like nuts, avocados, and olive oil to increase your daily caloric intake.",
            TipCategory::Nutrients,
            TipPriority::High,
        ));
    }

    if p.daily_water_intake == "Less than 1L" {
        picked.push((
            "Gradually increase your water intake by drinking a glass of water before each meal and snack.",
            TipCategory::Hydration,
            TipPriority::High,
        ));
    }

    if p.cooking_habits.contains("I don't cook") || p.cooking_habits.contains("I rarely cook") {
        picked.push((
            "Start with simple no-cook meals like Greek yogurt with berries, or pre-made salads with added protein.",
            TipCategory::Cooking,
            TipPriority::Medium,
        ));
    }

    if p.budget.contains("Very limited") {
        picked.push((
            "Buy dried beans, lentils, and whole grains in bulk - they're nutritious, filling, and cost-effective protein sources.",
            TipCategory::MealPlanning,
            TipPriority::Medium,
        ));
    }

    if p.time_constraints.contains("Less than 15 minutes") {
        picked.push((
            "Prepare overnight oats or chia puddings for quick, nutritious breakfasts that require no morning prep time.",
            TipCategory::MealPlanning,
            TipPriority::Medium,
        ));
    }

    if p.health_conditions.iter().any(|c| c == "Diabetes") {
        picked.push((
            "Pair carbohydrates with protein or healthy fats to slow glucose absorption and maintain stable blood sugar.",
            TipCategory::Health,
            TipPriority::High,
        ));
    }

    for (tip, category) in GENERAL_TIPS {
        if picked.len() >= MAX_TIPS {
            break;
        }
        picked.push((*tip, *category, TipPriority::Medium));
    }
    picked.truncate(MAX_TIPS);

    picked
        .into_iter()
        .enumerate()
        .map(|(i, (tip, category, priority))| NutritionTip {
            id: format!("tip_{}_{}", now, i + 1),
            tip: tip.to_string(),
            category,
            priority,
            created_at: now,
        })
        .collect()
}
