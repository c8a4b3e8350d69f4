use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderCategory {
    Health,
    Nutrition,
    Wellness,
    Activity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderType {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub default_time: &'static str,
    pub category: ReminderCategory,
}

const fn reminder(
    id: &'static str,
    title: &'static str,
    description: &'static str,
    icon: &'static str,
    default_time: &'static str,
    category: ReminderCategory,
) -> ReminderType {
    ReminderType {
        id,
        title,
        description,
        icon,
        default_time,
        category,
    }
}

pub const AVAILABLE_REMINDERS: &[ReminderType] = &[
    reminder("water", "Drink Water", "Stay hydrated throughout the day", "Droplets", "09:00", ReminderCategory::Health),
    reminder("walk", "Take a Walk", "Get some fresh air and movement", "Activity", "14:00", ReminderCategory::Activity),
    reminder("stretch", "Stretch Break", "Relieve tension with gentle stretches", "Zap", "11:00", ReminderCategory::Wellness),
    reminder("mindfulness", "Mindful Moment", "Take a moment to breathe and center yourself", "Heart", "16:00", ReminderCategory::Wellness),
    reminder("posture", "Check Posture", "Adjust your sitting position", "User", "10:00", ReminderCategory::Health),
    reminder("snack", "Healthy Snack", "Time for a nutritious snack", "Apple", "15:30", ReminderCategory::Nutrition),
    reminder("sleep", "Wind Down", "Start preparing for bedtime", "Moon", "21:00", ReminderCategory::Wellness),
    reminder("vitamins", "Take Vitamins", "Don't forget your daily supplements", "Pill", "08:00", ReminderCategory::Health),
];

pub fn find(reminder_id: &str) -> Option<&'static ReminderType> {
    AVAILABLE_REMINDERS.iter().find(|r| r.id == reminder_id)
}

#[cfg(test)]
mod catalog_tests {
    use super::*;

    #[test]
    fn catalog_lookup() {
        assert_eq!(AVAILABLE_REMINDERS.len(), 8);
        assert_eq!(find("snack").unwrap().default_time, "15:30");
        assert!(find("nap").is_none());
    }
}
