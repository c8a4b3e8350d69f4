use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, error, info};

use super::catalog;
use crate::clock::{to_ms, HOUR_MS};
use crate::storage::{Store, NOTIFICATIONS_KEY, REMINDER_SETTINGS_KEY};

pub const NOTIFICATION_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReminder {
    pub id: String,
    pub reminder_id: String,
    /// Local wall-clock "HH:MM".
    pub time: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_triggered: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    pub enabled: bool,
    #[serde(default)]
    pub user_reminders: Vec<UserReminder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveNotification {
    pub id: String,
    pub reminder_id: String,
    pub title: String,
    pub description: String,
    pub timestamp: i64,
    pub read: bool,
}

pub fn is_valid_time(time: &str) -> bool {
    lazy_static! {
        static ref HHMM_RE: Regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap();
    }
    HHMM_RE.is_match(time)
}

fn hhmm(now: OffsetDateTime) -> String {
    format!("{:02}:{:02}", now.hour(), now.minute())
}

#[derive(Clone)]
pub struct ReminderRepo {
    store: Store,
}

impl ReminderRepo {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Stored settings, or disabled-and-empty when absent or unreadable.
    pub async fn settings(&self) -> ReminderSettings {
        self.store
            .read_json::<ReminderSettings>(REMINDER_SETTINGS_KEY)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, key = REMINDER_SETTINGS_KEY, "error getting reminder settings");
                None
            })
            .unwrap_or_default()
    }

    pub async fn save_settings(&self, settings: &ReminderSettings) -> anyhow::Result<()> {
        self.store.write_json(REMINDER_SETTINGS_KEY, settings).await
    }

    async fn update_settings<R>(
        &self,
        f: impl FnOnce(&mut ReminderSettings) -> R,
    ) -> anyhow::Result<R> {
        self.store
            .update_json::<ReminderSettings, _, _>(REMINDER_SETTINGS_KEY, |slot| {
                f(slot.get_or_insert_with(ReminderSettings::default))
            })
            .await
    }

    pub async fn toggle(&self, enabled: bool) -> anyhow::Result<()> {
        self.update_settings(|s| s.enabled = enabled).await
    }

    /// Schedules `reminder_id` at `time`, replacing any reminder of that type.
    pub async fn add(&self, reminder_id: &str, time: &str, now: i64) -> anyhow::Result<UserReminder> {
        anyhow::ensure!(catalog::find(reminder_id).is_some(), "unknown reminder {}", reminder_id);
        anyhow::ensure!(is_valid_time(time), "invalid time {:?}, expected HH:MM", time);

        let reminder = UserReminder {
            id: now.to_string(),
            reminder_id: reminder_id.to_string(),
            time: time.to_string(),
            enabled: true,
            last_triggered: None,
        };
        let stored = reminder.clone();
        self.update_settings(move |s| {
            s.user_reminders.retain(|r| r.reminder_id != stored.reminder_id);
            s.user_reminders.push(stored);
        })
        .await?;
        Ok(reminder)
    }

    pub async fn remove(&self, reminder_id: &str) -> anyhow::Result<()> {
        self.update_settings(|s| s.user_reminders.retain(|r| r.reminder_id != reminder_id))
            .await
    }

    pub async fn toggle_reminder(&self, reminder_id: &str, enabled: bool) -> anyhow::Result<()> {
        self.update_settings(|s| {
            s.user_reminders
                .iter_mut()
                .filter(|r| r.reminder_id == reminder_id)
                .for_each(|r| r.enabled = enabled);
        })
        .await
    }

    pub async fn notifications(&self) -> Vec<ActiveNotification> {
        self.store
            .read_json::<Vec<ActiveNotification>>(NOTIFICATIONS_KEY)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, key = NOTIFICATIONS_KEY, "error getting notifications");
                None
            })
            .unwrap_or_default()
    }

    async fn push_notifications(&self, fresh: Vec<ActiveNotification>) {
        if fresh.is_empty() {
            return;
        }
        let res = self
            .store
            .update_json::<Vec<ActiveNotification>, _, _>(NOTIFICATIONS_KEY, |slot| {
                let list = slot.get_or_insert_with(Vec::new);
                for n in fresh {
                    list.insert(0, n);
                }
                list.truncate(NOTIFICATION_LIMIT);
            })
            .await;
        if let Err(e) = res {
            error!(error = %e, key = NOTIFICATIONS_KEY, "error adding notification");
        }
    }

    pub async fn mark_read(&self, notification_id: &str) -> bool {
        let res = self
            .store
            .update_json::<Vec<ActiveNotification>, _, _>(NOTIFICATIONS_KEY, |slot| {
                let Some(list) = slot.as_mut() else {
                    return false;
                };
                let mut hit = false;
                for n in list.iter_mut().filter(|n| n.id == notification_id) {
                    n.read = true;
                    hit = true;
                }
                hit
            })
            .await;
        res.unwrap_or_else(|e| {
            error!(error = %e, key = NOTIFICATIONS_KEY, "error marking notification as read");
            false
        })
    }

    pub async fn clear_notifications(&self) {
        if let Err(e) = self.store.remove(NOTIFICATIONS_KEY).await {
            error!(error = %e, key = NOTIFICATIONS_KEY, "error clearing notifications");
        }
    }

    /// Fires every enabled reminder set for `now`'s minute that has not fired in
    /// the last hour. Returns the notifications it queued.
    pub async fn check_due(&self, now: OffsetDateTime) -> anyhow::Result<Vec<ActiveNotification>> {
        let now_ms = to_ms(now);
        let current = hhmm(now);

        let fired = self
            .update_settings(|s| {
                let mut fired = Vec::new();
                if !s.enabled {
                    return fired;
                }
                for r in s.user_reminders.iter_mut().filter(|r| r.enabled) {
                    let Some(kind) = catalog::find(&r.reminder_id) else {
                        continue;
                    };
                    if r.time != current {
                        continue;
                    }
                    if r.last_triggered.is_some_and(|t| t >= now_ms - HOUR_MS) {
                        continue;
                    }
                    r.last_triggered = Some(now_ms);
                    fired.push(ActiveNotification {
                        id: format!("{}-{}", now_ms, r.reminder_id),
                        reminder_id: r.reminder_id.clone(),
                        title: kind.title.to_string(),
                        description: kind.description.to_string(),
                        timestamp: now_ms,
                        read: false,
                    });
                }
                fired
            })
            .await?;

        if fired.is_empty() {
            debug!(time = %current, "no reminders due");
        } else {
            info!(count = fired.len(), time = %current, "reminders fired");
        }
        self.push_notifications(fired.clone()).await;
        Ok(fired)
    }
}
