use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recurring habit with its completion history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub title: String,
    pub icon: String,
    pub completed_dates: Vec<DateTime<Utc>>,
    /// "HH:MM" reminder, interpreted by whichever frontend schedules it.
    pub reminder_time: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub is_synced: bool,
}

impl Habit {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            icon: "🌱".to_string(),
            completed_dates: Vec::new(),
            reminder_time: None,
            timestamp: Utc::now(),
            is_synced: false,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_reminder(mut self, reminder_time: impl Into<String>) -> Self {
        self.reminder_time = Some(reminder_time.into());
        self
    }

    /// Current streak as of today (UTC days).
    pub fn current_streak(&self) -> u32 {
        current_streak_on(&self.completed_dates, Utc::now().date_naive())
    }
}

/// Counts the active streak by walking backward one day at a time.
///
/// The anchor is `today` when the habit was completed today, otherwise
/// yesterday: missing today does not break the streak until tomorrow.
/// If the newest completion predates yesterday the streak is 0.
pub fn current_streak_on(completed_dates: &[DateTime<Utc>], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = completed_dates.iter().map(|d| d.date_naive()).collect();
    days.sort_unstable();
    days.dedup();

    let newest = match days.last() {
        Some(d) => *d,
        None => return 0,
    };
    let yesterday = match today.pred_opt() {
        Some(d) => d,
        None => return 0,
    };
    if newest < yesterday {
        return 0;
    }

    let mut expected = if days.binary_search(&today).is_ok() {
        today
    } else {
        yesterday
    };

    let mut streak = 0;
    for day in days.iter().rev() {
        if *day > expected {
            // Completion dated after the anchor (clock skew); ignore it.
            continue;
        }
        if *day == expected {
            streak += 1;
            expected = match expected.pred_opt() {
                Some(d) => d,
                None => break,
            };
        } else {
            break;
        }
    }

    streak
}
