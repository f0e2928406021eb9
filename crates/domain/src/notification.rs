use crate::shared::recurrence::Recurrence;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const NOTIFICATION_TITLE: &str = "Hi there, time to take your medication.";

/// Identifier handed out by the notification scheduler for a registered `Trigger`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `Trigger` describes one recurring firing time of a notification.
/// This is what gets handed to the notification scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub hour: u32,
    pub minute: u32,
    pub repeats: bool,
    pub recurrence: Recurrence,
}

impl Trigger {
    pub fn daily_at(time: NaiveTime) -> Self {
        Self::recurring_at(time, Recurrence::daily())
    }

    pub fn recurring_at(time: NaiveTime, recurrence: Recurrence) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
            repeats: true,
            recurrence,
        }
    }

    pub fn time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }

    /// First wall clock time strictly after `after` at which this `Trigger` fires
    pub fn first_occurrence_after(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        let candidate = after.date().and_time(self.time()?);
        if candidate > after {
            Some(candidate)
        } else {
            candidate.checked_add_signed(chrono::Duration::days(1))
        }
    }

    /// The `n`th firing counted from `first`, `None` when the `Trigger` does not repeat
    pub fn occurrence(&self, first: NaiveDateTime, n: u32) -> Option<NaiveDateTime> {
        match (n, self.repeats) {
            (0, _) => Some(first),
            (_, false) => None,
            (n, true) => self.recurrence.nth(first, n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// What the user gets to see when a notification fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub data: NotificationData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub content: NotificationContent,
    pub trigger: Trigger,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 5, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn finds_first_occurrence_today_or_tomorrow() {
        let trigger = Trigger::daily_at(NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(trigger.first_occurrence_after(at(10, 7, 59)), Some(at(10, 8, 0)));
        assert_eq!(trigger.first_occurrence_after(at(10, 8, 0)), Some(at(11, 8, 0)));
        assert_eq!(trigger.first_occurrence_after(at(10, 23, 0)), Some(at(11, 8, 0)));
    }

    #[test]
    fn only_repeating_triggers_have_later_occurrences() {
        let mut trigger = Trigger::recurring_at(
            NaiveTime::from_hms_opt(21, 15, 0).unwrap(),
            Recurrence::every_n_days(3),
        );
        let first = at(1, 21, 15);
        assert_eq!(trigger.occurrence(first, 0), Some(first));
        assert_eq!(trigger.occurrence(first, 2), Some(at(7, 21, 15)));

        trigger.repeats = false;
        assert_eq!(trigger.occurrence(first, 0), Some(first));
        assert_eq!(trigger.occurrence(first, 1), None);
    }
}
