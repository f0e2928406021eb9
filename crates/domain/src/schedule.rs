use crate::{notification::Trigger, shared::recurrence::Recurrence};
use chrono::NaiveTime;
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// How often a medication is taken.
///
/// The labels are part of the stored documents and are matched verbatim
/// (case-sensitive) when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleLabel {
    OnceADay,
    TwiceADay,
    ThreeTimesADay,
    FourTimesADay,
    EveryOtherDay,
    EveryThreeDays,
    EveryWeek,
    EveryMonth,
    EveryYear,
    AsNeeded,
}

impl ScheduleLabel {
    pub const ALL: [ScheduleLabel; 10] = [
        ScheduleLabel::OnceADay,
        ScheduleLabel::TwiceADay,
        ScheduleLabel::ThreeTimesADay,
        ScheduleLabel::FourTimesADay,
        ScheduleLabel::EveryOtherDay,
        ScheduleLabel::EveryThreeDays,
        ScheduleLabel::EveryWeek,
        ScheduleLabel::EveryMonth,
        ScheduleLabel::EveryYear,
        ScheduleLabel::AsNeeded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnceADay => "Once a day",
            Self::TwiceADay => "Twice a day",
            Self::ThreeTimesADay => "Three times a day",
            Self::FourTimesADay => "Four times a day",
            Self::EveryOtherDay => "Every other day",
            Self::EveryThreeDays => "Every three days",
            Self::EveryWeek => "Every week",
            Self::EveryMonth => "Every month",
            Self::EveryYear => "Every year",
            Self::AsNeeded => "As needed",
        }
    }

    /// Number of times a day the medication is taken, only defined
    /// for the labels with a fixed daily count
    pub fn daily_slots(&self) -> Option<usize> {
        match self {
            Self::OnceADay => Some(1),
            Self::TwiceADay => Some(2),
            Self::ThreeTimesADay => Some(3),
            Self::FourTimesADay => Some(4),
            _ => None,
        }
    }

    /// Cadence of the labels that fire less often than daily
    pub fn interval(&self) -> Option<Recurrence> {
        match self {
            Self::EveryOtherDay => Some(Recurrence::every_n_days(2)),
            Self::EveryThreeDays => Some(Recurrence::every_n_days(3)),
            Self::EveryWeek => Some(Recurrence::weekly()),
            Self::EveryMonth => Some(Recurrence::monthly()),
            Self::EveryYear => Some(Recurrence::yearly()),
            _ => None,
        }
    }

    /// Number of time pickers the add form shows for this label
    pub fn time_slots(&self) -> usize {
        match self {
            Self::AsNeeded => 0,
            label => label.daily_slots().unwrap_or(1),
        }
    }

    /// The times of day that are meaningful for this label.
    ///
    /// Fixed count labels keep their first `n` entries and fail when fewer
    /// are given. Interval labels keep only the first entry, which anchors
    /// the cadence. "As needed" keeps nothing.
    pub fn relevant_times(&self, times_of_day: &[NaiveTime]) -> Result<Vec<NaiveTime>, ScheduleError> {
        match self.daily_slots() {
            Some(required) if times_of_day.len() < required => {
                Err(ScheduleError::InvalidScheduleInput {
                    schedule: *self,
                    required,
                    provided: times_of_day.len(),
                })
            }
            Some(required) => Ok(times_of_day[..required].to_vec()),
            None if *self == Self::AsNeeded => Ok(Vec::new()),
            None => Ok(times_of_day.iter().take(1).cloned().collect()),
        }
    }
}

/// Computes the notification `Trigger`s a schedule needs.
///
/// The returned `Trigger`s are in the same order as `times_of_day`.
/// Nothing is scheduled by calling this.
pub fn derive_triggers(
    schedule: ScheduleLabel,
    times_of_day: &[NaiveTime],
) -> Result<Vec<Trigger>, ScheduleError> {
    let times = schedule.relevant_times(times_of_day)?;
    let recurrence = schedule.interval().unwrap_or_else(Recurrence::daily);

    Ok(times
        .into_iter()
        .map(|time| Trigger::recurring_at(time, recurrence))
        .collect())
}

#[derive(Error, Debug, PartialEq)]
pub enum ScheduleError {
    #[error("The schedule `{schedule}` requires {required} times of day, but only {provided} were given")]
    InvalidScheduleInput {
        schedule: ScheduleLabel,
        required: usize,
        provided: usize,
    },
    #[error("Unknown schedule: {0}")]
    UnknownSchedule(String),
}

impl Display for ScheduleLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScheduleLabel {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|label| label.as_str() == s)
            .cloned()
            .ok_or_else(|| ScheduleError::UnknownSchedule(s.to_string()))
    }
}

impl Serialize for ScheduleLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ScheduleLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ScheduleLabelVisitor;

        impl<'de> Visitor<'de> for ScheduleLabelVisitor {
            type Value = ScheduleLabel;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("One of the supported medication schedules")
            }

            fn visit_str<E>(self, value: &str) -> Result<ScheduleLabel, E>
            where
                E: serde::de::Error,
            {
                value.parse::<ScheduleLabel>().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(ScheduleLabelVisitor)
    }
}
