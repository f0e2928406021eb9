use crate::{
    notification::{NotificationContent, NotificationData, NotificationId, NOTIFICATION_TITLE},
    schedule::{derive_triggers, ScheduleError, ScheduleLabel},
    shared::entity::{Entity, OwnerId, ID},
    Trigger,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// A `Medication` the owner takes on a schedule and wants to be reminded about.
///
/// The serialized field names are the ones used by the stored documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    #[serde(rename = "guid")]
    pub id: ID,
    #[serde(rename = "userId")]
    pub owner_id: OwnerId,
    pub name: String,
    pub dose: String,
    pub form: String,
    pub bottle_quantity: String,
    pub schedule: ScheduleLabel,
    #[serde(rename = "timesTaken", with = "times_of_day")]
    pub times_of_day: Vec<NaiveTime>,
    /// One identifier per active `Trigger`, in the order of `times_of_day`
    #[serde(rename = "notificationIdentifiers", default)]
    pub notification_ids: Vec<NotificationId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// The user editable parts of a `Medication`
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationDetails {
    pub name: String,
    pub dose: String,
    pub form: String,
    pub bottle_quantity: String,
    pub schedule: ScheduleLabel,
    pub times_of_day: Vec<NaiveTime>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Medication {
    /// Creates a new `Medication` without any scheduled notifications.
    /// The times of day are trimmed down to the ones the schedule uses.
    pub fn new(owner_id: OwnerId, details: MedicationDetails) -> Result<Self, ScheduleError> {
        let times_of_day = details.schedule.relevant_times(&details.times_of_day)?;
        Ok(Self {
            id: Default::default(),
            owner_id,
            name: details.name,
            dose: details.dose,
            form: details.form,
            bottle_quantity: details.bottle_quantity,
            schedule: details.schedule,
            times_of_day,
            notification_ids: Vec::new(),
            start_date: details.start_date,
            end_date: details.end_date,
        })
    }

    /// Applies the edited details, keeping `id`, `owner_id` and `notification_ids`.
    /// Returns whether the schedule or the relevant times of day changed.
    pub fn apply(&mut self, details: MedicationDetails) -> Result<bool, ScheduleError> {
        let times_of_day = details.schedule.relevant_times(&details.times_of_day)?;
        let schedule_changed = self.schedule != details.schedule || self.times_of_day != times_of_day;

        self.name = details.name;
        self.dose = details.dose;
        self.form = details.form;
        self.bottle_quantity = details.bottle_quantity;
        self.schedule = details.schedule;
        self.times_of_day = times_of_day;
        self.start_date = details.start_date;
        self.end_date = details.end_date;

        Ok(schedule_changed)
    }

    pub fn triggers(&self) -> Result<Vec<Trigger>, ScheduleError> {
        derive_triggers(self.schedule, &self.times_of_day)
    }

    pub fn notification_content(&self) -> NotificationContent {
        NotificationContent {
            title: NOTIFICATION_TITLE.into(),
            body: format!("{} - {} {}", self.name, self.dose, self.form),
            data: NotificationData {
                start_date: self.start_date,
                end_date: self.end_date,
            },
        }
    }
}

impl Entity for Medication {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// The forms suggested when entering a `Medication`.
/// `Medication::form` stays free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedicationForm {
    Tablet,
    Capsule,
    Liquid,
    Injection,
    Inhaler,
    Patch,
    Suppository,
    Cream,
    Ointment,
    Drops,
    Spray,
    Other,
}

impl MedicationForm {
    pub const ALL: [MedicationForm; 12] = [
        MedicationForm::Tablet,
        MedicationForm::Capsule,
        MedicationForm::Liquid,
        MedicationForm::Injection,
        MedicationForm::Inhaler,
        MedicationForm::Patch,
        MedicationForm::Suppository,
        MedicationForm::Cream,
        MedicationForm::Ointment,
        MedicationForm::Drops,
        MedicationForm::Spray,
        MedicationForm::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tablet => "Tablet",
            Self::Capsule => "Capsule",
            Self::Liquid => "Liquid",
            Self::Injection => "Injection",
            Self::Inhaler => "Inhaler",
            Self::Patch => "Patch",
            Self::Suppository => "Suppository",
            Self::Cream => "Cream",
            Self::Ointment => "Ointment",
            Self::Drops => "Drops",
            Self::Spray => "Spray",
            Self::Other => "Other",
        }
    }
}

impl Display for MedicationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MedicationForm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|form| form.as_str().eq_ignore_ascii_case(s.trim()))
            .cloned()
            .ok_or(())
    }
}

/// Times of day are stored as `HH:MM` strings
mod times_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(times: &[NaiveTime], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(times.iter().map(|t| t.format(FORMAT).to_string()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|t| {
                NaiveTime::parse_from_str(t, FORMAT)
                    .map_err(|_| serde::de::Error::custom(format!("Malformed time of day: {}", t)))
            })
            .collect()
    }
}
