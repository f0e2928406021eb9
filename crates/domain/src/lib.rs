mod medication;
mod notification;
mod schedule;
mod shared;

pub use medication::{Medication, MedicationDetails, MedicationForm};
pub use notification::{
    NotificationContent, NotificationData, NotificationId, NotificationRequest, Trigger,
    NOTIFICATION_TITLE,
};
pub use schedule::{derive_triggers, ScheduleError, ScheduleLabel};
pub use shared::entity::{Entity, InvalidIDError, OwnerId, ID};
pub use shared::recurrence::{RRuleFrequency, Recurrence};
