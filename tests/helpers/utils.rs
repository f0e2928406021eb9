use chrono::{NaiveDate, NaiveTime};
use medication_reminder_domain::{MedicationDetails, ScheduleLabel};

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn details(name: &str, schedule: ScheduleLabel, times_of_day: Vec<NaiveTime>) -> MedicationDetails {
    MedicationDetails {
        name: name.into(),
        dose: "200mg".into(),
        form: "Tablet".into(),
        bottle_quantity: "30".into(),
        schedule,
        times_of_day,
        start_date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2023, 7, 31).unwrap(),
    }
}
