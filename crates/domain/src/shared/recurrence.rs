use chrono::{Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RRuleFrequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
}

/// How often a repeating notification fires: every `interval` units of `freq`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recurrence {
    pub freq: RRuleFrequency,
    pub interval: u32,
}

impl Default for Recurrence {
    fn default() -> Self {
        Self::daily()
    }
}

impl Recurrence {
    pub fn new(freq: RRuleFrequency, interval: u32) -> Self {
        Self {
            freq,
            interval: interval.max(1),
        }
    }

    pub fn daily() -> Self {
        Self::new(RRuleFrequency::Daily, 1)
    }

    pub fn every_n_days(days: u32) -> Self {
        Self::new(RRuleFrequency::Daily, days)
    }

    pub fn weekly() -> Self {
        Self::new(RRuleFrequency::Weekly, 1)
    }

    pub fn monthly() -> Self {
        Self::new(RRuleFrequency::Monthly, 1)
    }

    pub fn yearly() -> Self {
        Self::new(RRuleFrequency::Yearly, 1)
    }

    pub fn is_daily(&self) -> bool {
        self.freq == RRuleFrequency::Daily && self.interval == 1
    }

    /// The `n`th occurrence counted from `anchor` (which is occurrence 0).
    ///
    /// Occurrences are always computed from the anchor, so a monthly series
    /// starting on the 31st lands on the last day of shorter months and goes
    /// back to the 31st afterwards.
    pub fn nth(&self, anchor: NaiveDateTime, n: u32) -> Option<NaiveDateTime> {
        let steps = self.interval.checked_mul(n)?;
        match self.freq {
            RRuleFrequency::Daily => anchor.checked_add_signed(Duration::days(steps as i64)),
            RRuleFrequency::Weekly => anchor.checked_add_signed(Duration::weeks(steps as i64)),
            RRuleFrequency::Monthly => anchor.checked_add_months(Months::new(steps)),
            RRuleFrequency::Yearly => anchor.checked_add_months(Months::new(steps.checked_mul(12)?)),
        }
    }
}
