//! Twice-daily refresh schedule.
//!
//! Trigger instants are fixed UTC times of day. The defaults, 11:00 and 01:00
//! UTC, correspond to 06:00 and 20:00 US Eastern (standard time). The evening
//! trigger falls on the next UTC day, so each trigger is checked on its own
//! rather than as a range.

use time::macros::time;
use time::Time;

use crate::{UtcDateTime, ValidationError};

pub const MORNING_TRIGGER: Time = time!(11:00);
pub const EVENING_TRIGGER: Time = time!(01:00);

/// Decides when stored data is stale and when the next refresh is scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSchedule {
    triggers: Vec<Time>,
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        Self {
            triggers: vec![MORNING_TRIGGER, EVENING_TRIGGER],
        }
    }
}

impl RefreshSchedule {
    pub fn new(triggers: Vec<Time>) -> Result<Self, ValidationError> {
        if triggers.is_empty() {
            return Err(ValidationError::EmptySchedule);
        }
        Ok(Self { triggers })
    }

    /// Builds a schedule from `HH:MM` trigger times.
    pub fn parse<I, T>(triggers: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let triggers = triggers
            .into_iter()
            .map(|trigger| Self::parse_trigger(trigger.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(triggers)
    }

    /// Parses a `HH:MM` trigger time.
    pub fn parse_trigger(value: &str) -> Result<Time, ValidationError> {
        let invalid = || ValidationError::InvalidTriggerTime {
            value: value.to_owned(),
        };
        let (hour, minute) = value.trim().split_once(':').ok_or_else(invalid)?;
        let hour = hour.parse::<u8>().map_err(|_| invalid())?;
        let minute = minute.parse::<u8>().map_err(|_| invalid())?;
        Time::from_hms(hour, minute, 0).map_err(|_| invalid())
    }

    pub fn triggers(&self) -> &[Time] {
        &self.triggers
    }

    /// True when nothing was fetched yet, when `now` is on a later UTC day
    /// than `last_fetch`, or when `now` has passed a trigger that `last_fetch`
    /// had not yet reached.
    pub fn is_refresh_due(&self, last_fetch: Option<UtcDateTime>, now: UtcDateTime) -> bool {
        let Some(last_fetch) = last_fetch else {
            return true;
        };

        if last_fetch.date() != now.date() {
            return true;
        }

        self.triggers
            .iter()
            .any(|&trigger| now.time() >= trigger && last_fetch.time() < trigger)
    }

    /// The soonest trigger instant strictly after `now`, or `now` itself when
    /// nothing was fetched yet.
    pub fn next_trigger(&self, last_fetch: Option<UtcDateTime>, now: UtcDateTime) -> UtcDateTime {
        if last_fetch.is_none() {
            return now;
        }

        let mut triggers = self.triggers.clone();
        triggers.sort();

        let today = now.date();
        let days = [Some(today), today.next_day()];
        days.into_iter()
            .flatten()
            .flat_map(|date| triggers.iter().map(move |&trigger| UtcDateTime::at(date, trigger)))
            .find(|candidate| *candidate > now)
            .unwrap_or(now)
    }

    /// Human readable trigger list, e.g. `11:00 UTC, 01:00 UTC`.
    pub fn describe(&self) -> String {
        self.triggers
            .iter()
            .map(|trigger| format!("{:02}:{:02} UTC", trigger.hour(), trigger.minute()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
