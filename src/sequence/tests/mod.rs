//! Unit tests for sequence services.


use chrono::{DateTime, Local, NaiveDate, Utc};
use mockable::Clock;
use std::sync::Mutex;

/// Clock pinned to a settable instant.
pub(super) struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub(super) fn on(date: NaiveDate) -> Self {
        let midday = date.and_hms_opt(12, 0, 0).expect("valid time").and_utc();
        Self {
            now: Mutex::new(midday),
        }
    }

    pub(super) fn advance_days(&self, days: i64) {
        let mut now = self.now.lock().expect("clock lock");
        *now += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}
