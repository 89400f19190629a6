//! Calendar-month usage buckets (UTC).

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::PERIOD_KEY_FORMAT;

/// The calendar month containing a moment. Rollover happens by key change, never by deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsagePeriod {
    key: String,
    start: DateTime<Utc>,
}

impl UsagePeriod {
    pub fn containing(at: DateTime<Utc>) -> Self {
        let date = at.date_naive();
        let first = date.with_day(1).unwrap_or(date);
        let start = first.and_time(NaiveTime::MIN).and_utc();
        Self {
            key: start.format(PERIOD_KEY_FORMAT).to_string(),
            start,
        }
    }

    /// `YYYY-MM`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }
}
