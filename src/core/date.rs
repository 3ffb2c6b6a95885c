use chrono::{Duration, NaiveDate};
use std::fmt::Display;

/// Date format expected by the PrivatBank archive endpoint.
pub const PROVIDER_DATE_FORMAT: &str = "%d.%m.%Y";

/// A single past day to request rates for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRequest {
    date: NaiveDate,
}

impl DayRequest {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// The day `offset + 1` days before `today`, so offset 0 is yesterday.
    pub fn from_offset(today: NaiveDate, offset: u32) -> Self {
        Self::new(today - Duration::days(i64::from(offset) + 1))
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn formatted(&self) -> String {
        self.date.format(PROVIDER_DATE_FORMAT).to_string()
    }
}

impl Display for DayRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.date.format(PROVIDER_DATE_FORMAT))
    }
}

/// Requests for the `days` days preceding `today`, most recent first.
pub fn day_requests(today: NaiveDate, days: u32) -> Vec<DayRequest> {
    (0..days)
        .map(|offset| DayRequest::from_offset(today, offset))
        .collect()
}
