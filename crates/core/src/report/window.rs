use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Error returned when a report window string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid report window: {0} (expected one of: all, 7d, 30d, 90d)")]
pub struct ParseWindowError(pub String);

/// The time range a sales report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum ReportWindow {
    #[default]
    #[serde(rename = "all")]
    AllTime,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
}

impl ReportWindow {
    pub const ALL: [Self; 4] = [
        Self::AllTime,
        Self::Last7Days,
        Self::Last30Days,
        Self::Last90Days,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AllTime => "all",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AllTime => "All time",
            Self::Last7Days => "Last 7 days",
            Self::Last30Days => "Last 30 days",
            Self::Last90Days => "Last 90 days",
        }
    }

    #[must_use]
    pub const fn days(&self) -> Option<i64> {
        match self {
            Self::AllTime => None,
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
        }
    }

    /// The earliest instant inside the window, or `None` for all time.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|days| now - Duration::days(days))
    }

    /// Whether `date` falls inside the window ending at `now`.
    #[must_use]
    pub fn contains(&self, date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.cutoff(now).is_none_or(|cutoff| date >= cutoff)
    }
}

impl std::fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportWindow {
    type Err = ParseWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|window| window.as_str() == s)
            .ok_or_else(|| ParseWindowError(s.to_owned()))
    }
}
