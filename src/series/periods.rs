use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar bucket size for per-period breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Daily,
    /// Weeks start on Monday.
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl Granularity {
    /// First day of the period containing `date`.
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => date,
            Granularity::Weekly => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Granularity::Monthly => date.with_day(1).unwrap_or(date),
            Granularity::Yearly => date.with_ordinal(1).unwrap_or(date),
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(Granularity::Daily),
            "weekly" | "week" => Ok(Granularity::Weekly),
            "monthly" | "month" => Ok(Granularity::Monthly),
            "yearly" | "year" => Ok(Granularity::Yearly),
            other => Err(format!(
                "unknown granularity {other:?} (expected daily, weekly, monthly or yearly)"
            )),
        }
    }
}
