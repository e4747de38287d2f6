use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The reporting interval of the time filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Year,
    Quarter,
    #[default]
    Month,
    Week,
    Day,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Quarter => "quarter",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
        }
    }

    /// The canonical time-filter value for a date in this interval, as
    /// understood by the filter syntax: `2023`, `2023-Q1`, `2023-03`,
    /// `2023-W12`, `2023-03-14`.
    pub fn time_filter_value(&self, date: NaiveDate) -> String {
        match self {
            Self::Year => date.year().to_string(),
            Self::Quarter => format!("{}-Q{}", date.year(), date.month0() / 3 + 1),
            Self::Month => date.format("%Y-%m").to_string(),
            Self::Week => date.format("%Y-W%W").to_string(),
            Self::Day => date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl FromStr for Interval {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "year" => Ok(Self::Year),
            "quarter" => Ok(Self::Quarter),
            "month" => Ok(Self::Month),
            "week" => Ok(Self::Week),
            "day" => Ok(Self::Day),
            _ => Err(AppError::UnknownInterval(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_time_filter_values() {
        let d = date(2023, 3, 14);
        assert_eq!(Interval::Year.time_filter_value(d), "2023");
        assert_eq!(Interval::Quarter.time_filter_value(d), "2023-Q1");
        assert_eq!(Interval::Month.time_filter_value(d), "2023-03");
        assert_eq!(Interval::Week.time_filter_value(d), "2023-W11");
        assert_eq!(Interval::Day.time_filter_value(d), "2023-03-14");
    }

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(Interval::Quarter.time_filter_value(date(2023, 1, 1)), "2023-Q1");
        assert_eq!(Interval::Quarter.time_filter_value(date(2023, 4, 1)), "2023-Q2");
        assert_eq!(Interval::Quarter.time_filter_value(date(2023, 12, 31)), "2023-Q4");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("month".parse::<Interval>().unwrap(), Interval::Month);
        assert_eq!("Week".parse::<Interval>().unwrap(), Interval::Week);
        assert!(matches!(
            "fortnight".parse::<Interval>(),
            Err(AppError::UnknownInterval(_))
        ));
    }

    #[test]
    fn test_default_is_month() {
        assert_eq!(Interval::default(), Interval::Month);
    }
}
