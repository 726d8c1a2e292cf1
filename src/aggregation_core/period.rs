//! Reporting period descriptors and their closed UTC date intervals

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodType {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "yearly")]
    Yearly,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Daily => "daily",
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
            PeriodType::Yearly => "yearly",
        }
    }
}

/// Identifies one reporting period. Which of month/week/day are required
/// depends on the period type; `date_range` rejects incomplete descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingPeriod {
    pub period_type: PeriodType,
    pub year: i32,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub day: Option<u32>,
}

impl ReportingPeriod {
    pub fn yearly(year: i32) -> Self {
        Self {
            period_type: PeriodType::Yearly,
            year,
            month: None,
            week: None,
            day: None,
        }
    }

    pub fn monthly(year: i32, month: u32) -> Self {
        Self {
            period_type: PeriodType::Monthly,
            year,
            month: Some(month),
            week: None,
            day: None,
        }
    }

    pub fn weekly(year: i32, week: u32) -> Self {
        Self {
            period_type: PeriodType::Weekly,
            year,
            month: None,
            week: Some(week),
            day: None,
        }
    }

    pub fn daily(year: i32, month: u32, day: u32) -> Self {
        Self {
            period_type: PeriodType::Daily,
            year,
            month: Some(month),
            week: None,
            day: Some(day),
        }
    }

    /// Closed UTC interval [from, to] covered by this period. Weekly periods
    /// follow ISO 8601 week numbering.
    pub fn date_range(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), Box<dyn std::error::Error>> {
        let (start, next_start) = match self.period_type {
            PeriodType::Yearly => {
                let start = ymd(self.year, 1, 1)?;
                (start, ymd(self.year + 1, 1, 1)?)
            }
            PeriodType::Monthly => {
                let month = self
                    .month
                    .ok_or_else(|| format!("monthly period {} is missing a month", self.year))?;
                let start = ymd(self.year, month, 1)?;
                let next = if month == 12 {
                    ymd(self.year + 1, 1, 1)?
                } else {
                    ymd(self.year, month + 1, 1)?
                };
                (start, next)
            }
            PeriodType::Weekly => {
                let week = self
                    .week
                    .ok_or_else(|| format!("weekly period {} is missing a week", self.year))?;
                let start = NaiveDate::from_isoywd_opt(self.year, week, Weekday::Mon)
                    .ok_or_else(|| format!("invalid ISO week {}-W{}", self.year, week))?;
                (start, start + Duration::days(7))
            }
            PeriodType::Daily => {
                let month = self
                    .month
                    .ok_or_else(|| format!("daily period {} is missing a month", self.year))?;
                let day = self
                    .day
                    .ok_or_else(|| format!("daily period {} is missing a day", self.year))?;
                let start = ymd(self.year, month, day)?;
                (start, start + Duration::days(1))
            }
        };

        let from = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN));
        let to = Utc.from_utc_datetime(&next_start.and_time(NaiveTime::MIN))
            - Duration::milliseconds(1);
        Ok((from, to))
    }

    /// Stable key component for the summary upsert.
    pub fn storage_key(&self) -> String {
        match self.period_type {
            PeriodType::Yearly => format!("{}", self.year),
            PeriodType::Monthly => format!("{}-M{:02}", self.year, self.month.unwrap_or(0)),
            PeriodType::Weekly => format!("{}-W{:02}", self.year, self.week.unwrap_or(0)),
            PeriodType::Daily => format!(
                "{}-{:02}-{:02}",
                self.year,
                self.month.unwrap_or(0),
                self.day.unwrap_or(0)
            ),
        }
    }

    /// Parse a CLI-style period string: `2026` (yearly), `2026-03` or
    /// `2026-M03` (monthly), `2026-W11` (weekly), `2026-03-14` (daily).
    pub fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let parts: Vec<&str> = s.split('-').collect();
        match parts.as_slice() {
            [year] => Ok(Self::yearly(year.parse()?)),
            [year, rest] => {
                let year: i32 = year.parse()?;
                if let Some(week) = rest.strip_prefix('W') {
                    Ok(Self::weekly(year, week.parse()?))
                } else if let Some(month) = rest.strip_prefix('M') {
                    Ok(Self::monthly(year, month.parse()?))
                } else {
                    Ok(Self::monthly(year, rest.parse()?))
                }
            }
            [year, month, day] => Ok(Self::daily(year.parse()?, month.parse()?, day.parse()?)),
            _ => Err(format!("unrecognized period descriptor: {}", s).into()),
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("invalid date {}-{:02}-{:02}", year, month, day).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_range_is_closed() {
        let period = ReportingPeriod::monthly(2026, 3);
        let (from, to) = period.date_range().unwrap();
        assert_eq!(from.to_rfc3339(), "2026-03-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-03-31T23:59:59.999+00:00");
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let period = ReportingPeriod::monthly(2026, 12);
        let (_, to) = period.date_range().unwrap();
        assert_eq!(to.to_rfc3339(), "2026-12-31T23:59:59.999+00:00");
    }

    #[test]
    fn test_weekly_range_follows_iso_weeks() {
        let period = ReportingPeriod::weekly(2026, 11);
        let (from, to) = period.date_range().unwrap();
        // ISO week 11 of 2026 starts Monday 2026-03-09
        assert_eq!(from.to_rfc3339(), "2026-03-09T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-03-15T23:59:59.999+00:00");
    }

    #[test]
    fn test_invalid_descriptors_rejected() {
        assert!(ReportingPeriod::monthly(2026, 13).date_range().is_err());
        assert!(ReportingPeriod::daily(2026, 2, 30).date_range().is_err());
        assert!(ReportingPeriod::weekly(2026, 54).date_range().is_err());
        assert!(ReportingPeriod {
            period_type: PeriodType::Monthly,
            year: 2026,
            month: None,
            week: None,
            day: None,
        }
        .date_range()
        .is_err());
    }

    #[test]
    fn test_parse_and_storage_key() {
        assert_eq!(ReportingPeriod::parse("2026").unwrap().storage_key(), "2026");
        assert_eq!(
            ReportingPeriod::parse("2026-03").unwrap().storage_key(),
            "2026-M03"
        );
        assert_eq!(
            ReportingPeriod::parse("2026-W11").unwrap().storage_key(),
            "2026-W11"
        );
        assert_eq!(
            ReportingPeriod::parse("2026-03-14").unwrap().storage_key(),
            "2026-03-14"
        );
        assert!(ReportingPeriod::parse("march-2026").is_err());
    }
}
