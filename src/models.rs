use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Point-in-time price snapshot for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub previous_close: f64,
    pub volume: Option<f64>,
    pub timestamp: Option<DateTime<Local>>,
    pub week_change_percent: Option<f64>,
    pub month_change_percent: Option<f64>,
}

impl Quote {
    /// Return a copy carrying the derived week/month figures.
    pub fn with_changes(&self, changes: &PriceChanges) -> Quote {
        Quote {
            week_change_percent: changes.week.map(|change| change.percent),
            month_change_percent: changes.month.map(|change| change.percent),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Local>,
    pub price: f64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
}

impl HistoryPoint {
    pub fn new(timestamp: DateTime<Local>, price: f64) -> Self {
        Self {
            timestamp,
            price,
            open: None,
            high: None,
            low: None,
            volume: None,
        }
    }
}

/// Chronologically ascending price points for one symbol and one window.
pub type Series = Vec<HistoryPoint>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub symbol: String,
    pub display_symbol: String,
    pub description: String,
    pub kind: String,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodChange {
    pub reference_price: f64,
    pub percent: f64,
}

/// Week and month movement figures; both absent when the anchor quote is unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceChanges {
    pub week: Option<PeriodChange>,
    pub month: Option<PeriodChange>,
}

impl PriceChanges {
    pub fn is_empty(&self) -> bool {
        self.week.is_none() && self.month.is_none()
    }
}

// Calendar months are shifted in UTC: a local wall time can fall into a DST gap, UTC never does.
fn add_months(at: DateTime<Local>, months: u32) -> Option<DateTime<Local>> {
    at.with_timezone(&Utc)
        .checked_add_months(Months::new(months))
        .map(|shifted| shifted.with_timezone(&Local))
}

fn sub_months(at: DateTime<Local>, months: u32) -> Option<DateTime<Local>> {
    at.with_timezone(&Utc)
        .checked_sub_months(Months::new(months))
        .map(|shifted| shifted.with_timezone(&Local))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    pub fn step(self, from: DateTime<Local>) -> Option<DateTime<Local>> {
        match self {
            Cadence::Hourly => from.checked_add_signed(Duration::hours(1)),
            Cadence::Daily => from.checked_add_signed(Duration::days(1)),
            Cadence::Weekly => from.checked_add_signed(Duration::weeks(1)),
            Cadence::Monthly => add_months(from, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeRange {
    OneDay,
    OneWeek,
    #[default]
    OneMonth,
    ThreeMonths,
    OneYear,
    AllTime,
}

impl TimeRange {
    pub const ALL: [TimeRange; 6] = [
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::OneYear,
        TimeRange::AllTime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::OneDay => "1D",
            TimeRange::OneWeek => "1W",
            TimeRange::OneMonth => "1M",
            TimeRange::ThreeMonths => "3M",
            TimeRange::OneYear => "1Y",
            TimeRange::AllTime => "All Time",
        }
    }

    pub fn cadence(self) -> Cadence {
        match self {
            TimeRange::OneDay => Cadence::Hourly,
            TimeRange::OneYear => Cadence::Weekly,
            TimeRange::AllTime => Cadence::Monthly,
            _ => Cadence::Daily,
        }
    }

    /// Start of the lookback window ending at `now`.
    pub fn window_start(self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        match self {
            TimeRange::OneDay => now.checked_sub_signed(Duration::days(1)),
            TimeRange::OneWeek => now.checked_sub_signed(Duration::days(7)),
            TimeRange::OneMonth => sub_months(now, 1),
            TimeRange::ThreeMonths => sub_months(now, 3),
            TimeRange::OneYear => sub_months(now, 12),
            TimeRange::AllTime => sub_months(now, 60),
        }
    }

    pub fn next(self) -> TimeRange {
        let idx = Self::ALL.iter().position(|range| *range == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> TimeRange {
        let idx = Self::ALL.iter().position(|range| *range == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "1D" => Ok(TimeRange::OneDay),
            "1W" => Ok(TimeRange::OneWeek),
            "1M" => Ok(TimeRange::OneMonth),
            "3M" => Ok(TimeRange::ThreeMonths),
            "1Y" => Ok(TimeRange::OneYear),
            "ALLTIME" | "ALL" | "MAX" => Ok(TimeRange::AllTime),
            _ => Err(AppError::message(format!(
                "unknown time range `{value}` (expected one of 1D, 1W, 1M, 3M, 1Y, All Time)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_round_trip() {
        for range in TimeRange::ALL {
            assert_eq!(range.label().parse::<TimeRange>().unwrap(), range);
        }
        assert_eq!("all time".parse::<TimeRange>().unwrap(), TimeRange::AllTime);
        assert!("2Y".parse::<TimeRange>().is_err());
    }

    #[test]
    fn cadence_follows_range() {
        assert_eq!(TimeRange::OneDay.cadence(), Cadence::Hourly);
        assert_eq!(TimeRange::ThreeMonths.cadence(), Cadence::Daily);
        assert_eq!(TimeRange::OneYear.cadence(), Cadence::Weekly);
        assert_eq!(TimeRange::AllTime.cadence(), Cadence::Monthly);
    }

    #[test]
    fn defaults_to_one_month() {
        assert_eq!(TimeRange::default(), TimeRange::OneMonth);
    }

    #[test]
    fn cycles_through_ranges() {
        assert_eq!(TimeRange::AllTime.next(), TimeRange::OneDay);
        assert_eq!(TimeRange::OneDay.prev(), TimeRange::AllTime);
        assert_eq!(TimeRange::OneWeek.next(), TimeRange::OneMonth);
    }

    #[test]
    fn attaches_derived_changes_without_mutating() {
        let quote = Quote {
            symbol: "AAPL".to_string(),
            price: 100.0,
            change: 1.0,
            change_percent: 1.0,
            open: 99.0,
            high: 101.0,
            low: 98.0,
            previous_close: 99.0,
            volume: None,
            timestamp: None,
            week_change_percent: None,
            month_change_percent: None,
        };
        let changes = PriceChanges {
            week: Some(PeriodChange {
                reference_price: 98.0,
                percent: 2.04,
            }),
            month: None,
        };

        let enriched = quote.with_changes(&changes);
        assert_eq!(enriched.week_change_percent, Some(2.04));
        assert_eq!(enriched.month_change_percent, None);
        assert_eq!(quote.week_change_percent, None);
    }
}
