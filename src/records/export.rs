use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use crate::error::{AppError, Context, Result};
use crate::models::Quote;

pub const MISSING_VALUE: &str = "N/A";

/// Selectable table/export columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Symbol,
    Price,
    Change,
    ChangePercent,
    Open,
    High,
    Low,
    PreviousClose,
    Volume,
    WeekChangePercent,
    MonthChangePercent,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::Symbol,
        Column::Price,
        Column::Change,
        Column::ChangePercent,
        Column::Open,
        Column::High,
        Column::Low,
        Column::PreviousClose,
        Column::Volume,
        Column::WeekChangePercent,
        Column::MonthChangePercent,
    ];

    pub const DEFAULT: [Column; 4] = [
        Column::Symbol,
        Column::Price,
        Column::Change,
        Column::ChangePercent,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Column::Symbol => "symbol",
            Column::Price => "price",
            Column::Change => "change",
            Column::ChangePercent => "change_percent",
            Column::Open => "open",
            Column::High => "high",
            Column::Low => "low",
            Column::PreviousClose => "prev_close",
            Column::Volume => "volume",
            Column::WeekChangePercent => "week_change",
            Column::MonthChangePercent => "month_change",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Column::Symbol => "Symbol",
            Column::Price => "Price",
            Column::Change => "Change",
            Column::ChangePercent => "Change %",
            Column::Open => "Open",
            Column::High => "High",
            Column::Low => "Low",
            Column::PreviousClose => "Prev Close",
            Column::Volume => "Volume",
            Column::WeekChangePercent => "1W %",
            Column::MonthChangePercent => "1M %",
        }
    }

    pub fn is_percent(self) -> bool {
        matches!(
            self,
            Column::ChangePercent | Column::WeekChangePercent | Column::MonthChangePercent
        )
    }

    /// Whether the column needs the synthetic week/month figures.
    pub fn needs_changes(self) -> bool {
        matches!(self, Column::WeekChangePercent | Column::MonthChangePercent)
    }

    fn numeric(self, quote: &Quote) -> Option<f64> {
        match self {
            Column::Symbol => None,
            Column::Price => Some(quote.price),
            Column::Change => Some(quote.change),
            Column::ChangePercent => Some(quote.change_percent),
            Column::Open => Some(quote.open),
            Column::High => Some(quote.high),
            Column::Low => Some(quote.low),
            Column::PreviousClose => Some(quote.previous_close),
            Column::Volume => quote.volume,
            Column::WeekChangePercent => quote.week_change_percent,
            Column::MonthChangePercent => quote.month_change_percent,
        }
    }

    /// Cell text for one ticker: two decimals, `%` on percentages, `N/A` when absent.
    pub fn format(self, symbol: &str, quote: Option<&Quote>) -> String {
        if self == Column::Symbol {
            return symbol.to_string();
        }
        match quote.and_then(|quote| self.numeric(quote)) {
            Some(value) if value.is_finite() => {
                // Anything that rounds to zero prints as 0.00, never -0.00.
                let value = if (value * 100.0).round() == 0.0 { 0.0 } else { value };
                if self.is_percent() {
                    format!("{:.2}%", value)
                } else {
                    format!("{:.2}", value)
                }
            }
            _ => MISSING_VALUE.to_string(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Column {
    type Err = AppError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = value.trim().to_lowercase().replace(['-', ' '], "_");
        Column::ALL
            .into_iter()
            .find(|column| column.key() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Column::ALL.iter().map(|c| c.key()).collect();
                AppError::message(format!(
                    "unknown column `{}` (expected one of {})",
                    value,
                    known.join(", ")
                ))
            })
    }
}

/// One table row: the requested symbol and whatever quote could be fetched for it.
#[derive(Debug, Clone)]
pub struct TickerRow {
    pub symbol: String,
    pub quote: Option<Quote>,
}

pub fn write_csv<W: Write>(writer: W, columns: &[Column], rows: &[TickerRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(columns.iter().map(|column| column.label()))?;
    for row in rows {
        writer.write_record(
            columns
                .iter()
                .map(|column| column.format(&row.symbol, row.quote.as_ref())),
        )?;
    }

    writer.flush()?;
    Ok(())
}

pub fn save_csv<P: AsRef<Path>>(path: P, columns: &[Column], rows: &[TickerRow]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create export directory {:?}", parent))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file {:?}", path))?;
    write_csv(file, columns, rows)
}
