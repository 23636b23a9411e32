use unicode_width::UnicodeWidthStr;

use crate::models::Series;
use crate::records::{Column, TickerRow};
use crate::utils::pad_display;

use super::chart::sparkline;

pub const SPARKLINE_WIDTH: usize = 20;
const TREND_HEADER: &str = "Trend";

/// Plain-text table of the selected columns, optionally with a sparkline column.
pub fn render_table(columns: &[Column], rows: &[TickerRow], trends: Option<&[Series]>) -> String {
    let mut grid: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
    grid.push(columns.iter().map(|column| column.label().to_string()).collect());
    for row in rows {
        grid.push(
            columns
                .iter()
                .map(|column| column.format(&row.symbol, row.quote.as_ref()))
                .collect(),
        );
    }

    let widths: Vec<usize> = (0..columns.len())
        .map(|col| {
            grid.iter()
                .map(|cells| UnicodeWidthStr::width(cells[col].as_str()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (idx, cells) in grid.iter().enumerate() {
        let mut line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad_display(cell, *width))
            .collect();

        if let Some(trends) = trends {
            let cell = if idx == 0 {
                TREND_HEADER.to_string()
            } else {
                trends
                    .get(idx - 1)
                    .map(|series| sparkline(series, SPARKLINE_WIDTH))
                    .unwrap_or_default()
            };
            line.push(cell);
        }

        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoryPoint, Quote};
    use chrono::{Duration, Local};

    fn row(symbol: &str, price: Option<f64>) -> TickerRow {
        TickerRow {
            symbol: symbol.to_string(),
            quote: price.map(|price| Quote {
                symbol: symbol.to_string(),
                price,
                change: 0.5,
                change_percent: 0.25,
                open: price,
                high: price,
                low: price,
                previous_close: price - 0.5,
                volume: None,
                timestamp: None,
                week_change_percent: None,
                month_change_percent: None,
            }),
        }
    }

    #[test]
    fn aligns_columns() {
        let rows = vec![row("AAPL", Some(189.5)), row("BINANCE:BTCUSDT", None)];
        let table = render_table(&[Column::Symbol, Column::Price], &rows, None);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Symbol           Price");
        assert_eq!(lines[1], "AAPL             189.50");
        assert_eq!(lines[2], "BINANCE:BTCUSDT  N/A");
    }

    #[test]
    fn appends_trend_column() {
        let now = Local::now();
        let series = vec![
            HistoryPoint::new(now - Duration::hours(1), 1.0),
            HistoryPoint::new(now, 2.0),
        ];
        let rows = vec![row("AAPL", Some(2.0)), row("NOPE", None)];
        let trends = vec![series, Series::new()];

        let table = render_table(&[Column::Symbol], &rows, Some(&trends));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Symbol  Trend");
        assert_eq!(lines[1], "AAPL    ▁█");
        assert_eq!(lines[2], "NOPE");
    }
}
