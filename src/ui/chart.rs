use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Paragraph,
    },
};

use crate::models::HistoryPoint;

use super::styles::{trend_color, AXIS};

const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const FLAT_EPSILON: f64 = 1e-9;
const LABEL_MARGIN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Lowest and highest price, widened around the value when the series is flat.
pub fn price_bounds(series: &[HistoryPoint]) -> Option<(f64, f64)> {
    let mut points = series.iter().map(|point| point.price).filter(|p| p.is_finite());
    let first = points.next()?;
    let (min, max) = points.fold((first, first), |(lo, hi), price| (lo.min(price), hi.max(price)));

    if max - min < FLAT_EPSILON {
        let pad = (min.abs() * 0.01).max(0.01);
        Some((min - pad, max + pad))
    } else {
        Some((min, max))
    }
}

/// Map each point to pixel coordinates in a `width` x `height` box, origin top-left.
pub fn project(series: &[HistoryPoint], width: f64, height: f64) -> Vec<(f64, f64)> {
    let Some((min, max)) = price_bounds(series) else {
        return Vec::new();
    };
    let span = max - min;
    let last_index = series.len().saturating_sub(1);

    series
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            let x = if last_index == 0 {
                width / 2.0
            } else {
                idx as f64 / last_index as f64 * width
            };
            let y = (max - point.price) / span * height;
            (x, y)
        })
        .collect()
}

pub fn trend(series: &[HistoryPoint]) -> Trend {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) if last.price > first.price + FLAT_EPSILON => Trend::Up,
        (Some(first), Some(last)) if last.price < first.price - FLAT_EPSILON => Trend::Down,
        _ => Trend::Flat,
    }
}

/// One-line block chart, at most `width` characters wide.
pub fn sparkline(series: &[HistoryPoint], width: usize) -> String {
    let Some((min, max)) = price_bounds(series) else {
        return String::new();
    };
    if width == 0 {
        return String::new();
    }

    let samples = width.min(series.len());
    let last_index = series.len() - 1;
    let top = (SPARK_BARS.len() - 1) as f64;

    (0..samples)
        .map(|i| {
            let idx = if samples == 1 {
                last_index
            } else {
                (i * last_index + (samples - 1) / 2) / (samples - 1)
            };
            let level = ((series[idx].price - min) / (max - min) * top).round();
            SPARK_BARS[level.clamp(0.0, top) as usize]
        })
        .collect()
}

/// Draw `series` as a line chart with min/max price and first/last date labels.
pub fn render_series(f: &mut Frame<'_>, area: Rect, title: &str, series: &[HistoryPoint]) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());

    let (Some((min, max)), Some(first), Some(last)) =
        (price_bounds(series), series.first(), series.last())
    else {
        f.render_widget(
            Paragraph::new("No data for this symbol.")
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    };

    let inner = block.inner(area);
    let width = f64::from(inner.width.max(1));
    let height = f64::from(inner.height.max(1));
    let plot_width = (width - LABEL_MARGIN).max(1.0);
    let plot_height = (height - 1.0).max(1.0);

    let color = trend_color(trend(series));
    let points: Vec<(f64, f64)> = project(series, plot_width, plot_height)
        .into_iter()
        .map(|(x, y)| (LABEL_MARGIN + x, height - y))
        .collect();

    let max_label = format!("{:.2}", max);
    let min_label = format!("{:.2}", min);
    let start_label = first.timestamp.format("%Y-%m-%d").to_string();
    let end_label = last.timestamp.format("%Y-%m-%d %H:%M").to_string();
    let end_x = (width - end_label.len() as f64).max(LABEL_MARGIN);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(move |ctx| {
            for pair in points.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].0,
                    y1: pair[0].1,
                    x2: pair[1].0,
                    y2: pair[1].1,
                    color,
                });
            }

            ctx.layer();
            ctx.draw(&CanvasLine {
                x1: LABEL_MARGIN,
                y1: 1.0,
                x2: width,
                y2: 1.0,
                color: AXIS,
            });
            ctx.print(0.0, height, max_label.clone());
            ctx.print(0.0, 1.0, min_label.clone());
            ctx.print(LABEL_MARGIN, 0.0, start_label.clone());
            ctx.print(end_x, 0.0, end_label.clone());
        });

    f.render_widget(canvas, area);
}
