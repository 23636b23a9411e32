use chrono::{DateTime, Local};

use crate::models::{HistoryPoint, PeriodChange, PriceChanges, Series, TimeRange};
use crate::utils::RandomSource;

/// The synthetic path starts this far below the live price.
pub const START_RATIO: f64 = 0.95;
/// Largest single-step move, as a share of the live price.
pub const STEP_RATIO: f64 = 0.02;
/// Steps are `(r - DRIFT_CENTER) * STEP_RATIO * price`; below 0.5 gives a slight upward drift.
pub const DRIFT_CENTER: f64 = 0.48;

const PRICE_FLOOR_RATIO: f64 = 0.01;

pub const WEEK_CHANGE_BOUNDS: (f64, f64) = (-0.02, 0.04);
pub const MONTH_CHANGE_BOUNDS: (f64, f64) = (-0.04, 0.08);

/// Sample instants for `range`: from the window start, stepping by the range cadence, strictly
/// before `now`.
pub fn sample_times(range: TimeRange, now: DateTime<Local>) -> Vec<DateTime<Local>> {
    let cadence = range.cadence();
    let mut times = Vec::new();
    let Some(mut cursor) = range.window_start(now) else {
        return times;
    };

    while cursor < now {
        times.push(cursor);
        match cadence.step(cursor) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    times
}

/// Illustrative price path for `range` that ends exactly on `anchor`.
///
/// The output is not historical data. Its only guarantees are strictly increasing timestamps
/// and a last point (stamped `now`) priced at `anchor`.
pub fn synthesize_series(
    anchor: f64,
    range: TimeRange,
    now: DateTime<Local>,
    random: &dyn RandomSource,
) -> Series {
    let times = sample_times(range, now);
    let floor = anchor.abs() * PRICE_FLOOR_RATIO;
    let mut series = Series::with_capacity(times.len() + 1);
    let mut price = anchor * START_RATIO;

    for (idx, timestamp) in times.into_iter().enumerate() {
        let open = price;
        if idx > 0 {
            price = (price + (random.next_unit() - DRIFT_CENTER) * anchor * STEP_RATIO).max(floor);
        }
        series.push(HistoryPoint {
            timestamp,
            price,
            open: Some(open),
            high: Some(open.max(price)),
            low: Some(open.min(price)),
            volume: None,
        });
    }

    if let Some(last) = series.last_mut() {
        let open = last.open.unwrap_or(anchor);
        last.price = anchor;
        last.high = Some(open.max(anchor));
        last.low = Some(open.min(anchor));
    }

    let mut closing = HistoryPoint::new(now, anchor);
    closing.open = Some(anchor);
    closing.high = Some(anchor);
    closing.low = Some(anchor);
    series.push(closing);
    series
}

/// Illustrative week/month movement figures relative to `price`.
pub fn synthesize_changes(price: f64, random: &dyn RandomSource) -> PriceChanges {
    let period = |(low, high): (f64, f64)| {
        let ratio = random.uniform(low, high);
        PeriodChange {
            reference_price: price / (1.0 + ratio),
            percent: ratio * 100.0,
        }
    };

    PriceChanges {
        week: Some(period(WEEK_CHANGE_BOUNDS)),
        month: Some(period(MONTH_CHANGE_BOUNDS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SeededRandom;
    use chrono::{Duration, TimeZone};
    use std::sync::Once;

    // Every test here runs in a zone with a spring-forward gap (2024-03-10 02:00-03:00).
    fn pin_dst_zone() {
        static PIN: Once = Once::new();
        PIN.call_once(|| std::env::set_var("TZ", "America/New_York"));
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        pin_dst_zone();
        Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn fixed_now() -> DateTime<Local> {
        local(2024, 6, 14, 15, 30)
    }

    fn assert_strictly_ascending(series: &Series) {
        for pair in series.windows(2) {
            assert!(
                pair[0].timestamp < pair[1].timestamp,
                "timestamps out of order: {} then {}",
                pair[0].timestamp,
                pair[1].timestamp
            );
        }
    }

    #[test]
    fn every_range_ends_on_anchor() {
        let random = SeededRandom::new(1);
        for range in TimeRange::ALL {
            let series = synthesize_series(250.0, range, fixed_now(), &random);
            assert!(series.len() >= 2, "{range} produced {} points", series.len());
            assert_strictly_ascending(&series);

            let last = series.last().unwrap();
            assert_eq!(last.price, 250.0);
            assert_eq!(last.timestamp, fixed_now());
            assert_eq!(series[series.len() - 2].price, 250.0);
        }
    }

    #[test]
    fn one_day_is_hourly() {
        let series = synthesize_series(10.0, TimeRange::OneDay, fixed_now(), &SeededRandom::new(2));
        assert_eq!(series.len(), 25);
        assert_eq!(series[1].timestamp - series[0].timestamp, Duration::hours(1));
        assert_eq!(series[0].timestamp, fixed_now() - Duration::days(1));
    }

    #[test]
    fn one_year_is_roughly_weekly() {
        let series = synthesize_series(180.0, TimeRange::OneYear, fixed_now(), &SeededRandom::new(3));
        let expected = 365.0 / 7.0;
        assert!(
            (series.len() as f64 - expected).abs() <= 2.0,
            "unexpected point count {}",
            series.len()
        );
        assert_eq!(series[1].timestamp - series[0].timestamp, Duration::weeks(1));
    }

    #[test]
    fn all_time_is_monthly_over_five_years() {
        let times = sample_times(TimeRange::AllTime, fixed_now());
        assert_eq!(times.len(), 60);
        assert_eq!(times[0], local(2019, 6, 14, 15, 30));
    }

    #[test]
    fn month_windows_survive_a_dst_gap() {
        // One month before falls on 2024-03-10 02:30, which does not exist locally.
        let now = local(2024, 4, 10, 2, 30);

        let series = synthesize_series(100.0, TimeRange::OneMonth, now, &SeededRandom::new(6));
        assert_eq!(series.len(), 32);
        assert_eq!(series[0].timestamp, now - Duration::days(31));
        assert_strictly_ascending(&series);

        let later = local(2024, 6, 10, 2, 30);
        assert_eq!(sample_times(TimeRange::ThreeMonths, later).len(), 92);
        assert_eq!(sample_times(TimeRange::OneYear, local(2025, 3, 10, 2, 30)).len(), 53);
        assert_eq!(sample_times(TimeRange::AllTime, now).len(), 60);
    }

    #[test]
    fn starts_below_anchor_and_moves_in_bounded_steps() {
        let anchor = 100.0;
        let series = synthesize_series(anchor, TimeRange::ThreeMonths, fixed_now(), &SeededRandom::new(4));
        assert!((series[0].price - anchor * START_RATIO).abs() < 1e-9);

        let max_step = anchor * STEP_RATIO * (1.0 - DRIFT_CENTER) + 1e-9;
        for pair in series[..series.len() - 2].windows(2) {
            assert!((pair[1].price - pair[0].price).abs() <= max_step);
        }
    }

    #[test]
    fn change_figures_stay_in_bounds() {
        let random = SeededRandom::new(5);
        for _ in 0..200 {
            let changes = synthesize_changes(50.0, &random);
            let week = changes.week.unwrap();
            let month = changes.month.unwrap();
            assert!((-2.0..4.0).contains(&week.percent));
            assert!((-4.0..8.0).contains(&month.percent));
            let implied = (50.0 - week.reference_price) / week.reference_price * 100.0;
            assert!((implied - week.percent).abs() < 1e-6);
        }
    }
}
