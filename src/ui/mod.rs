pub mod chart;
pub mod chart_view;
pub mod styles;
pub mod table;

pub use chart::{price_bounds, project, render_series, sparkline, trend, Trend};
pub use chart_view::{run_chart_view, ChartView};
pub use table::render_table;
