use ratatui::style::{Color, Modifier, Style};

use super::chart::Trend;

/// Accent color used for titles and the active time range.
pub const ACCENT: Color = Color::Indexed(208);
pub const AXIS: Color = Color::DarkGray;

pub fn trend_color(trend: Trend) -> Color {
    match trend {
        Trend::Up => Color::Green,
        Trend::Down => Color::Red,
        Trend::Flat => Color::Gray,
    }
}

pub fn selection_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}
