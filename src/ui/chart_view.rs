use std::io::Stdout;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::{execute, terminal};
use ratatui::{
    backend::CrosstermBackend,
    prelude::*,
    widgets::{Paragraph, Wrap},
    Terminal,
};

use crate::error::Result;
use crate::fetch::Upstream;
use crate::models::{Quote, Series, TimeRange};
use crate::services::MarketData;

use super::chart::render_series;
use super::styles::selection_style;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Alternate-screen session; dropping it always hands the terminal back.
struct Screen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl Screen {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, terminal::EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    fn leave(&mut self) -> Result<()> {
        if self.active {
            self.active = false;
            self.terminal.show_cursor()?;
            execute!(self.terminal.backend_mut(), terminal::LeaveAlternateScreen)?;
            terminal::disable_raw_mode()?;
        }
        Ok(())
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    None,
    Reload,
    Refresh,
    Quit,
}

/// State of the full-screen chart for one symbol.
pub struct ChartView {
    symbol: String,
    range: TimeRange,
    series: Series,
    quote: Option<Quote>,
    remaining: u32,
    limit: u32,
}

impl ChartView {
    pub fn new(symbol: impl Into<String>, range: TimeRange) -> Self {
        Self {
            symbol: symbol.into(),
            range,
            series: Series::new(),
            quote: None,
            remaining: 0,
            limit: 0,
        }
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => ViewAction::Quit,
            KeyCode::Right | KeyCode::Char('l') => {
                self.range = self.range.next();
                ViewAction::Reload
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.range = self.range.prev();
                ViewAction::Reload
            }
            KeyCode::Char('r') => ViewAction::Refresh,
            _ => ViewAction::None,
        }
    }

    pub async fn reload<U: Upstream>(&mut self, market: &MarketData<U>) {
        self.series = market.fetch_history(&self.symbol, self.range).await;
        self.quote = market.fetch_quote(&self.symbol).await;
        self.remaining = market.accounting().remaining();
        self.limit = market.accounting().limit();
    }

    fn render(&self, f: &mut Frame<'_>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(f.size());

        let mut legend = Vec::new();
        for range in TimeRange::ALL {
            if range == self.range {
                legend.push(Span::styled(format!("[{}]", range.label()), selection_style()));
            } else {
                legend.push(Span::raw(range.label()));
            }
            legend.push(Span::raw("  "));
        }
        f.render_widget(Paragraph::new(Line::from(legend)), rows[0]);

        let title = format!("{} - {}", self.symbol, self.range.label());
        render_series(f, rows[1], &title, &self.series);

        let summary = match &self.quote {
            Some(quote) => format!(
                "Last {:.2}  {:+.2} ({:+.2}%)  O {:.2}  H {:.2}  L {:.2}  • API calls left this minute: {}/{}  • ←/→ range • r refresh • q quit",
                quote.price,
                quote.change,
                quote.change_percent,
                quote.open,
                quote.high,
                quote.low,
                self.remaining,
                self.limit,
            ),
            None => format!(
                "No quote available for {}  • API calls left this minute: {}/{}  • q quit",
                self.symbol, self.remaining, self.limit
            ),
        };
        f.render_widget(
            Paragraph::new(Line::from(summary).gray()).wrap(Wrap { trim: true }),
            rows[2],
        );
    }
}

/// Interactive chart for `symbol`: ←/→ cycle the time range, `r` drops the caches and refetches.
pub async fn run_chart_view<U: Upstream>(
    market: &MarketData<U>,
    symbol: &str,
    range: TimeRange,
) -> Result<()> {
    let mut view = ChartView::new(symbol, range);
    view.reload(market).await;

    let mut screen = Screen::enter()?;
    loop {
        screen.terminal.draw(|f| view.render(f))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match view.handle_key(key.code) {
            ViewAction::Quit => break,
            ViewAction::Reload => view.reload(market).await,
            ViewAction::Refresh => {
                market.clear_all();
                view.reload(market).await;
            }
            ViewAction::None => {}
        }
    }

    screen.leave()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_keys_cycle_ranges() {
        let mut view = ChartView::new("AAPL", TimeRange::OneYear);

        assert_eq!(view.handle_key(KeyCode::Right), ViewAction::Reload);
        assert_eq!(view.range(), TimeRange::AllTime);
        assert_eq!(view.handle_key(KeyCode::Char('l')), ViewAction::Reload);
        assert_eq!(view.range(), TimeRange::OneDay);
        assert_eq!(view.handle_key(KeyCode::Left), ViewAction::Reload);
        assert_eq!(view.range(), TimeRange::AllTime);
    }

    #[test]
    fn quit_and_refresh_keys() {
        let mut view = ChartView::new("AAPL", TimeRange::OneDay);

        assert_eq!(view.handle_key(KeyCode::Char('r')), ViewAction::Refresh);
        assert_eq!(view.handle_key(KeyCode::Esc), ViewAction::Quit);
        assert_eq!(view.handle_key(KeyCode::Char('x')), ViewAction::None);
        assert_eq!(view.range(), TimeRange::OneDay);
    }
}
