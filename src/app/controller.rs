use crate::cli::{Cli, Commands, KeyAction};
use crate::config;
use crate::error::{AppError, Result};
use crate::models::{Quote, TimeRange};
use crate::records::{save_csv, Column, TickerRow};
use crate::ui::{render_table, run_chart_view};
use crate::utils::normalize_symbol;
use crate::utils::time::format_timestamp;

use super::AppContext;

/// Execute one CLI command against a freshly built context.
pub async fn run(cli: Cli) -> Result<()> {
    let config = config::load(Some(cli.config.as_path()))?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Quote {
            symbols,
            columns,
            sparkline,
        } => show_quotes(&ctx, &symbols, columns, sparkline).await?,
        Commands::Search { query } => search(&ctx, &query).await,
        Commands::History { symbol, range } => show_history(&ctx, &symbol, range).await?,
        Commands::Chart { symbol, range } => {
            run_chart_view(&ctx.market, &normalize_symbol(&symbol), range).await?
        }
        Commands::Export {
            symbols,
            output,
            columns,
        } => {
            let columns = selected_columns(columns);
            let rows = fetch_rows(&ctx, &symbols, &columns).await;
            save_csv(&output, &columns, &rows)?;
            println!("Exported {} rows to {}", rows.len(), output.display());
        }
        Commands::Key { action } => manage_key(&ctx, action),
    }

    ctx.log_usage();
    Ok(())
}

fn selected_columns(columns: Option<Vec<Column>>) -> Vec<Column> {
    let mut columns = columns
        .filter(|columns| !columns.is_empty())
        .unwrap_or_else(|| Column::DEFAULT.to_vec());
    if !columns.contains(&Column::Symbol) {
        columns.insert(0, Column::Symbol);
    }
    let mut seen = Vec::with_capacity(columns.len());
    columns.retain(|column| {
        let first = !seen.contains(column);
        seen.push(*column);
        first
    });
    columns
}

async fn fetch_rows(ctx: &AppContext, symbols: &[String], columns: &[Column]) -> Vec<TickerRow> {
    let symbols: Vec<String> = symbols.iter().map(|s| normalize_symbol(s)).collect();
    let quotes: Vec<Option<Quote>> = if columns.iter().any(|column| column.needs_changes()) {
        ctx.market.fetch_quotes_with_changes(&symbols).await
    } else {
        ctx.market.fetch_quotes(&symbols).await
    };

    symbols
        .into_iter()
        .zip(quotes)
        .map(|(symbol, quote)| TickerRow { symbol, quote })
        .collect()
}

async fn show_quotes(
    ctx: &AppContext,
    symbols: &[String],
    columns: Option<Vec<Column>>,
    sparkline: Option<TimeRange>,
) -> Result<()> {
    let columns = selected_columns(columns);
    let rows = fetch_rows(ctx, symbols, &columns).await;

    if rows.iter().all(|row| row.quote.is_none()) {
        return Err(AppError::message(
            "Failed to fetch any quotes. Check the symbols and your API key.",
        ));
    }

    let trends = match sparkline {
        Some(range) => {
            let symbols: Vec<String> = rows.iter().map(|row| row.symbol.clone()).collect();
            Some(ctx.market.fetch_histories(&symbols, range).await)
        }
        None => None,
    };

    print!("{}", render_table(&columns, &rows, trends.as_deref()));
    Ok(())
}

async fn search(ctx: &AppContext, query: &str) {
    if let Some(warning) = ctx.market.search_warning() {
        eprintln!("warning: {}", warning);
    }

    let results = ctx.market.search(query).await;
    if results.is_empty() {
        println!("No symbols found for `{}`.", query);
        return;
    }

    for result in results {
        let currency = result.currency.as_deref().unwrap_or("");
        println!(
            "{:<20} {:<40} {:<16} {}",
            result.symbol, result.description, result.kind, currency
        );
    }
}

async fn show_history(ctx: &AppContext, symbol: &str, range: TimeRange) -> Result<()> {
    let symbol = normalize_symbol(symbol);
    let series = ctx.market.fetch_history(&symbol, range).await;
    if series.is_empty() {
        return Err(AppError::message(format!(
            "No data for {} (quote unavailable)",
            symbol
        )));
    }

    println!("{} {} (illustrative trend, not historical data)", symbol, range);
    for point in &series {
        println!("{}  {:.2}", format_timestamp(point.timestamp), point.price);
    }
    Ok(())
}

fn manage_key(ctx: &AppContext, action: KeyAction) {
    match action {
        KeyAction::Show => {}
        KeyAction::Set { value } => {
            ctx.keys.set(&value);
        }
        KeyAction::Clear => {
            ctx.keys.clear();
        }
    }

    if ctx.keys.is_default() {
        println!("Using the shared demo API key.");
    } else {
        println!("Using a personal API key ({}).", mask_key(&ctx.keys.get()));
    }
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{}", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_column_is_always_first() {
        let columns = selected_columns(Some(vec![Column::Price, Column::Volume]));
        assert_eq!(columns, vec![Column::Symbol, Column::Price, Column::Volume]);

        assert_eq!(selected_columns(None), Column::DEFAULT.to_vec());
        assert_eq!(selected_columns(Some(Vec::new())), Column::DEFAULT.to_vec());

        let repeated = selected_columns(Some(vec![Column::Price, Column::Symbol, Column::Price]));
        assert_eq!(repeated, vec![Column::Price, Column::Symbol]);
    }

    #[test]
    fn masks_all_but_last_four() {
        assert_eq!(mask_key("abcdef123456"), "****3456");
        assert_eq!(mask_key("ab"), "****ab");
    }
}
