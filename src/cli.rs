use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::TimeRange;
use crate::records::Column;

#[derive(Parser, Debug)]
#[command(name = "ticker-board")]
#[command(about = "Quotes, symbol search, trend charts and CSV export for stock and crypto tickers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional JSON configuration file
    #[arg(short, long, global = true, default_value = "ticker-board.json")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a quote table for one or more symbols
    Quote {
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Comma-separated column keys (e.g. price,change_percent,week_change)
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<Column>>,

        /// Append a trend sparkline for the given range (1D, 1W, 1M, 3M, 1Y, "All Time")
        #[arg(long)]
        sparkline: Option<TimeRange>,
    },

    /// Search for symbols
    Search { query: String },

    /// Print the trend series for a symbol
    History {
        symbol: String,

        #[arg(short, long, default_value = "1M")]
        range: TimeRange,
    },

    /// Open a full-screen chart for a symbol
    Chart {
        symbol: String,

        #[arg(short, long, default_value = "1M")]
        range: TimeRange,
    },

    /// Write a CSV file with the selected columns
    Export {
        #[arg(required = true)]
        symbols: Vec<String>,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<Column>>,
    },

    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Show which key is active
    Show,
    /// Store a personal API key
    Set { value: String },
    /// Remove the stored key and fall back to the shared demo key
    Clear,
}
