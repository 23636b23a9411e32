pub mod export;

pub use export::{save_csv, write_csv, Column, TickerRow, MISSING_VALUE};
