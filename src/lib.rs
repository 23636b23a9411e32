pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod records;
pub mod services;
pub mod storage;
pub mod ui;
pub mod utils;

pub use error::{AppError, Result};
pub use models::{HistoryPoint, PriceChanges, Quote, SearchResult, Series, TimeRange};
pub use services::{MarketData, RequestAccounting};
pub use storage::KeyStore;
