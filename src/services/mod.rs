pub mod accounting;
pub mod history;
pub mod market_data;

pub use accounting::{RequestAccounting, RequestCounter};
pub use history::{synthesize_changes, synthesize_series};
pub use market_data::MarketData;
