pub mod bootstrap;
pub mod controller;

pub use bootstrap::AppContext;
pub use controller::run;
