pub mod random;
pub mod text;
pub mod time;

pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use text::{normalize_symbol, pad_display};
pub use time::{Clock, ManualClock, SystemClock};
