pub mod models;
pub mod symbol;
pub mod timeframe;
pub mod timestamp;

pub use models::{Bar, Quote};
pub use symbol::Symbol;
pub use timeframe::Timeframe;
pub use timestamp::UtcDateTime;
