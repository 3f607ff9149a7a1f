//! Price data model and record conversion

pub mod bar;
pub mod records;

pub use bar::{PriceBar, normalize_bars};
pub use records::{REQUIRED_COLUMNS, bars_from_records};
