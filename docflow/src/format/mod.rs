//! Value formatting and trigger-flag normalization.

mod formatter;
mod trigger;

pub use formatter::ValueFormatter;
pub use trigger::is_truthy;
