pub mod alarm;
pub mod json;
pub mod value;

pub use alarm::AlarmEvaluator;
pub use json::JsonFormatter;
pub use value::{FormatError, ValueFormatter};
