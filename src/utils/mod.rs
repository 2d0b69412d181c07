pub mod errors;
pub mod format;
pub mod table;

pub use errors::VizError;
pub use format::{format_currency, format_date, format_thousands};
pub use table::Table;
