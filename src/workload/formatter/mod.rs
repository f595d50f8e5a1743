//! Output formatting for deployment metrics.

pub mod csv;
pub mod output;

pub use self::csv::{csv_header, default_csv_path, write_csv};
pub use self::output::{OutputFormat, format_reports_to_string};
