pub mod models;
pub mod number_format;
pub mod report;

pub use number_format::{infer_format, NumberFormatSpec, ParseError, Separator};
pub use report::{ReportDefinition, ReportFilters};
