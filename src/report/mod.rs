mod report;

pub use report::{DEFAULT_INDENT, DEFAULT_TITLE, Report, ReportStyle};
