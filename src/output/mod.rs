//! Report building and formatting

pub mod formatter;
pub mod report;
pub mod summary;

pub use formatter::{OutputFormatter, ReportGenerator};
pub use report::BatchReport;
pub use summary::BatchSummary;
