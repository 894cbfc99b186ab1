//! Report module - score aggregation, report assembly and export

pub mod assembler;
pub mod display;
pub mod export;
pub mod summary;

pub use assembler::Report;
pub use display::{display_report, report_table};
pub use export::{report_to_dataframe, write_report, ReportMetadata};
pub use summary::{report_column_name, summarize, SummaryRow, NAME_COLUMN};
