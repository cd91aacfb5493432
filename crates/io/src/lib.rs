//! Filesystem boundary: the only persisted state.
//!
//! Inputs are CSV and JSON files with fixed shapes; a malformed input file
//! is a data error for that file, never skipped. Outputs are pretty JSON
//! and CSV reports named `<stem>-<run timestamp>.<ext>`.

pub mod csv;
pub mod error;
pub mod json;
pub mod report;

pub use error::IoError;
pub use report::ReportWriter;
