//! Order reports for the admin dashboard.
//!
//! Filtering lives in [`filter`]; every exporter formats its rows through
//! [`format::ReportRow`] so money, dates and labels match across PDF, XLSX
//! and CSV output.

pub mod csv;
pub mod export;
pub mod filter;
pub mod format;
pub mod pdf;
pub mod xlsx;

use thiserror::Error;

pub use export::ExportFormat;
pub use filter::ReportQuery;
pub use format::{ReportContext, ReportSummary};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("pdf rendering failed: {0}")]
    Pdf(String),
    #[error("spreadsheet rendering failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
