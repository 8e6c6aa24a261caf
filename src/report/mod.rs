//! Spreadsheet report export and import
//!
//! The report is an xlsx workbook with two sheets:
//! - `RMA`: title banner, column headers and one row per entry
//! - `Summary`: pieces and reasons frequency tables plus a doughnut chart
//!
//! [`read`] is the inverse of [`write`] for the `RMA` sheet.

mod layout;
mod reader;
mod writer;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub use layout::{StatusKeywords, StatusStyle, PALETTE, RMA_SHEET, SUMMARY_SHEET};
pub use reader::{cell_text, read};
pub use writer::{write, ReportWriter};

/// Errors raised while writing or reading a report
#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("I/O error on {path:?}: {source}")]
    #[diagnostic(
        code(rma::report::io),
        help("check that the path exists and that you have permission to access it")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("workbook {path:?} has no '{sheet}' sheet")]
    #[diagnostic(
        code(rma::report::missing_sheet),
        help("only workbooks exported by `rma export` (or with the same layout) can be imported")
    )]
    MissingSheet { path: PathBuf, sheet: &'static str },

    #[error("cannot read workbook {path:?}: {message}")]
    #[diagnostic(code(rma::report::unreadable))]
    Unreadable { path: PathBuf, message: String },

    #[error("failed to build workbook: {0}")]
    #[diagnostic(code(rma::report::xlsx))]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl ReportError {
    /// True for the "source is not a readable report" class of errors
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ReportError::MissingSheet { .. } | ReportError::Unreadable { .. }
        )
    }
}
