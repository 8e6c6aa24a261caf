//! RMA: product-return case tracking and spreadsheet reporting
//!
//! Keeps RMA cases in an ordered record store, derives defective-piece and
//! defect-reason statistics, and exports both into a formatted two-sheet
//! xlsx report with a doughnut chart.

pub mod cli;
pub mod core;
pub mod report;
