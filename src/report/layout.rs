//! Fixed layout and formats of the exported workbook

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder};

use crate::core::entry::Field;

pub const RMA_SHEET: &str = "RMA";
pub const SUMMARY_SHEET: &str = "Summary";

/// Row holding the title banner on the RMA sheet
pub const TITLE_ROW: u32 = 0;
/// Row holding the column headers on the RMA sheet
pub const HEADER_ROW: u32 = 1;
/// First entry row on the RMA sheet
pub const DATA_ROW: u32 = 2;

/// First row of the pieces table on the Summary sheet
pub const PIECES_ROW: u32 = 0;
/// Gap between the pieces TOTAL row and the reasons header
pub const REASONS_GAP: u32 = 3;

pub const PIECES_HEADER: &str = "PEÇAS DEFEITUOSAS";
pub const REASONS_HEADER: &str = "MOTIVOS DEFEITUOSOS";
pub const QUANTITY_HEADER: &str = "QUANTIDADE";
pub const TOTAL_LABEL: &str = "TOTAL";

/// Longest text Excel accepts in one cell, in characters
pub const MAX_CELL_CHARS: usize = 32_767;

/// Fill colours for chart slices and reason rows, applied cyclically
pub const PALETTE: [u32; 10] = [
    0xFFD966, 0xF4B183, 0xC6E0B4, 0x9DC3E6, 0xD9D2E9, 0xF8CBAD, 0xA9D18E, 0x8FAADC, 0xE2EFDA,
    0xC9C9C9,
];

pub fn palette_color(position: usize) -> Color {
    Color::RGB(PALETTE[position % PALETTE.len()])
}

/// Column width on the RMA sheet
pub fn column_width(field: Field) -> f64 {
    match field {
        Field::ReceivedDate => 13.0,
        Field::Client => 22.0,
        Field::InvoiceNumber => 10.0,
        Field::ServiceOrder => 10.0,
        Field::Triage => 13.0,
        Field::ShippedProduct => 26.0,
        Field::Unit => 8.0,
        Field::Platform => 16.0,
        Field::Code => 12.0,
        Field::SerialNumber => 18.0,
        Field::Status => 12.0,
        Field::ConfigurationOrDefect => 34.0,
        Field::MarketplaceOrder => 20.0,
        Field::TechnicalReport => 44.0,
    }
}

/// Styling chosen for a status cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusStyle {
    Repair,
    Refund,
    Neutral,
}

/// Substrings that select the status styling.
///
/// Matching is a substring test on the lower-cased, trimmed status text; the
/// repair keyword is checked first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusKeywords {
    pub repair: String,
    pub refund: String,
}

impl Default for StatusKeywords {
    fn default() -> Self {
        Self::new("reparo", "reembolso")
    }
}

impl StatusKeywords {
    pub fn new(repair: impl Into<String>, refund: impl Into<String>) -> Self {
        Self {
            repair: repair.into().trim().to_lowercase(),
            refund: refund.into().trim().to_lowercase(),
        }
    }

    pub fn classify(&self, status: &str) -> StatusStyle {
        let status = status.trim().to_lowercase();
        if !self.repair.is_empty() && status.contains(&self.repair) {
            StatusStyle::Repair
        } else if !self.refund.is_empty() && status.contains(&self.refund) {
            StatusStyle::Refund
        } else {
            StatusStyle::Neutral
        }
    }
}

/// Every format used by the workbook
pub struct Formats {
    pub title: Format,
    pub header: Format,
    pub header_accent: Format,
    pub cell: Format,
    pub cell_wrap: Format,
    pub status_repair: Format,
    pub status_refund: Format,
    pub table_header: Format,
    pub table_header_qty: Format,
    pub table_cell: Format,
    pub table_cell_center: Format,
    pub total_label: Format,
    pub total_qty: Format,
}

impl Formats {
    pub fn new() -> Self {
        let banner = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);
        let body = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Top);

        Self {
            title: banner
                .clone()
                .set_font_size(14)
                .set_background_color(Color::RGB(0xD9D9D9)),
            header: banner
                .clone()
                .set_background_color(Color::RGB(0x4472C4))
                .set_font_color(Color::RGB(0xFFFFFF)),
            header_accent: banner
                .clone()
                .set_background_color(Color::RGB(0x4472C4))
                .set_font_color(Color::RGB(0xFF0000)),
            cell: body.clone(),
            cell_wrap: body.clone().set_text_wrap(),
            status_repair: body
                .clone()
                .set_background_color(Color::RGB(0xC6EFCE))
                .set_font_color(Color::RGB(0x006100)),
            status_refund: body
                .set_background_color(Color::RGB(0xFFC7CE))
                .set_font_color(Color::RGB(0x9C0006)),
            table_header: banner.clone().set_background_color(Color::RGB(0x9DC3E6)),
            table_header_qty: banner
                .clone()
                .set_background_color(Color::RGB(0x9DC3E6))
                .set_font_color(Color::RGB(0xFF0000)),
            table_cell: Format::new()
                .set_border(FormatBorder::Thin)
                .set_background_color(Color::RGB(0xD9D9D9)),
            table_cell_center: Format::new()
                .set_border(FormatBorder::Thin)
                .set_background_color(Color::RGB(0xD9D9D9))
                .set_align(FormatAlign::Center),
            total_label: banner
                .clone()
                .set_background_color(Color::RGB(0x000000))
                .set_font_color(Color::RGB(0xFFFFFF)),
            total_qty: banner
                .set_background_color(Color::RGB(0x000000))
                .set_font_color(Color::RGB(0xFF0000)),
        }
    }

    /// Format for a data cell in the given column
    pub fn for_cell(&self, field: Field, value: &str, keywords: &StatusKeywords) -> &Format {
        if field == Field::Status {
            return match keywords.classify(value) {
                StatusStyle::Repair => &self.status_repair,
                StatusStyle::Refund => &self.status_refund,
                StatusStyle::Neutral => &self.cell,
            };
        }
        if field.wraps() {
            &self.cell_wrap
        } else {
            &self.cell
        }
    }

    /// Pair of formats (label, quantity) for a reason row
    pub fn reason_row(position: usize) -> (Format, Format) {
        let label = Format::new()
            .set_border(FormatBorder::Thin)
            .set_background_color(palette_color(position));
        let qty = label.clone().set_align(FormatAlign::Center);
        (label, qty)
    }

    pub fn header_for(&self, field: Field) -> &Format {
        if field == Field::TechnicalReport {
            &self.header_accent
        } else {
            &self.header
        }
    }
}
