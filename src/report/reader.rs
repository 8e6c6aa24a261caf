//! Workbook reader

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveTime};
use regex::{Captures, Regex};
use std::path::Path;

use crate::core::entry::{Field, RmaEntry};

use super::layout::{DATA_ROW, RMA_SHEET};
use super::ReportError;

lazy_static::lazy_static! {
    /// OOXML escape for characters XML cannot carry, e.g. `_x000D_`
    static ref XML_ESCAPE: Regex = Regex::new(r"_x([0-9A-Fa-f]{4})_").unwrap();
}

/// Read the entries of a report's `RMA` sheet, in row order.
///
/// Blank rows are skipped and short rows are padded with empty fields.
pub fn read(source: impl AsRef<Path>) -> Result<Vec<RmaEntry>, ReportError> {
    let path = source.as_ref();

    let mut workbook = open_workbook_auto(path).map_err(|e| match e {
        calamine::Error::Io(source) => ReportError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => ReportError::Unreadable {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })?;

    if !workbook.sheet_names().iter().any(|name| name == RMA_SHEET) {
        return Err(ReportError::MissingSheet {
            path: path.to_path_buf(),
            sheet: RMA_SHEET,
        });
    }

    let range = workbook
        .worksheet_range(RMA_SHEET)
        .map_err(|e| ReportError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let last_row = match range.end() {
        Some((row, _)) => row,
        None => return Ok(Vec::new()),
    };

    let mut entries = Vec::new();
    for row in DATA_ROW..=last_row {
        let values: Vec<String> = (0..Field::COUNT as u32)
            .map(|col| cell_text(range.get_value((row, col))))
            .collect();

        if values.iter().all(|v| v.is_empty()) {
            continue;
        }
        entries.push(RmaEntry::from_values(values));
    }

    Ok(entries)
}

/// Coerce any cell to trimmed text. Absent and empty cells become "".
pub fn cell_text(cell: Option<&Data>) -> String {
    let text = match cell {
        None | Some(Data::Empty) => return String::new(),
        Some(Data::String(s)) => decode_escapes(s),
        Some(Data::Float(n)) => {
            // Integral values print without a decimal part
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Some(Data::Int(n)) => n.to_string(),
        Some(Data::Bool(b)) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Some(Data::DateTime(dt)) => excel_date_text(dt.as_f64()),
        Some(Data::DateTimeIso(s)) => s.clone(),
        Some(Data::DurationIso(s)) => s.clone(),
        Some(Data::Error(e)) => format!("#{:?}", e),
    };
    text.trim().to_string()
}

/// Undo the `_xHHHH_` escaping applied by xlsx writers to control
/// characters and to literal `_x` sequences (written as `_x005F_x...`)
fn decode_escapes(text: &str) -> String {
    if !text.contains("_x") {
        return text.to_string();
    }
    XML_ESCAPE
        .replace_all(text, |caps: &Captures| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Render an Excel serial date (1900 system) as `dd/mm/YYYY`, with the time
/// appended when the serial has a fractional part
fn excel_date_text(serial: f64) -> String {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).map(|d| d.and_time(NaiveTime::MIN));
    let Some(epoch) = epoch else {
        return serial.to_string();
    };

    let seconds = (serial * 86_400.0).round() as i64;
    let Some(moment) = epoch.checked_add_signed(Duration::seconds(seconds)) else {
        return serial.to_string();
    };

    if serial.fract() == 0.0 {
        moment.format("%d/%m/%Y").to_string()
    } else {
        moment.format("%d/%m/%Y %H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{write, ReportWriter};
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    fn sample(product: &str, status: &str) -> RmaEntry {
        RmaEntry::default()
            .with(Field::ReceivedDate, "05/01/2024")
            .with(Field::Client, "Loja São João")
            .with(Field::ShippedProduct, product)
            .with(Field::Status, status)
            .with(Field::TechnicalReport, "Bobina queimada.\nTrocar o módulo 日本")
    }

    #[test]
    fn test_cell_text_coercion() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Data::Empty)), "");
        assert_eq!(cell_text(Some(&Data::String("  x ".to_string()))), "x");
        assert_eq!(cell_text(Some(&Data::Float(123.0))), "123");
        assert_eq!(cell_text(Some(&Data::Float(1.5))), "1.5");
        assert_eq!(cell_text(Some(&Data::Int(-4))), "-4");
        assert_eq!(cell_text(Some(&Data::Bool(true))), "TRUE");
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(decode_escapes("a_x000D_b"), "a\rb");
        assert_eq!(decode_escapes("_x005F_x0041_"), "_x0041_");
        assert_eq!(decode_escapes("plain_xyz_"), "plain_xyz_");
        assert_eq!(decode_escapes("bad_xD800_"), "bad_xD800_");
    }

    #[test]
    fn test_roundtrip_keeps_control_chars_and_literal_escapes() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("escapes.xlsx");

        let entries = vec![RmaEntry::default()
            .with(Field::Client, "a\r\nb")
            .with(Field::Status, "ctl\u{1}char")
            .with(Field::TechnicalReport, "_x0041_ literal")];
        ReportWriter::new("T").write(&entries, &path).unwrap();

        let loaded = read(&path).unwrap();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_excel_date_text() {
        assert_eq!(excel_date_text(45296.0), "05/01/2024");
        assert_eq!(excel_date_text(45296.5), "05/01/2024 12:00");
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("report.xlsx");

        let entries = vec![
            sample("Motor", "Reparo concluído"),
            sample("Fonte 12V", "reembolso"),
            RmaEntry::default().with(Field::Client, "Só cliente"),
            sample("Motor", ""),
        ];

        let written = write(&entries, &path, "Planilha RMA", "JANEIRO", "2024").unwrap();
        assert_eq!(written, path);

        let loaded = read(&path).unwrap();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_roundtrip_trims_values() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("trim.xlsx");

        let entries = vec![RmaEntry::default().with(Field::Client, "  padded  ")];
        ReportWriter::new("T").write(&entries, &path).unwrap();

        let loaded = read(&path).unwrap();
        assert_eq!(loaded[0].client, "padded");
    }

    #[test]
    fn test_read_skips_blank_rows_and_pads_short_rows() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("manual.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("RMA").unwrap();
        sheet.write_string(0, 0, "title").unwrap();
        sheet.write_string(1, 0, "RECEBIMENTO").unwrap();
        sheet.write_string(2, 0, "01/02/2024").unwrap();
        sheet.write_string(2, 1, "Acme").unwrap();
        sheet.write_string(3, 0, "   ").unwrap();
        sheet.write_number(4, 2, 4521).unwrap();
        workbook.save(&path).unwrap();

        let entries = read(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].received_date, "01/02/2024");
        assert_eq!(entries[0].client, "Acme");
        assert_eq!(entries[0].technical_report, "");
        assert_eq!(entries[1].invoice_number, "4521");
        assert_eq!(entries[1].received_date, "");
    }

    #[test]
    fn test_read_requires_rma_sheet() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("other.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Dados").unwrap();
        sheet.write_string(2, 0, "x").unwrap();
        workbook.save(&path).unwrap();

        let err = read(&path).unwrap_err();
        assert!(matches!(err, ReportError::MissingSheet { sheet: "RMA", .. }));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_read_rejects_non_workbook() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("notes.xlsx");
        std::fs::write(&path, "definitely not a zip").unwrap();

        let err = read(&path).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_read_header_only_report() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("empty.xlsx");
        write(&[], &path, "T", "Jan", "2024").unwrap();

        assert!(read(&path).unwrap().is_empty());
    }
}
