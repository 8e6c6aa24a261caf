//! Workbook writer

use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartFormat, ChartLegendPosition, ChartPoint, ChartSolidFill,
    ChartType, Workbook, Worksheet, XlsxError,
};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::entry::{Field, RmaEntry};
use crate::core::summary::{summarize, Summary, Tally};

use super::layout::{
    column_width, palette_color, Formats, StatusKeywords, DATA_ROW, HEADER_ROW, MAX_CELL_CHARS,
    PIECES_HEADER, PIECES_ROW, QUANTITY_HEADER, REASONS_GAP, REASONS_HEADER, RMA_SHEET,
    SUMMARY_SHEET, TITLE_ROW, TOTAL_LABEL,
};
use super::ReportError;

/// Chart size: the default 480x288 scaled by 1.4
const CHART_WIDTH: u32 = 672;
const CHART_HEIGHT: u32 = 403;
const CHART_HOLE_SIZE: u8 = 60;

/// Write a report with the default status keywords.
///
/// Returns the path of the written file.
pub fn write(
    entries: &[RmaEntry],
    destination: impl AsRef<Path>,
    title: &str,
    month: &str,
    year: &str,
) -> Result<PathBuf, ReportError> {
    ReportWriter::new(title)
        .period(month, year)
        .write(entries, destination)
}

/// Report writer with its presentation options
#[derive(Clone, Debug)]
pub struct ReportWriter {
    /// Banner text on the RMA sheet
    pub title: String,
    /// Month label in the chart title
    pub month: String,
    /// Year label in the chart title
    pub year: String,
    /// Keywords that drive the status cell styling
    pub keywords: StatusKeywords,
}

impl ReportWriter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            month: String::new(),
            year: String::new(),
            keywords: StatusKeywords::default(),
        }
    }

    /// Set the period shown in the chart title
    pub fn period(mut self, month: impl Into<String>, year: impl Into<String>) -> Self {
        self.month = month.into();
        self.year = year.into();
        self
    }

    /// Override the status keywords
    pub fn status_keywords(mut self, keywords: StatusKeywords) -> Self {
        self.keywords = keywords;
        self
    }

    /// Render the workbook and write it to `destination`.
    ///
    /// The file is written to a temporary sibling and renamed into place, so
    /// a failed export never leaves a partial workbook behind.
    pub fn write(
        &self,
        entries: &[RmaEntry],
        destination: impl AsRef<Path>,
    ) -> Result<PathBuf, ReportError> {
        let path = destination.as_ref().to_path_buf();
        let bytes = self.render(entries)?;

        let io_err = |source: std::io::Error| ReportError::Io {
            path: path.clone(),
            source,
        };

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(io_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;

        Ok(path)
    }

    /// Render the workbook to xlsx bytes
    pub fn render(&self, entries: &[RmaEntry]) -> Result<Vec<u8>, ReportError> {
        let formats = Formats::new();
        let summary = summarize(entries);

        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.records_sheet(entries, &formats)?);
        workbook.push_worksheet(self.summary_sheet(&summary, &formats)?);

        Ok(workbook.save_to_buffer()?)
    }

    fn records_sheet(&self, entries: &[RmaEntry], formats: &Formats) -> Result<Worksheet, XlsxError> {
        let mut sheet = Worksheet::new();
        sheet.set_name(RMA_SHEET)?;
        sheet.set_screen_gridlines(false);

        let last_col = (Field::COUNT - 1) as u16;
        sheet.merge_range(TITLE_ROW, 0, TITLE_ROW, last_col, clip(&self.title), &formats.title)?;
        sheet.set_row_height(TITLE_ROW, 24)?;

        for field in Field::ALL {
            let col = field.index() as u16;
            sheet.write_string_with_format(HEADER_ROW, col, field.header(), formats.header_for(field))?;
            sheet.set_column_width(col, column_width(field))?;
        }
        sheet.set_freeze_panes(DATA_ROW, 0)?;

        for (offset, entry) in entries.iter().enumerate() {
            let row = DATA_ROW + offset as u32;
            for field in Field::ALL {
                let value = entry.get(field);
                let format = formats.for_cell(field, value, &self.keywords);
                sheet.write_string_with_format(row, field.index() as u16, clip(value), format)?;
            }
        }

        Ok(sheet)
    }

    fn summary_sheet(&self, summary: &Summary, formats: &Formats) -> Result<Worksheet, XlsxError> {
        let mut sheet = Worksheet::new();
        sheet.set_name(SUMMARY_SHEET)?;
        sheet.set_screen_gridlines(false);

        sheet.set_column_width(0, 44)?;
        sheet.set_column_width(1, 14)?;
        for col in 3..=9 {
            sheet.set_column_width(col, 18)?;
        }

        // Pieces table
        write_table_header(&mut sheet, PIECES_ROW, PIECES_HEADER, formats)?;
        for (i, tally) in summary.pieces.iter().enumerate() {
            let row = PIECES_ROW + 1 + i as u32;
            write_tally(&mut sheet, row, tally, &formats.table_cell, &formats.table_cell_center)?;
        }
        let pieces_total_row = PIECES_ROW + summary.pieces.len() as u32 + 1;
        write_total(&mut sheet, pieces_total_row, summary.pieces_total(), formats)?;

        // Reasons table
        let reasons_row = pieces_total_row + REASONS_GAP;
        write_table_header(&mut sheet, reasons_row, REASONS_HEADER, formats)?;
        for (i, tally) in summary.reasons.iter().enumerate() {
            let row = reasons_row + 1 + i as u32;
            let (label_format, qty_format) = Formats::reason_row(i);
            write_tally(&mut sheet, row, tally, &label_format, &qty_format)?;
        }
        let reasons_total_row = reasons_row + summary.reasons.len() as u32 + 1;
        write_total(&mut sheet, reasons_total_row, summary.reasons_total(), formats)?;

        // An empty series would make a meaningless (and divide-by-zero) chart
        if !summary.pieces.is_empty() {
            let chart = self.pieces_chart(summary.pieces.len());
            sheet.insert_chart(1, 3, &chart)?;
        }

        Ok(sheet)
    }

    fn pieces_chart(&self, rows: usize) -> Chart {
        let first_row = PIECES_ROW + 1;
        let last_row = PIECES_ROW + rows as u32;

        let points: Vec<ChartPoint> = (0..rows)
            .map(|i| {
                ChartPoint::new().set_format(
                    ChartFormat::new().set_solid_fill(ChartSolidFill::new().set_color(palette_color(i))),
                )
            })
            .collect();

        let mut data_label = ChartDataLabel::new();
        data_label.show_percentage();

        let mut chart = Chart::new(ChartType::Doughnut);
        chart
            .add_series()
            .set_categories((SUMMARY_SHEET, first_row, 0, last_row, 0))
            .set_values((SUMMARY_SHEET, first_row, 1, last_row, 1))
            .set_points(&points)
            .set_data_label(&data_label);

        chart.set_hole_size(CHART_HOLE_SIZE);
        chart
            .title()
            .set_name(&format!("{}\n{} - {}", PIECES_HEADER, self.month, self.year));
        chart.legend().set_position(ChartLegendPosition::Left);
        chart.chart_area().set_format(ChartFormat::new().set_no_border());
        chart.set_width(CHART_WIDTH).set_height(CHART_HEIGHT);

        chart
    }
}

/// Cut text to what a single cell can hold
fn clip(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

fn write_table_header(
    sheet: &mut Worksheet,
    row: u32,
    label: &str,
    formats: &Formats,
) -> Result<(), XlsxError> {
    sheet.write_string_with_format(row, 0, label, &formats.table_header)?;
    sheet.write_string_with_format(row, 1, QUANTITY_HEADER, &formats.table_header_qty)?;
    Ok(())
}

fn write_tally(
    sheet: &mut Worksheet,
    row: u32,
    tally: &Tally,
    label_format: &rust_xlsxwriter::Format,
    qty_format: &rust_xlsxwriter::Format,
) -> Result<(), XlsxError> {
    sheet.write_string_with_format(row, 0, &tally.label, label_format)?;
    sheet.write_number_with_format(row, 1, tally.count as f64, qty_format)?;
    Ok(())
}

fn write_total(
    sheet: &mut Worksheet,
    row: u32,
    total: usize,
    formats: &Formats,
) -> Result<(), XlsxError> {
    sheet.write_string_with_format(row, 0, TOTAL_LABEL, &formats.total_label)?;
    sheet.write_number_with_format(row, 1, total as f64, &formats.total_qty)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{cell_text, read};
    use calamine::{open_workbook_auto, Data, Range, Reader};
    use tempfile::tempdir;

    const CHART_PART: &[u8] = b"xl/charts/chart1.xml";

    fn rma(product: &str, defect: &str) -> RmaEntry {
        RmaEntry::default()
            .with(Field::Client, "Acme")
            .with(Field::ShippedProduct, product)
            .with(Field::ConfigurationOrDefect, defect)
    }

    fn has_chart(bytes: &[u8]) -> bool {
        bytes.windows(CHART_PART.len()).any(|w| w == CHART_PART)
    }

    fn summary_range(entries: &[RmaEntry]) -> (Range<Data>, Vec<u8>) {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("summary.xlsx");
        let writer = ReportWriter::new("T").period("MAIO", "2024");
        writer.write(entries, &path).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range(SUMMARY_SHEET).unwrap();
        (range, writer.render(entries).unwrap())
    }

    fn at(range: &Range<Data>, row: u32, col: u32) -> String {
        cell_text(range.get_value((row, col)))
    }

    fn dir_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_summary_sheet_layout() {
        let entries = vec![
            rma("Motor", "queimado"),
            rma("Fonte", ""),
            rma("Motor", "queimado"),
            rma("", "riscado"),
            rma("", ""),
        ];
        let (range, bytes) = summary_range(&entries);

        // Pieces table
        assert_eq!(at(&range, 0, 0), PIECES_HEADER);
        assert_eq!(at(&range, 0, 1), QUANTITY_HEADER);
        assert_eq!(at(&range, 1, 0), "Motor");
        assert_eq!(at(&range, 1, 1), "2");
        assert_eq!(at(&range, 2, 0), "Fonte");
        assert_eq!(at(&range, 2, 1), "1");
        assert_eq!(at(&range, 3, 0), TOTAL_LABEL);
        assert_eq!(at(&range, 3, 1), "3");

        // Reasons table starts three rows below the pieces TOTAL
        assert_eq!(at(&range, 4, 0), "");
        assert_eq!(at(&range, 5, 0), "");
        assert_eq!(at(&range, 6, 0), REASONS_HEADER);
        assert_eq!(at(&range, 6, 1), QUANTITY_HEADER);
        assert_eq!(at(&range, 7, 0), "Motor (queimado)");
        assert_eq!(at(&range, 7, 1), "2");
        assert_eq!(at(&range, 8, 0), "Fonte");
        assert_eq!(at(&range, 8, 1), "1");
        assert_eq!(at(&range, 9, 0), "riscado");
        assert_eq!(at(&range, 9, 1), "1");
        assert_eq!(at(&range, 10, 0), TOTAL_LABEL);
        assert_eq!(at(&range, 10, 1), "4");

        assert!(has_chart(&bytes));
    }

    #[test]
    fn test_summary_sheet_without_entries() {
        let (range, bytes) = summary_range(&[]);

        assert_eq!(at(&range, 0, 0), PIECES_HEADER);
        assert_eq!(at(&range, 1, 0), TOTAL_LABEL);
        assert_eq!(at(&range, 1, 1), "0");
        assert_eq!(at(&range, 4, 0), REASONS_HEADER);
        assert_eq!(at(&range, 5, 0), TOTAL_LABEL);
        assert_eq!(at(&range, 5, 1), "0");

        assert!(!has_chart(&bytes));
    }

    #[test]
    fn test_reasons_only_has_no_chart() {
        let entries = vec![rma("", "riscado")];
        let (range, bytes) = summary_range(&entries);

        assert_eq!(at(&range, 1, 0), TOTAL_LABEL);
        assert_eq!(at(&range, 4, 0), REASONS_HEADER);
        assert_eq!(at(&range, 5, 0), "riscado");
        assert_eq!(at(&range, 6, 1), "1");
        assert!(!has_chart(&bytes));
    }

    #[test]
    fn test_write_under_regular_file_fails_cleanly() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("f"), "not a directory").unwrap();

        let err = ReportWriter::new("T")
            .write(&[rma("Motor", "")], tmp.path().join("f").join("report.xlsx"))
            .unwrap_err();

        assert!(matches!(err, ReportError::Io { .. }));
        assert_eq!(dir_names(tmp.path()), vec!["f"]);
    }

    #[test]
    fn test_write_onto_directory_fails_cleanly() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("dir.xlsx");
        std::fs::create_dir(&target).unwrap();

        let err = ReportWriter::new("T")
            .write(&[rma("Motor", "")], &target)
            .unwrap_err();

        assert!(matches!(err, ReportError::Io { .. }));
        assert_eq!(dir_names(tmp.path()), vec!["dir.xlsx"]);
        assert!(dir_names(&target).is_empty());
    }

    #[test]
    fn test_oversized_cell_is_clipped() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("long.xlsx");

        let long = "é".repeat(40_000);
        let entries = vec![rma("Motor", "").with(Field::TechnicalReport, &long)];
        ReportWriter::new("T").write(&entries, &path).unwrap();

        let loaded = read(&path).unwrap();
        assert_eq!(loaded[0].technical_report.chars().count(), MAX_CELL_CHARS);
        assert_eq!(loaded[0].shipped_product, "Motor");
    }

    #[test]
    fn test_clip_keeps_short_text() {
        assert_eq!(clip("Motor"), "Motor");
        assert_eq!(clip(&"ã".repeat(MAX_CELL_CHARS)).chars().count(), MAX_CELL_CHARS);
    }
}
