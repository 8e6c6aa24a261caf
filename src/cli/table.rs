//! Table formatting for entry lists and summaries
//!
//! Every list-style command renders through this module so the field order
//! always follows [`Field::ALL`]:
//! - TSV, CSV, JSON and YAML carry every field
//! - Markdown shows a compact view with truncated free text
//! - ID prints one `@N` per line for piping into other commands

use miette::{miette, IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{single_line, truncate_str};
use crate::cli::OutputFormat;
use crate::core::entry::{Field, RmaEntry};
use crate::core::store::EntryId;
use crate::core::summary::{Summary, Tally};

/// Columns of the compact markdown view
const COMPACT_COLUMNS: [Field; 6] = [
    Field::ReceivedDate,
    Field::Client,
    Field::ShippedProduct,
    Field::SerialNumber,
    Field::Status,
    Field::ConfigurationOrDefect,
];

/// Width at which compact cells are truncated
const COMPACT_WIDTH: usize = 30;

/// An entry together with its display id, as serialized in json/yaml output
#[derive(Serialize)]
struct EntryRow<'a> {
    id: String,
    #[serde(flatten)]
    entry: &'a RmaEntry,
}

impl<'a> EntryRow<'a> {
    fn new(id: EntryId, entry: &'a RmaEntry) -> Self {
        Self {
            id: id.to_string(),
            entry,
        }
    }
}

/// Render a list of entries in the given (already resolved) format
pub fn render_entries(rows: &[(EntryId, &RmaEntry)], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Id => Ok(rows.iter().map(|(id, _)| format!("{}\n", id)).collect()),
        OutputFormat::Json => {
            let view: Vec<EntryRow> = rows.iter().map(|(id, e)| EntryRow::new(*id, e)).collect();
            let mut json = serde_json::to_string_pretty(&view).into_diagnostic()?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Yaml => {
            let view: Vec<EntryRow> = rows.iter().map(|(id, e)| EntryRow::new(*id, e)).collect();
            serde_yml::to_string(&view).into_diagnostic()
        }
        OutputFormat::Csv => entries_csv(rows),
        OutputFormat::Md => Ok(entries_markdown(rows)),
        OutputFormat::Tsv | OutputFormat::Auto => Ok(entries_tsv(rows)),
    }
}

/// Render one entry (for `entry show`)
pub fn render_entry(id: EntryId, entry: &RmaEntry, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&EntryRow::new(id, entry)).into_diagnostic()?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Yaml | OutputFormat::Auto => {
            serde_yml::to_string(&EntryRow::new(id, entry)).into_diagnostic()
        }
        other => render_entries(&[(id, entry)], other),
    }
}

fn entries_tsv(rows: &[(EntryId, &RmaEntry)]) -> String {
    let mut output = String::from("id");
    for field in Field::ALL {
        output.push('\t');
        output.push_str(field.key());
    }
    output.push('\n');

    for (id, entry) in rows {
        output.push_str(&id.to_string());
        for value in entry.values() {
            output.push('\t');
            output.push_str(&single_line(value));
        }
        output.push('\n');
    }
    output
}

fn entries_csv(rows: &[(EntryId, &RmaEntry)]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["id"];
    header.extend(Field::ALL.iter().map(|f| f.key()));
    writer.write_record(&header).into_diagnostic()?;

    for (id, entry) in rows {
        let id = id.to_string();
        let mut record = vec![id.as_str()];
        record.extend(entry.values());
        writer.write_record(&record).into_diagnostic()?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| miette!("Failed to flush CSV output: {}", e))?;
    String::from_utf8(bytes).into_diagnostic()
}

fn entries_markdown(rows: &[(EntryId, &RmaEntry)]) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["ID".to_string()];
    header.extend(COMPACT_COLUMNS.iter().map(|f| f.header().to_string()));
    builder.push_record(header);

    for (id, entry) in rows {
        let mut record = vec![id.to_string()];
        record.extend(
            COMPACT_COLUMNS
                .iter()
                .map(|f| truncate_str(&single_line(entry.get(*f)), COMPACT_WIDTH)),
        );
        builder.push_record(record);
    }

    let mut output = builder.build().with(Style::markdown()).to_string();
    output.push('\n');
    output
}

/// Serialized shape of a summary, totals included
#[derive(Serialize)]
struct SummaryView<'a> {
    pieces: &'a [Tally],
    pieces_total: usize,
    reasons: &'a [Tally],
    reasons_total: usize,
}

/// Render both frequency tables with their TOTAL rows
pub fn render_summary(summary: &Summary, format: OutputFormat) -> Result<String> {
    let view = SummaryView {
        pieces: &summary.pieces,
        pieces_total: summary.pieces_total(),
        reasons: &summary.reasons,
        reasons_total: summary.reasons_total(),
    };

    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&view).into_diagnostic()?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Yaml => serde_yml::to_string(&view).into_diagnostic(),
        OutputFormat::Csv => summary_csv(summary),
        OutputFormat::Tsv => Ok(summary_tsv(summary)),
        OutputFormat::Md | OutputFormat::Auto => Ok(summary_markdown(summary)),
        OutputFormat::Id => Err(miette!("'id' output is not available for summaries")),
    }
}

fn tally_table(title: &str, tallies: &[Tally], total: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record([title, "QUANTIDADE"]);
    for tally in tallies {
        builder.push_record([tally.label.clone(), tally.count.to_string()]);
    }
    builder.push_record(["TOTAL".to_string(), total.to_string()]);
    builder.build().with(Style::markdown()).to_string()
}

fn summary_markdown(summary: &Summary) -> String {
    let mut output = tally_table("PEÇAS DEFEITUOSAS", &summary.pieces, summary.pieces_total());
    output.push_str("\n\n");
    output.push_str(&tally_table(
        "MOTIVOS DEFEITUOSOS",
        &summary.reasons,
        summary.reasons_total(),
    ));
    output.push('\n');
    output
}

fn summary_tsv(summary: &Summary) -> String {
    let mut output = String::from("table\tlabel\tcount\n");
    for tally in &summary.pieces {
        output.push_str(&format!("pieces\t{}\t{}\n", tally.label, tally.count));
    }
    for tally in &summary.reasons {
        output.push_str(&format!("reasons\t{}\t{}\n", tally.label, tally.count));
    }
    output
}

fn summary_csv(summary: &Summary) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["table", "label", "count"])
        .into_diagnostic()?;

    let tables = [("pieces", &summary.pieces), ("reasons", &summary.reasons)];
    for (name, tallies) in tables {
        for tally in tallies.iter() {
            writer
                .write_record([name, tally.label.as_str(), &tally.count.to_string()])
                .into_diagnostic()?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| miette!("Failed to flush CSV output: {}", e))?;
    String::from_utf8(bytes).into_diagnostic()
}
