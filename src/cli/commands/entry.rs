//! `rma entry` command - Record management

use chrono::Local;
use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{load_store, resolve_format, save_store, success, warn};
use crate::cli::table::{render_entries, render_entry};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entry::{Field, RmaEntry};
use crate::core::store::{EntryId, StoreError};
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum EntryCommands {
    /// Add a new entry
    New(NewArgs),

    /// List entries in insertion order
    List(ListArgs),

    /// Show one entry's details
    Show(ShowArgs),

    /// Replace fields of an existing entry
    Update(UpdateArgs),

    /// Delete entries by id
    Delete(DeleteArgs),
}

/// One optional flag per entry field
#[derive(clap::Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Date the return was received (RECEBIMENTO)
    #[arg(long, visible_alias = "date")]
    pub received_date: Option<String>,

    /// Customer name
    #[arg(long)]
    pub client: Option<String>,

    /// Invoice number (NF)
    #[arg(long, visible_alias = "nf")]
    pub invoice_number: Option<String>,

    /// Service order (OS)
    #[arg(long, visible_alias = "os")]
    pub service_order: Option<String>,

    /// Triage stage or date
    #[arg(long)]
    pub triage: Option<String>,

    /// Product shipped back by the customer
    #[arg(long, visible_alias = "product")]
    pub shipped_product: Option<String>,

    /// Unit of measure or quantity (UND)
    #[arg(long)]
    pub unit: Option<String>,

    /// Sales platform
    #[arg(long)]
    pub platform: Option<String>,

    /// Product code
    #[arg(long)]
    pub code: Option<String>,

    /// Serial number
    #[arg(long, visible_alias = "serial")]
    pub serial_number: Option<String>,

    /// Case status (e.g. "reparo", "reembolso")
    #[arg(long)]
    pub status: Option<String>,

    /// Configuration or defect description
    #[arg(long, visible_alias = "defect")]
    pub configuration_or_defect: Option<String>,

    /// Marketplace order reference
    #[arg(long, visible_alias = "order")]
    pub marketplace_order: Option<String>,

    /// Technical report (LAUDO TÉCNICO)
    #[arg(long, visible_alias = "report")]
    pub technical_report: Option<String>,
}

impl FieldArgs {
    /// Flag values paired with their field, in column order
    fn pairs(&self) -> [(Field, Option<&String>); Field::COUNT] {
        [
            (Field::ReceivedDate, self.received_date.as_ref()),
            (Field::Client, self.client.as_ref()),
            (Field::InvoiceNumber, self.invoice_number.as_ref()),
            (Field::ServiceOrder, self.service_order.as_ref()),
            (Field::Triage, self.triage.as_ref()),
            (Field::ShippedProduct, self.shipped_product.as_ref()),
            (Field::Unit, self.unit.as_ref()),
            (Field::Platform, self.platform.as_ref()),
            (Field::Code, self.code.as_ref()),
            (Field::SerialNumber, self.serial_number.as_ref()),
            (Field::Status, self.status.as_ref()),
            (Field::ConfigurationOrDefect, self.configuration_or_defect.as_ref()),
            (Field::MarketplaceOrder, self.marketplace_order.as_ref()),
            (Field::TechnicalReport, self.technical_report.as_ref()),
        ]
    }

    fn is_empty(&self) -> bool {
        self.pairs().iter().all(|(_, value)| value.is_none())
    }

    /// Overwrite the given fields of `entry`, trimming each value
    fn apply_to(&self, entry: &mut RmaEntry) {
        for (field, value) in self.pairs() {
            if let Some(value) = value {
                entry.set(field, value.trim());
            }
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub fields: FieldArgs,

    /// Prompt for every field (default when no field flag is given)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(long, short = 'o', default_value = "auto")]
    pub output: OutputFormat,

    /// Only entries with a field containing this text (case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Restrict --search to one field (e.g. client, serial_number)
    #[arg(long, requires = "search")]
    pub field: Option<Field>,

    /// Print only the number of matching entries
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Entry id (@N or N)
    pub id: EntryId,

    /// Output format
    #[arg(long, short = 'o', default_value = "auto")]
    pub output: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Entry id (@N or N)
    pub id: EntryId,

    #[command(flatten)]
    pub fields: FieldArgs,

    /// Prompt for every field, starting from the current values
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Entry ids (@N or N)
    #[arg(required = true)]
    pub ids: Vec<EntryId>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run an entry subcommand
pub fn run(cmd: EntryCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EntryCommands::New(args) => run_new(args, global),
        EntryCommands::List(args) => run_list(args, global),
        EntryCommands::Show(args) => run_show(args, global),
        EntryCommands::Update(args) => run_update(args, global),
        EntryCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (session, mut store) = load_store(global)?;

    let mut entry = RmaEntry::default();
    args.fields.apply_to(&mut entry);

    if args.interactive || args.fields.is_empty() {
        if entry.received_date.is_empty() {
            entry.received_date = Local::now().format("%d/%m/%Y").to_string();
        }
        entry = prompt_fields(entry)?;
    }

    let id = store.insert(entry);
    save_store(global, &session, &store)?;

    if global.quiet {
        println!("{}", id);
    } else {
        success(global, format!("Added entry {}", style(id).cyan()));
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (session, store) = load_store(global)?;
    let config = Config::load_for(Some(&session));

    let needle = args.search.as_deref().map(|s| s.trim().to_lowercase());
    let rows: Vec<(EntryId, &RmaEntry)> = store
        .iter()
        .filter(|(_, entry)| match &needle {
            Some(needle) => matches_search(entry, needle, args.field),
            None => true,
        })
        .collect();

    if args.count {
        println!("{}", rows.len());
        return Ok(());
    }

    if rows.is_empty() {
        if !global.quiet {
            eprintln!("{}", style("No entries found.").dim());
        }
        return Ok(());
    }

    let format = resolve_format(args.output, global, &config, OutputFormat::Tsv);
    print!("{}", render_entries(&rows, format)?);

    if format == OutputFormat::Md && !global.quiet {
        println!();
        println!("{} entr(ies) found", style(rows.len()).cyan());
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (session, store) = load_store(global)?;
    let config = Config::load_for(Some(&session));

    let entry = store
        .get(args.id)
        .ok_or(StoreError::NotFound(args.id))?;

    let format = resolve_format(args.output, global, &config, OutputFormat::Yaml);
    print!("{}", render_entry(args.id, entry, format)?);
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let (session, mut store) = load_store(global)?;

    if args.fields.is_empty() && !args.interactive {
        return Err(miette::miette!(
            "No changes specified. Pass one or more field flags (see `rma entry update --help`) or use -i"
        ));
    }

    let mut entry = store
        .get(args.id)
        .cloned()
        .ok_or(StoreError::NotFound(args.id))?;
    args.fields.apply_to(&mut entry);

    if args.interactive {
        entry = prompt_fields(entry)?;
    }

    store.update(args.id, entry)?;
    save_store(global, &session, &store)?;

    success(global, format!("Updated entry {}", style(args.id).cyan()));
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let (session, mut store) = load_store(global)?;

    let (present, missing): (Vec<EntryId>, Vec<EntryId>) =
        args.ids.iter().copied().partition(|id| store.get(*id).is_some());

    for id in &missing {
        warn(format!("No entry with id {}, skipping", id));
    }

    if present.is_empty() {
        return Ok(());
    }

    if !args.yes {
        let listed: Vec<String> = present.iter().map(|id| id.to_string()).collect();
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete {}?", listed.join(", ")))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("{} Nothing deleted", style("→").blue());
            return Ok(());
        }
    }

    let removed = store.delete(&present);
    save_store(global, &session, &store)?;

    success(global, format!("Deleted {} entr(ies)", style(removed).cyan()));
    Ok(())
}

/// Case-insensitive substring match over one field, or every field
fn matches_search(entry: &RmaEntry, needle: &str, field: Option<Field>) -> bool {
    match field {
        Some(field) => entry.get(field).to_lowercase().contains(needle),
        None => entry
            .values()
            .iter()
            .any(|value| value.to_lowercase().contains(needle)),
    }
}

/// Prompt for each field in column order, using the current values as defaults
fn prompt_fields(mut entry: RmaEntry) -> Result<RmaEntry> {
    let theme = ColorfulTheme::default();

    for field in Field::ALL {
        let current = entry.get(field).to_string();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(field.header())
            .allow_empty(true);
        if !current.is_empty() {
            input = input.default(current);
        }
        let value = input.interact_text().into_diagnostic()?;
        entry.set(field, value.trim());
    }

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_args_apply_trims_and_keeps_others() {
        let args = FieldArgs {
            client: Some("  Acme ".to_string()),
            status: Some(String::new()),
            ..Default::default()
        };
        let mut entry = RmaEntry::default()
            .with(Field::Status, "reparo")
            .with(Field::Code, "X1");
        args.apply_to(&mut entry);

        assert_eq!(entry.client, "Acme");
        assert_eq!(entry.status, "");
        assert_eq!(entry.code, "X1");
    }

    #[test]
    fn test_field_args_pairs_follow_column_order() {
        let args = FieldArgs::default();
        let fields: Vec<Field> = args.pairs().iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, Field::ALL.to_vec());
        assert!(args.is_empty());
    }

    #[test]
    fn test_matches_search() {
        let entry = RmaEntry::default().with(Field::SerialNumber, "SN-ABC-42");
        assert!(matches_search(&entry, "abc", None));
        assert!(!matches_search(&entry, "xyz", None));
    }

    #[test]
    fn test_matches_search_in_one_field() {
        let entry = RmaEntry::default()
            .with(Field::Client, "Acme")
            .with(Field::SerialNumber, "SN-ACME-1");
        assert!(matches_search(&entry, "acme", Some(Field::SerialNumber)));
        assert!(!matches_search(&entry, "sn-", Some(Field::Client)));
    }
}
