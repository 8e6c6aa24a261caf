//! `rma import` command - Append entries from an xlsx report

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_store, save_store, success, warn};
use crate::cli::GlobalOpts;
use crate::report;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Report workbook to read (must contain an `RMA` sheet)
    pub file: PathBuf,

    /// Show what would be imported without saving
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let (session, mut store) = load_store(global)?;

    // The store is only touched once the whole workbook has been read
    let entries = report::read(&args.file)?;

    if entries.is_empty() {
        warn(format!("No entries found in {}", args.file.display()));
        return Ok(());
    }

    if args.dry_run {
        println!(
            "{} Would import {} entr(ies) from {}",
            style("→").blue(),
            style(entries.len()).cyan(),
            args.file.display()
        );
        return Ok(());
    }

    let ids = store.extend(entries);
    save_store(global, &session, &store)?;

    let range = match (ids.first(), ids.last()) {
        (Some(first), Some(last)) if first != last => format!(" ({}..{})", first, last),
        (Some(first), _) => format!(" ({})", first),
        _ => String::new(),
    };
    success(
        global,
        format!(
            "Imported {} entr(ies) from {}{}",
            style(ids.len()).cyan(),
            style(args.file.display()).cyan(),
            range
        ),
    );
    Ok(())
}
