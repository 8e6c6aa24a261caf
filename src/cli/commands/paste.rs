//! `rma paste` command - Append entries from tab or space separated text
//!
//! Accepts rows copied from a spreadsheet: one entry per line, fields in
//! column order separated by tabs (or by runs of two or more spaces when the
//! line has no tabs).

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::Read;
use std::path::PathBuf;

use crate::cli::helpers::{load_store, save_store, success, warn};
use crate::cli::GlobalOpts;
use crate::core::paste::parse_text;

#[derive(clap::Args, Debug)]
pub struct PasteArgs {
    /// Text file to read (default: stdin)
    pub file: Option<PathBuf>,
}

pub fn run(args: PasteArgs, global: &GlobalOpts) -> Result<()> {
    let (session, mut store) = load_store(global)?;

    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
            buf
        }
    };

    let entries = parse_text(&text);
    if entries.is_empty() {
        warn("No valid data found in the pasted text");
        return Ok(());
    }

    let ids = store.extend(entries);
    save_store(global, &session, &store)?;

    success(
        global,
        format!("Added {} entr(ies) from pasted text", style(ids.len()).cyan()),
    );
    Ok(())
}
