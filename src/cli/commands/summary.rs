//! `rma summary` command - Defective piece and defect reason counts

use miette::Result;

use crate::cli::helpers::{load_store, resolve_format};
use crate::cli::table::render_summary;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::summary::summarize;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Output format (md, tsv, csv, json, yaml)
    #[arg(long, short = 'o', default_value = "auto")]
    pub output: OutputFormat,
}

pub fn run(args: SummaryArgs, global: &GlobalOpts) -> Result<()> {
    let (session, store) = load_store(global)?;
    let config = Config::load_for(Some(&session));

    let summary = summarize(store.iter().map(|(_, entry)| entry));
    let format = resolve_format(args.output, global, &config, OutputFormat::Md);

    print!("{}", render_summary(&summary, format)?);
    Ok(())
}
