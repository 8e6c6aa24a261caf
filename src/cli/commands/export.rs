//! `rma export` command - Write the xlsx report

use chrono::Local;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_store, success};
use crate::cli::GlobalOpts;
use crate::core::config::default_export_name;
use crate::core::session::Session;
use crate::core::Config;
use crate::report::ReportWriter;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output file or directory (default: export_dir or the session root)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Title banner on the RMA sheet
    #[arg(long)]
    pub title: Option<String>,

    /// Month shown in the chart title
    #[arg(long)]
    pub month: Option<String>,

    /// Year shown in the chart title
    #[arg(long)]
    pub year: Option<String>,

    /// Write a report even when there are no entries
    #[arg(long)]
    pub allow_empty: bool,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let (session, store) = load_store(global)?;

    if store.is_empty() && !args.allow_empty {
        return Err(miette::miette!(
            help = "add entries with `rma entry new`, `rma paste` or `rma import`, or pass --allow-empty",
            "Nothing to export: the session has no entries"
        ));
    }

    let mut config = Config::load_for(Some(&session));
    if args.title.is_some() {
        config.title = args.title.clone();
    }
    if args.month.is_some() {
        config.month = args.month.clone();
    }
    if args.year.is_some() {
        config.year = args.year.clone();
    }

    let destination = destination(&args, &config, &session);

    let writer = ReportWriter::new(config.title())
        .period(config.month(), config.year())
        .status_keywords(config.status_keywords());
    let written = writer.write(&store.snapshot(), &destination)?;

    if global.quiet {
        println!("{}", written.display());
    } else {
        success(
            global,
            format!(
                "Exported {} entr(ies) to {}",
                style(store.len()).cyan(),
                style(written.display()).cyan()
            ),
        );
    }
    Ok(())
}

/// Resolve the report path. A directory gets the dated default file name.
fn destination(args: &ExportArgs, config: &Config, session: &Session) -> PathBuf {
    let file_name = default_export_name(Local::now().date_naive());

    match &args.output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.clone(),
        None => {
            let dir = match config.export_dir.as_deref().map(str::trim) {
                Some(dir) if !dir.is_empty() => session.root().join(dir),
                _ => session.root().to_path_buf(),
            };
            dir.join(file_name)
        }
    }
}
