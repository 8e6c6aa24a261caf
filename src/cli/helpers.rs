//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use console::style;
use miette::Result;

use crate::cli::table::render_summary;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::session::Session;
use crate::core::store::RecordStore;
use crate::core::summary::summarize;
use crate::core::Config;

/// Locate the session named by `--session`, or discover it from the cwd
pub fn open_session(global: &GlobalOpts) -> Result<Session> {
    let session = match &global.session {
        Some(path) => Session::discover_from(path)?,
        None => Session::discover()?,
    };
    Ok(session)
}

/// Open the session and load its record store
pub fn load_store(global: &GlobalOpts) -> Result<(Session, RecordStore)> {
    let session = open_session(global)?;
    let store = session.load_store()?;
    Ok((session, store))
}

/// Persist the store and, with `--verbose`, print the recomputed summary
pub fn save_store(global: &GlobalOpts, session: &Session, store: &RecordStore) -> Result<()> {
    session.save_store(store)?;

    if global.verbose && !global.quiet {
        let summary = summarize(&store.snapshot());
        println!();
        print!("{}", render_summary(&summary, OutputFormat::Md)?);
    }
    Ok(())
}

/// Pick the output format: command flag, then global flag, then config, then fallback
pub fn resolve_format(
    local: OutputFormat,
    global: &GlobalOpts,
    config: &Config,
    fallback: OutputFormat,
) -> OutputFormat {
    let configured = config
        .default_format
        .as_deref()
        .and_then(OutputFormat::from_name)
        .unwrap_or(OutputFormat::Auto);

    local.or(global.format).or(configured).or(fallback)
}

/// Print a success line unless `--quiet`
pub fn success(global: &GlobalOpts, message: impl std::fmt::Display) {
    if !global.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}

/// Print a warning line to stderr
pub fn warn(message: impl std::fmt::Display) {
    eprintln!("{} {}", style("!").yellow(), message);
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Collapse newlines so multi-line text fits on one table row
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
