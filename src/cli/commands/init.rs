//! `rma init` command - Initialize a new RMA session

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::session::{Session, SessionError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Reinitialize an existing session, discarding its entries
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Created directory {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
    }

    let session = if args.force {
        Session::init_force(&path)
    } else {
        Session::init(&path)
    };

    match session {
        Ok(session) => {
            if global.quiet {
                return Ok(());
            }
            println!(
                "{} Initialized RMA session at {}",
                style("✓").green(),
                style(session.root().display()).cyan()
            );
            println!();
            println!("Next steps:");
            println!("  {} Record your first return", style("rma entry new").yellow());
            println!("  {} Bulk-load rows copied from a spreadsheet", style("rma paste").yellow());
            println!("  {} Write the xlsx report", style("rma export").yellow());
            Ok(())
        }
        Err(SessionError::AlreadyExists(path)) => {
            println!(
                "{} RMA session already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("rma init --force").yellow());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
