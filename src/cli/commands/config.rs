//! `rma config` command - Configuration management
//!
//! Provides commands to view and modify RMA configuration.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::helpers::{open_session, success};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path(PathArgs),

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's effective value
    pub key: Option<String>,

    /// Show only session-level config
    #[arg(long = "session-only")]
    pub session_only: bool,

    /// Show only global (user) config
    #[arg(long = "global-only")]
    pub global_only: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (see `rma config keys`)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of session config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of session config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Show only session config path
    #[arg(long = "session-only")]
    pub session_only: bool,

    /// Show only global config path
    #[arg(long = "global-only")]
    pub global_only: bool,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("title", "Title banner of the RMA sheet (default: dated title)"),
    ("month", "Month shown in the chart title (default: current month)"),
    ("year", "Year shown in the chart title (default: current year)"),
    ("export_dir", "Directory for exported reports, relative to the session root"),
    ("repair_keyword", "Status text that marks a repair (default: reparo)"),
    ("refund_keyword", "Status text that marks a refund (default: reembolso)"),
    (
        "default_format",
        "Default output format (tsv, md, json, yaml, csv, id)",
    ),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path(args) => run_path(args, global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global).ok();
    let config = Config::load_for(session.as_ref());

    // A single key prints its effective value, defaults included
    if let Some(key) = &args.key {
        check_key(key)?;
        println!("{}", effective_value(&config, key));
        return Ok(());
    }

    if args.session_only && args.global_only {
        return Err(miette::miette!(
            "Cannot specify both --session-only and --global-only"
        ));
    }

    if args.session_only {
        print_file("Session config:", &session_config_path(global)?)?;
    } else if args.global_only {
        print_file("Global config:", &global_config_path()?)?;
    } else {
        println!("{}", style("Effective Configuration").bold().underlined());
        println!();

        for (key, _) in VALID_KEYS {
            print_config_value(key, configured_value(&config, key).as_deref());
        }

        println!();
        println!("{}", style("Config Sources (in priority order):").dim());
        println!("  1. Command-line flags");
        println!("  2. Environment variables (RMA_TITLE, RMA_MONTH, RMA_YEAR, RMA_EXPORT_DIR)");
        println!("  3. Session config (.rma/config.yaml)");
        println!("  4. Global config (~/.config/rma/config.yaml)");
    }

    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    if args.key == "default_format" && OutputFormat::from_name(&args.value).is_none() {
        return Err(miette::miette!(
            "Invalid output format '{}'. Use one of: auto, yaml, tsv, json, csv, md, id",
            args.value
        ));
    }

    let config_path = if args.global {
        global_config_path()?
    } else {
        session_config_path(global)?
    };

    let mut config_map = read_mapping(&config_path)?;
    if let serde_yml::Value::Mapping(map) = &mut config_map {
        map.insert(
            serde_yml::Value::String(args.key.clone()),
            serde_yml::Value::String(args.value.clone()),
        );
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    let scope = if args.global { "global" } else { "session" };
    success(
        global,
        format!(
            "Set {} {} {} in {} config",
            style(&args.key).cyan(),
            style("→").dim(),
            style(&args.value).yellow(),
            scope
        ),
    );
    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    let config_path = if args.global {
        global_config_path()?
    } else {
        session_config_path(global)?
    };

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut config_map = read_mapping(&config_path)?;
    let removed = match &mut config_map {
        serde_yml::Value::Mapping(map) => map
            .remove(&serde_yml::Value::String(args.key.clone()))
            .is_some(),
        _ => false,
    };

    if !removed {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    let scope = if args.global { "global" } else { "session" };
    success(
        global,
        format!("Removed {} from {} config", style(&args.key).cyan(), scope),
    );
    Ok(())
}

fn run_path(args: PathArgs, global: &GlobalOpts) -> Result<()> {
    if args.session_only && args.global_only {
        return Err(miette::miette!(
            "Cannot specify both --session-only and --global-only"
        ));
    }

    if args.session_only {
        println!("{}", session_config_path(global)?.display());
    } else if args.global_only {
        println!("{}", global_config_path()?.display());
    } else {
        let global_path = global_config_path()?;

        println!("{}", style("Configuration file paths:").bold());
        println!();
        println!("  {} {}", style("Global:").cyan(), global_path.display());
        println!("          {}", exists_label(global_path.exists()));

        println!();
        match session_config_path(global) {
            Ok(path) => {
                println!("  {} {}", style("Session:").cyan(), path.display());
                println!("          {}", exists_label(path.exists()));
            }
            Err(_) => println!(
                "  {} {}",
                style("Session:").cyan(),
                style("(not in an RMA session)").dim()
            ),
        }
    }

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<16} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'rma config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

// Helper functions

fn check_key(key: &str) -> Result<()> {
    if VALID_KEYS.iter().any(|(k, _)| *k == key) {
        Ok(())
    } else {
        let keys: Vec<&str> = VALID_KEYS.iter().map(|(k, _)| *k).collect();
        Err(miette::miette!(
            "Unknown config key '{}'. Valid keys: {}",
            key,
            keys.join(", ")
        ))
    }
}

fn global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn session_config_path(global: &GlobalOpts) -> Result<PathBuf> {
    Ok(open_session(global)?.config_path())
}

/// Read a config file as a YAML mapping; missing or empty files give an empty one
fn read_mapping(path: &std::path::Path) -> Result<serde_yml::Value> {
    if !path.exists() {
        return Ok(serde_yml::Value::Mapping(Default::default()));
    }

    let content = fs::read_to_string(path).into_diagnostic()?;
    let parsed: serde_yml::Value =
        serde_yml::from_str(&content).unwrap_or(serde_yml::Value::Mapping(Default::default()));
    if parsed.is_mapping() {
        Ok(parsed)
    } else {
        Ok(serde_yml::Value::Mapping(Default::default()))
    }
}

/// Value as configured (None when falling back to a default)
fn configured_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "title" => config.title.clone(),
        "month" => config.month.clone(),
        "year" => config.year.clone(),
        "export_dir" => config.export_dir.clone(),
        "repair_keyword" => config.repair_keyword.clone(),
        "refund_keyword" => config.refund_keyword.clone(),
        "default_format" => config.default_format.clone(),
        _ => None,
    }
}

/// Value actually used, with defaults applied
fn effective_value(config: &Config, key: &str) -> String {
    match key {
        "title" => config.title(),
        "month" => config.month(),
        "year" => config.year(),
        "repair_keyword" => config.status_keywords().repair,
        "refund_keyword" => config.status_keywords().refund,
        "default_format" => config.default_format.clone().unwrap_or_else(|| "auto".to_string()),
        other => configured_value(config, other).unwrap_or_default(),
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(default)").dim());
    }
}

fn exists_label(exists: bool) -> console::StyledObject<&'static str> {
    if exists {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    }
}

fn print_file(label: &str, path: &std::path::Path) -> Result<()> {
    println!("{} {}", style(label).bold(), style(path.display()).dim());
    println!();

    if path.exists() {
        let content = fs::read_to_string(path).into_diagnostic()?;
        print!("{}", content);
    } else {
        println!("{}", style("(not created)").dim());
    }
    Ok(())
}
