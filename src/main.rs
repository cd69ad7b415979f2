use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ledgerview::config::{default_config_path, validate_threshold, Config};
use ledgerview::journal::JsonlJournal;
use ledgerview::pricing::MemoryCommodityRegistry;
use ledgerview::report::commodity_list;
use ledgerview::series::Granularity;
use ledgerview::session::{Session, Settings};

#[derive(Parser)]
#[command(name = "ledgerview")]
#[command(about = "Running and aggregated balance series from a journal export")]
struct Cli {
    /// Path to config file (defaults to ./ledgerview.toml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Journal export (JSON lines)
    journal: PathBuf,

    #[command(flatten)]
    view: ViewArgs,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for the `[view]` config section.
#[derive(Args)]
struct ViewArgs {
    /// Account filter (case-insensitive regular expression)
    #[arg(long, global = true)]
    filter: Option<String>,

    /// Display commodity to value everything in
    #[arg(long, global = true)]
    commodity: Option<String>,

    /// Collapse all commodities into the display commodity
    #[arg(long, global = true)]
    merge: bool,

    /// Use effective (auxiliary) posting dates
    #[arg(long, global = true)]
    effective: bool,

    /// Deepest account level to show separately (0 = unlimited)
    #[arg(long, global = true)]
    depth: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Running totals per commodity
    Series,
    /// Running balance per account, valued in the display commodity
    Accounts,
    /// Per-period stacked breakdown of account activity
    Bars {
        /// daily, weekly, monthly or yearly
        #[arg(long)]
        granularity: Option<Granularity>,
    },
    /// Account totals bucketed into pie wedges
    Pie {
        /// Minimum share of the running total for a wedge of its own
        #[arg(long)]
        threshold: Option<Decimal>,

        /// Only include this account and its descendants
        #[arg(long)]
        account: Option<String>,
    },
    /// Commodities known after loading the journal
    Commodities,
    /// Show the effective configuration
    Config,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer).init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn settings(config: &Config, view: &ViewArgs) -> Settings {
    let mut settings = config.settings();
    if let Some(filter) = &view.filter {
        settings.filter = filter.clone();
    }
    if let Some(commodity) = &view.commodity {
        settings.display_commodity = Some(commodity.clone());
    }
    settings.merge |= view.merge;
    settings.effective_dates |= view.effective;
    if let Some(depth) = view.depth {
        settings.depth_limit = depth;
    }
    settings
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
    debug!(path = %config_path.display(), "config loaded");

    let mut settings = settings(&config, &cli.view);
    match &cli.command {
        Command::Bars {
            granularity: Some(granularity),
        } => settings.granularity = *granularity,
        Command::Pie {
            threshold,
            account,
        } => {
            if let Some(threshold) = threshold {
                validate_threshold(*threshold)?;
                settings.pie_threshold = *threshold;
            }
            if account.is_some() {
                settings.pie_account = account.clone();
            }
        }
        _ => {}
    }

    if let Command::Config = cli.command {
        println!("Config file: {}", config_path.display());
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let registry =
        Arc::new(MemoryCommodityRegistry::new().with_lookback_days(config.pricing.lookback_days));
    let journal = JsonlJournal::open(&cli.journal, &registry)
        .with_context(|| format!("Failed to open journal: {}", cli.journal.display()))?;

    let mut session = Session::new(Arc::new(journal), registry.clone())
        .with_settings(settings)
        .with_display(config.display.clone());
    session.reset().context("Failed to build balance series")?;

    match cli.command {
        Command::Series => print_json(&session.commodity_report()?),
        Command::Accounts => print_json(&session.account_report()?),
        Command::Bars { .. } => print_json(&session.periodic_report()?),
        Command::Pie { .. } => print_json(&session.pie_report()?),
        Command::Commodities => print_json(&commodity_list(registry.as_ref())),
        Command::Config => Ok(()),
    }
}
