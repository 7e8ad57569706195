mod run;
mod sites;
mod targets;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dropwatch_core::{AppConfig, TargetRegistry};
use tracing_subscriber::EnvFilter;

use crate::sites::SitesCommands;
use crate::targets::TargetsCommands;

#[derive(Debug, Parser)]
#[command(name = "dropwatch")]
#[command(about = "Restock and new-product monitor for sneaker storefronts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll every configured storefront until interrupted
    Run {
        /// Monitors file (overrides DROPWATCH_MONITORS_PATH)
        #[arg(long)]
        monitors: Option<PathBuf>,
        /// Seconds between stats summaries in the log (0 disables them)
        #[arg(long, default_value = "60")]
        stats_every: u64,
    },
    /// Inspect the curated target registry
    Targets {
        #[command(subcommand)]
        command: TargetsCommands,
    },
    /// Inspect the built-in site directory
    Sites {
        #[command(subcommand)]
        command: SitesCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = dropwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Run {
            monitors,
            stats_every,
        }) => {
            let monitors_path = monitors.unwrap_or_else(|| config.monitors_path.clone());
            run::run_monitor(&config, &monitors_path, stats_every).await?;
        }
        Some(Commands::Targets { command }) => match command {
            TargetsCommands::List { brand, priority } => {
                let registry = load_registry(&config)?;
                targets::run_targets_list(&registry, brand.as_deref(), priority);
            }
            TargetsCommands::Match { title } => {
                let registry = load_registry(&config)?;
                targets::run_targets_match(&registry, &title);
            }
            TargetsCommands::Export { output } => {
                let registry = load_registry(&config)?;
                targets::run_targets_export(&registry, output.as_deref())?;
            }
        },
        Some(Commands::Sites { command }) => match command {
            SitesCommands::List { platform } => sites::run_sites_list(platform),
        },
        None => {
            println!("nothing to do; try `dropwatch run` or `dropwatch --help`");
        }
    }

    Ok(())
}

/// The curated target registry: the configured import document when one is
/// set, otherwise the built-in seed targets.
fn load_registry(config: &AppConfig) -> anyhow::Result<TargetRegistry> {
    let mut registry = TargetRegistry::new();
    match &config.targets_path {
        Some(path) => {
            registry.load_from_path(path)?;
        }
        None => {
            registry.load_builtin();
        }
    }
    Ok(registry)
}
