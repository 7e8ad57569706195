//! Read-only commands over the curated target registry.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use dropwatch_core::{CuratedTarget, Priority, TargetRegistry};

/// Sub-commands available under `targets`.
#[derive(Debug, Subcommand)]
pub enum TargetsCommands {
    /// List curated targets
    List {
        /// Only targets of this brand (case-insensitive)
        #[arg(long)]
        brand: Option<String>,
        /// Only targets of this tier (low, medium, high)
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Score a product title against every enabled target
    Match {
        /// Product title as a storefront would list it
        title: String,
    },
    /// Write the registry as a targets document
    Export {
        /// Destination file; prints to stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub(crate) fn run_targets_list(
    registry: &TargetRegistry,
    brand: Option<&str>,
    priority: Option<Priority>,
) {
    let mut targets: Vec<&CuratedTarget> = match brand {
        Some(brand) => registry.by_brand(brand),
        None => registry.iter().collect(),
    };
    if let Some(priority) = priority {
        targets.retain(|t| t.priority == priority);
    }

    if targets.is_empty() {
        println!("no curated targets found");
        return;
    }

    println!(
        "{:<42}{:<10}{:<10}{:>9}{:>9}{:>9}  ENABLED",
        "ID", "BRAND", "PRIORITY", "RETAIL", "MARKET", "PROFIT"
    );
    for t in &targets {
        println!(
            "{:<42}{:<10}{:<10}{:>9.2}{:>9.2}{:>9.2}  {}",
            truncate(&t.id, 40),
            t.brand,
            t.priority,
            t.retail_price,
            t.market_price,
            t.profit,
            if t.enabled { "yes" } else { "no" }
        );
    }

    let stats = registry.stats();
    println!(
        "\n{} shown; {} total, {} enabled, {} high priority, {} profitable",
        targets.len(),
        stats.total,
        stats.enabled,
        stats.high_priority,
        stats.profitable
    );
}

pub(crate) fn run_targets_match(registry: &TargetRegistry, title: &str) {
    let matches = registry.match_title(title);
    if matches.is_empty() {
        println!("no curated target matches \"{title}\"");
        return;
    }

    println!("{:<12}{:<10}NAME", "CONFIDENCE", "PRIORITY");
    for m in &matches {
        println!(
            "{:<12.2}{:<10}{}",
            m.confidence, m.target.priority, m.target.name
        );
    }
}

/// # Errors
///
/// Returns an error if the document cannot be serialized or written.
pub(crate) fn run_targets_export(
    registry: &TargetRegistry,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            registry.export_to_path(path)?;
            println!("exported {} targets to {}", registry.len(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&registry.export())?),
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max - 3).collect::<String>())
    } else {
        s.to_string()
    }
}
