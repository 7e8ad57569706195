use clap::{Subcommand, ValueEnum};
use dropwatch_core::{Platform, SiteDirectory};

/// Sub-commands available under `sites`.
#[derive(Debug, Subcommand)]
pub enum SitesCommands {
    /// List known storefronts
    List {
        /// Only sites of this API family
        #[arg(long, value_enum)]
        platform: Option<PlatformArg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Catalog,
    Retail,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Catalog => Platform::Catalog,
            PlatformArg::Retail => Platform::RetailApi,
        }
    }
}

pub(crate) fn run_sites_list(platform: Option<PlatformArg>) {
    let directory = SiteDirectory::builtin();
    let sites = match platform {
        Some(p) => directory.by_platform(p.into()),
        None => directory.all().iter().collect(),
    };

    println!(
        "{:<18}{:<20}{:<12}{:<8}{:>9}  RESIDENTIAL  URL",
        "ID", "NAME", "PLATFORM", "REGION", "REQ/MIN"
    );
    for site in sites {
        println!(
            "{:<18}{:<20}{:<12}{:<8}{:>9}  {:<11}  {}",
            site.id,
            site.name,
            site.platform,
            site.region,
            site.rate_limit_per_minute,
            if site.requires_residential { "yes" } else { "no" },
            site.base_url
        );
    }
}
