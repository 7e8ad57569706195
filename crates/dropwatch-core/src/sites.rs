//! Static directory of known storefronts.
//!
//! Built once at process start and never mutated. Pollers read endpoint
//! shapes and rate budgets from here; the monitors file refers to retail
//! sites by id.

use serde::{Deserialize, Serialize};

/// API family a storefront belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Public `products.json` catalog feed.
    Catalog,
    /// Keyword-search JSON API shared by the four-site retail family.
    RetailApi,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Catalog => "catalog",
            Platform::RetailApi => "retail_api",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable storefront descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub platform: Platform,
    pub region: String,
    /// Path of the listing endpoint, relative to `base_url`.
    pub products_endpoint: String,
    /// Product page path with a `{key}` placeholder (handle or SKU).
    pub product_page_template: String,
    pub rate_limit_per_minute: u32,
    pub requires_residential: bool,
    /// Static API key sent as `x-api-key`; `Some` means the site needs it.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Site {
    /// Fills the product page template for `key` and joins it to the base URL.
    #[must_use]
    pub fn product_url(&self, key: &str) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.product_page_template.replace("{key}", key)
        )
    }

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Shared public key of the retail API family's web storefronts.
const RETAIL_API_KEY: &str = "m38t89Q3dKvBcupKQ6KJm4ByOHNIu2q3";

/// Default catalog stores and their poll interval in milliseconds.
const DEFAULT_CATALOG_STORES: &[(&str, u64)] = &[
    ("dtlr", 3000),
    ("shoe_palace", 3000),
    ("jimmy_jazz", 3000),
    ("hibbett", 3500),
    ("social_status", 4000),
    ("undefeated", 3500),
    ("concepts", 4000),
    ("bodega", 4000),
    ("extra_butter", 4000),
    ("feature", 4000),
];

/// Default retail sites when a fleet setup names none.
pub const DEFAULT_RETAIL_SITES: &[&str] = &["footlocker_us", "champs", "eastbay"];

/// Registry of [`Site`] descriptors in declaration order.
#[derive(Debug, Clone)]
pub struct SiteDirectory {
    sites: Vec<Site>,
}

impl SiteDirectory {
    /// The full built-in directory (catalog storefronts and the retail family).
    #[must_use]
    pub fn builtin() -> Self {
        let mut sites = vec![
            catalog("dtlr", "DTLR", "https://www.dtlr.com", 20),
            catalog("shoe_palace", "Shoe Palace", "https://www.shoepalace.com", 25),
            catalog("jimmy_jazz", "Jimmy Jazz", "https://www.jimmyjazz.com", 25),
            catalog("hibbett", "Hibbett", "https://www.hibbett.com", 20),
            catalog("city_gear", "City Gear", "https://www.citygear.com", 30),
            catalog("social_status", "Social Status", "https://www.socialstatuspgh.com", 30),
            catalog("undefeated", "Undefeated", "https://undefeated.com", 25),
            catalog("concepts", "Concepts", "https://cncpts.com", 25),
            catalog("bodega", "Bodega", "https://bdgastore.com", 30),
            catalog("a_ma_maniere", "A Ma Maniere", "https://www.a-ma-maniere.com", 25),
            catalog("notre", "Notre", "https://www.notre-shop.com", 30),
            catalog("extra_butter", "Extra Butter", "https://extrabutterny.com", 30),
            catalog(
                "lapstone_hammer",
                "Lapstone & Hammer",
                "https://www.lapstoneandhammer.com",
                30,
            ),
            catalog("feature", "Feature", "https://feature.com", 30),
            catalog("bait", "BAIT", "https://www.baitme.com", 25),
            catalog("sneaker_politics", "Sneaker Politics", "https://sneakerpolitics.com", 30),
            catalog("xhibition", "Xhibition", "https://www.xhibition.co", 30),
            catalog("sole_fly", "SoleFly", "https://www.solefly.com", 30),
            catalog("unknwn", "UNKNWN", "https://www.unknwn.com", 30),
            catalog("oneness", "Oneness", "https://www.onenessboutique.com", 35),
            catalog("wish_atl", "Wish ATL", "https://wishatl.com", 35),
            catalog("among_equals", "Among Equals", "https://amongequals.com", 35),
            Site {
                requires_residential: true,
                ..catalog("kith", "Kith", "https://kith.com", 20)
            },
        ];

        sites.extend([
            retail("footlocker_us", "Foot Locker US", "https://www.footlocker.com", "US", true),
            retail("footlocker_ca", "Foot Locker CA", "https://www.footlocker.ca", "CA", true),
            retail("champs", "Champs Sports", "https://www.champssports.com", "US", true),
            retail("eastbay", "Eastbay", "https://www.eastbay.com", "US", true),
            retail("footaction", "Footaction", "https://www.footaction.com", "US", true),
            retail(
                "kids_footlocker",
                "Kids Foot Locker",
                "https://www.kidsfootlocker.com",
                "US",
                false,
            ),
        ]);

        Self { sites }
    }

    /// Builds a directory from explicit sites (used by tests and embedders).
    #[must_use]
    pub fn from_sites(sites: Vec<Site>) -> Self {
        Self { sites }
    }

    /// Looks up a site by id. The query is lowercased and spaces or hyphens
    /// become `_` before comparison, so `"Shoe-Palace"` finds `shoe_palace`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Site> {
        let key = normalize_site_id(id);
        self.sites.iter().find(|s| s.id == key)
    }

    #[must_use]
    pub fn by_platform(&self, platform: Platform) -> Vec<&Site> {
        self.sites.iter().filter(|s| s.platform == platform).collect()
    }

    #[must_use]
    pub fn all(&self) -> &[Site] {
        &self.sites
    }

    /// Finds the site whose host matches `url`, ignoring a leading `www.`.
    #[must_use]
    pub fn find_by_url(&self, url: &str) -> Option<&Site> {
        let host = host_of(url)?;
        self.sites
            .iter()
            .find(|s| host_of(&s.base_url).is_some_and(|h| h == host))
    }

    /// The default catalog storefronts paired with their poll interval (ms).
    #[must_use]
    pub fn default_catalog_stores(&self) -> Vec<(&Site, u64)> {
        DEFAULT_CATALOG_STORES
            .iter()
            .filter_map(|(id, interval)| self.get(id).map(|site| (site, *interval)))
            .collect()
    }
}

fn normalize_site_id(id: &str) -> String {
    id.trim().to_lowercase().replace([' ', '-'], "_")
}

fn host_of(url: &str) -> Option<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest.split(['/', '?', '#', ':']).next()?.to_lowercase();
    let host = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);
    (!host.is_empty()).then_some(host)
}

fn catalog(id: &str, name: &str, url: &str, rate_limit_per_minute: u32) -> Site {
    Site {
        id: id.to_string(),
        name: name.to_string(),
        base_url: url.to_string(),
        platform: Platform::Catalog,
        region: "US".to_string(),
        products_endpoint: "/products.json".to_string(),
        product_page_template: "/products/{key}".to_string(),
        rate_limit_per_minute,
        requires_residential: false,
        api_key: None,
    }
}

fn retail(id: &str, name: &str, url: &str, region: &str, requires_residential: bool) -> Site {
    Site {
        id: id.to_string(),
        name: name.to_string(),
        base_url: url.to_string(),
        platform: Platform::RetailApi,
        region: region.to_string(),
        products_endpoint: "/api/products/search".to_string(),
        product_page_template: "/product/~/{key}.html".to_string(),
        rate_limit_per_minute: 15,
        requires_residential,
        api_key: Some(RETAIL_API_KEY.to_string()),
    }
}
