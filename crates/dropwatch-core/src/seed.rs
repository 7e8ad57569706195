//! Built-in curated targets loaded when no targets document is configured.

use crate::targets::{CuratedTarget, Priority};

/// Youth and infant sizing markers excluded from every seed target.
const YOUTH_EXCLUSIONS: &[&str] = &[
    "-kids",
    "-gs",
    "-ps",
    "-td",
    "-infant",
    "-toddler",
    "-preschool",
    "-gradeschool",
];

struct Seed {
    name: &'static str,
    brand: &'static str,
    keywords: [&'static str; 4],
    search: &'static str,
    retail: f64,
    market: f64,
    priority: Priority,
}

const SEEDS: &[Seed] = &[
    Seed {
        name: "Off-White x Nike Dunk Low Pine Green",
        brand: "nike",
        keywords: ["ow dunk pine green", "off white dunk", "virgil dunk", "off white pine green"],
        search: "off white dunk ow dunk pine green -kids -gs -ps -td -infant -toddler",
        retail: 100.0,
        market: 800.0,
        priority: Priority::High,
    },
    Seed {
        name: "Fragment x Jordan 1 High",
        brand: "jordan",
        keywords: ["fragment jordan 1", "fragment aj1", "frag jordan", "fragment design jordan"],
        search: "fragment jordan 1 fragment aj1 frag jordan -kids -gs -ps -td",
        retail: 170.0,
        market: 1200.0,
        priority: Priority::High,
    },
    Seed {
        name: "Travis Scott Jordan 1 Low Mocha",
        brand: "jordan",
        keywords: [
            "travis mocha",
            "cactus jack mocha",
            "travis scott jordan 1 low",
            "ts jordan 1 mocha",
        ],
        search: "travis scott jordan 1 low ts jordan 1 mocha travis mocha -kids -gs",
        retail: 150.0,
        market: 650.0,
        priority: Priority::High,
    },
    Seed {
        name: "Jordan 4 Retro Black Cat",
        brand: "jordan",
        keywords: ["jordan 4 black cat", "aj4 black", "black cat 4", "jordan iv black cat"],
        search: "jordan 4 black cat aj4 black jordan iv black cat -kids -gs -ps",
        retail: 130.0,
        market: 280.0,
        priority: Priority::High,
    },
    Seed {
        name: "Jordan 1 Retro High Chicago Lost and Found",
        brand: "jordan",
        keywords: ["aj1 chicago", "chicago lost found", "chicago 1s", "jordan 1 chicago"],
        search: "jordan 1 chicago aj1 chicago chicago lost found -kids -gs -ps",
        retail: 170.0,
        market: 350.0,
        priority: Priority::High,
    },
    Seed {
        name: "Nike Dunk Low Panda",
        brand: "nike",
        keywords: ["dunk low panda", "panda dunk", "black white dunk", "dunk panda"],
        search: "dunk low panda panda dunk black white dunk -kids -gs -ps -td",
        retail: 100.0,
        market: 180.0,
        priority: Priority::Medium,
    },
    Seed {
        name: "Jordan 11 Retro Bred",
        brand: "jordan",
        keywords: ["bred 11", "aj11 bred", "jordan 11 bred", "jordan xi bred"],
        search: "jordan 11 bred aj11 bred bred 11 -kids -gs -ps -td",
        retail: 220.0,
        market: 420.0,
        priority: Priority::Medium,
    },
    Seed {
        name: "New Balance 550 White Grey",
        brand: "new balance",
        keywords: ["nb 550", "new balance 550", "550 white grey", "nb550"],
        search: "new balance 550 nb 550 550 white grey -kids -gs -ps",
        retail: 110.0,
        market: 180.0,
        priority: Priority::Medium,
    },
    Seed {
        name: "Yeezy Boost 350 V2 Onyx",
        brand: "yeezy",
        keywords: ["yeezy 350 onyx", "yeezy onyx", "350 v2 onyx", "boost 350 onyx"],
        search: "yeezy 350 onyx yeezy onyx 350 v2 onyx -kids -gs -ps",
        retail: 230.0,
        market: 280.0,
        priority: Priority::Medium,
    },
    Seed {
        name: "Jordan 4 Retro Military Blue",
        brand: "jordan",
        keywords: [
            "jordan 4 military blue",
            "aj4 military",
            "military blue 4",
            "jordan iv military",
        ],
        search: "jordan 4 military blue aj4 military military blue 4 -kids -gs",
        retail: 200.0,
        market: 300.0,
        priority: Priority::Medium,
    },
];

/// The seed list: five high-priority and five medium-priority sneakers.
#[must_use]
pub fn builtin_targets() -> Vec<CuratedTarget> {
    SEEDS
        .iter()
        .map(|seed| {
            let mut target = CuratedTarget::new(
                seed.name,
                seed.brand,
                seed.keywords.iter().map(|k| (*k).to_string()).collect(),
                YOUTH_EXCLUSIONS.iter().map(|k| (*k).to_string()).collect(),
                seed.retail,
                seed.market,
                seed.priority,
            );
            target.search_string = seed.search.to_string();
            target.source = "builtin".to_string();
            target
        })
        .collect()
}
