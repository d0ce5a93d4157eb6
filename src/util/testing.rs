//! Shared test setup: logging and the reference ESG taxonomy.

use std::env;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{ItemId, ItemRecord, Metadata, Taxonomy, TaxonomyBuilder};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Only our own spans and events
    let module_filter = filter_fn(|metadata| metadata.target().starts_with("taxotree"));

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::ENTER)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

pub const ESG_LABEL: &str = "ESG Taxonomy";

/// (id, name, parent, grouping) in load order, parents first.
const ESG_ITEMS: [(i64, &str, Option<i64>, &str); 23] = [
    (1, "Environment", None, "E"),
    (2, "Air quality", Some(1), "E"),
    (3, "Air pollution", Some(2), "E"),
    (4, "Ozone layer", Some(2), "E"),
    (5, "Climate change", Some(1), "E"),
    (6, "Climate adaptation", Some(5), "E"),
    (7, "Carbon emissions", Some(5), "E"),
    (8, "Climate mitigation", Some(5), "E"),
    (9, "COP26", Some(5), "E"),
    (10, "Biodiversity", Some(1), "E"),
    (11, "Deforestation", Some(10), "E"),
    (12, "Habitat loss", Some(10), "E"),
    (13, "Social", None, "S"),
    (14, "Human capital", Some(13), "S"),
    (15, "Social impact", Some(14), "S"),
    (16, "Local employment", Some(14), "S"),
    (17, "Quality of life", Some(14), "S"),
    (18, "Health and safety", Some(14), "S"),
    (19, "Labour standards", Some(14), "S"),
    (20, "Stakeholder relations", Some(13), "S"),
    (21, "Community engagement", Some(20), "S"),
    (22, "Donations", Some(20), "S"),
    (23, "Impact investing", Some(20), "S"),
];

/// Records of the reference ESG taxonomy (23 items below the root).
///
/// Levels hold 1 / 2 / 5 / 16 items including the synthesized root; the
/// Environment subtree has 12 items.
pub fn esg_records() -> Vec<ItemRecord> {
    ESG_ITEMS
        .iter()
        .map(|&(id, name, parent, grouping)| {
            let children: Vec<ItemId> = ESG_ITEMS
                .iter()
                .filter(|(_, _, p, _)| *p == Some(id))
                .map(|(c, _, _, _)| ItemId(*c))
                .collect();
            let level = match parent {
                None => 1,
                Some(p) if ESG_ITEMS.iter().any(|(i, _, pp, _)| *i == p && pp.is_none()) => 2,
                Some(_) => 3,
            };
            ItemRecord {
                id: ItemId(id),
                name: name.to_string(),
                level,
                grouping: Some(grouping.to_string()),
                parent: parent.map(ItemId),
                weight: 1.0,
                score: 0.0,
                children: Some(children).filter(|c| !c.is_empty()),
                metadata: Metadata::new(),
            }
        })
        .collect()
}

/// The reference ESG taxonomy built under a root named `ESG Taxonomy`.
pub fn esg_taxonomy() -> Taxonomy {
    TaxonomyBuilder::new(ESG_LABEL, "1.0")
        .build(&esg_records())
        .unwrap_or_else(|e| panic!("reference taxonomy must build: {}", e))
}
