//! Development Table Dump
//!
//! Seeds an in-memory store from a JSON fixture, opens one category as a
//! table and prints its columns and rendered rows. Useful for checking field
//! declarations and title derivation without a host store.
//!
//! # Usage
//!
//! ```bash
//! # Default fixture, first discovered category
//! cargo run --bin dev-table
//!
//! # Specific fixture and category
//! DOCGRID_FIXTURE=fixtures/library.json DOCGRID_CATEGORY=Book cargo run --bin dev-table
//! ```
//!
//! # Environment Variables
//!
//! - `DOCGRID_FIXTURE`: fixture path (default: `fixtures/library.json` in this package)
//! - `DOCGRID_CATEGORY`: category to open (default: first discovered)
//! - `DOCGRID_CONFIG`: `BindingConfig` JSON file (default: built-in conventions)
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")
//!
//! # Fixture format
//!
//! ```json
//! { "pages": [ { "name": "Book", "blocks": ["Dune\nis:: [[Book]]"] } ] }
//! ```
//!
//! Blocks are appended in order, so the first block of a page made only of
//! property lines becomes its configuration record.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use docgrid_core::services::{CategoryCatalog, TableView};
use docgrid_core::{BindingConfig, DocumentStore, MemoryStore, RowTarget};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Fixture {
    pages: Vec<FixturePage>,
}

#[derive(Debug, Deserialize)]
struct FixturePage {
    name: String,
    blocks: Vec<String>,
}

async fn seed(store: &MemoryStore, fixture: &Fixture) -> anyhow::Result<usize> {
    let mut count = 0;
    for page in &fixture.pages {
        for block in &page.blocks {
            store.append_document(&page.name, block).await?;
            count += 1;
        }
    }
    Ok(count)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let fixture_path = env::var("DOCGRID_FIXTURE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("fixtures")
                .join("library.json")
        });

    let config = match env::var("DOCGRID_CONFIG") {
        Ok(path) => BindingConfig::load(&PathBuf::from(path))?,
        Err(_) => BindingConfig::default(),
    };
    let config = Arc::new(config);

    tracing::info!("Fixture: {}", fixture_path.display());
    let raw = tokio::fs::read_to_string(&fixture_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", fixture_path.display(), e))?;
    let fixture: Fixture = serde_json::from_str(&raw)?;

    let memory = Arc::new(MemoryStore::new());
    let seeded = seed(&memory, &fixture).await?;
    tracing::info!("Seeded {} documents", seeded);

    let store: Arc<dyn DocumentStore> = memory;
    let catalog = CategoryCatalog::discover(&store, &config).await?;
    tracing::info!("Categories: {}", catalog.categories().join(", "));

    let category = match env::var("DOCGRID_CATEGORY") {
        Ok(category) => category,
        Err(_) => catalog
            .default_category()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Fixture has no categorized documents"))?,
    };

    let view = TableView::open(Arc::clone(&store), Arc::clone(&config), &category).await?;

    let visible: Vec<_> = view.columns().iter().filter(|c| !c.hidden).collect();
    println!("# {} ({} rows)", view.category(), view.rows().len());
    println!();
    for column in &visible {
        println!(
            "  {:<16} {:<14} {}",
            column.header_name,
            format!("{:?}", column.renderer),
            serde_json::to_string(&column.editor)?
        );
    }
    println!();

    for row in view.rows() {
        let target = RowTarget::bound(row.document_id());
        let mut cells = Vec::with_capacity(visible.len());
        for column in &visible {
            let cell = view.render_cell(&target, &column.field).await?;
            cells.push(format!("{}={}", column.field, serde_json::to_string(&cell)?));
        }
        println!("- {}", cells.join("  "));
    }

    Ok(())
}
