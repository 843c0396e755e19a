// catalog-sync/src/commands/sync.rs
//
// USE CASE: Synchronize a metadata YAML into Data Catalog.

use std::path::PathBuf;

use anyhow::Context;
use catalog_sync_core::application::{SyncReport, sync_catalog};
use catalog_sync_core::infrastructure::adapters::DataCatalogClient;
use catalog_sync_core::infrastructure::config::{SyncConfig, load_metadata};
use catalog_sync_core::infrastructure::fs::write_json_atomic;

use super::summary;

pub async fn execute(metadata_file: PathBuf, report_json: Option<PathBuf>) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Configuration (environment) is checked before touching anything else
    let config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ ERROR: {}", e);
            std::process::exit(1);
        }
    };
    println!(
        "⚙️  Project: {} | Dataset: {} | Template location: {}",
        config.project_id, config.dataset_id, config.location
    );

    // B. Metadata file
    // Malformed input is rendered as a diagnostic (code + help) rather than a bare message
    let metadata = match load_metadata(&metadata_file) {
        Ok(metadata) => metadata,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(1);
        }
    };

    // C. Synchronize. No tables means no client, hence no credentials needed.
    let report = if metadata.tables.is_empty() {
        println!("📭 No tables defined in the metadata file.");
        SyncReport::start(0).finish()
    } else {
        let client = match &config.access_token {
            Some(token) => DataCatalogClient::with_access_token(&config.endpoint, token),
            None => DataCatalogClient::new(&config.endpoint).await,
        }
        .context("Failed to initialize the Data Catalog client")?;

        match sync_catalog(&client, &config, &metadata).await {
            Ok(report) => report,
            Err(e) => {
                eprintln!("\n💥 SYNCHRONIZATION ERROR: {}", e);
                std::process::exit(1);
            }
        }
    };

    if !report.outcomes.is_empty() {
        println!("\n{}", summary::render(&report));
    }

    if let Some(path) = report_json {
        write_json_atomic(&path, &report)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        println!("🧾 Report written to {}", path.display());
    }

    println!("\n✨ Done in {:.2?}", start.elapsed());
    Ok(())
}
