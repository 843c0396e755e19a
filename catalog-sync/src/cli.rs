// catalog-sync/src/cli.rs
//
// Single source of truth for the CLI definition (Clap structs).

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(
    about = "Synchronizes table descriptions and steward tags from a metadata YAML into Data Catalog",
    long_about = "Reads a metadata YAML (`tables:` list) and, for each BigQuery table, updates the \
                  Data Catalog entry description and attaches a steward/labels tag.\n\n\
                  Environment: GOOGLE_CLOUD_PROJECT (or PROJECT_ID), DATASET_ID, \
                  TAG_TEMPLATE_LOCATION (default: us)."
)]
#[command(version)]
pub struct Cli {
    /// Metadata description file (YAML with a top-level `tables` list)
    pub metadata_file: PathBuf,

    /// Also write the run report as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}
