// catalog-sync-core/src/infrastructure/config/metadata.rs

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, instrument};

use crate::domain::metadata::MetadataFile;
use crate::infrastructure::error::InfrastructureError;

/// Loads the metadata description file (`tables:` list).
///
/// A missing or malformed file is fatal. An empty document is read as "no tables".
#[instrument]
pub fn load_metadata(path: &Path) -> Result<MetadataFile, InfrastructureError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => InfrastructureError::MetadataNotFound(path.display().to_string()),
        _ => InfrastructureError::Io(e),
    })?;

    if content.trim().is_empty() {
        info!("Metadata file is empty");
        return Ok(MetadataFile::default());
    }

    let metadata: MetadataFile =
        serde_yaml::from_str(&content).map_err(|source| InfrastructureError::YamlError {
            path: path.display().to_string(),
            source,
        })?;

    info!(tables = metadata.tables.len(), "Metadata file loaded");
    Ok(metadata)
}
