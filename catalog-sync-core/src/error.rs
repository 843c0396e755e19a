// catalog-sync-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::{CatalogError, InfrastructureError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    // --- DOMAIN ERRORS (configuration rules, catalog invariants) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, Parsing, Remote catalog) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),
}

// Manual implementation to avoid a duplicate enum variant but keep `?` ergonomics
impl From<CatalogError> for SyncError {
    fn from(err: CatalogError) -> Self {
        SyncError::Infrastructure(InfrastructureError::Catalog(err))
    }
}
