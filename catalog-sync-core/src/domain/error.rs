// catalog-sync-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(catalog_sync::domain::config),
        help("Check GOOGLE_CLOUD_PROJECT / PROJECT_ID, DATASET_ID and TAG_TEMPLATE_LOCATION.")
    )]
    InvalidConfig(String),

    #[error("Tag template '{0}' reported as existing but could not be fetched")]
    #[diagnostic(
        code(catalog_sync::domain::template_vanished),
        help("The template was probably deleted concurrently. Re-run the synchronization.")
    )]
    TemplateVanished(String),
}
