// catalog-sync-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

/// Failures of the remote catalog that the synchronizer cannot recover from.
#[derive(Error, Debug, Diagnostic)]
pub enum CatalogError {
    #[error("HTTP transport error: {0}")]
    #[diagnostic(
        code(catalog_sync::infra::catalog::http),
        help("Check network connectivity to the Data Catalog endpoint.")
    )]
    Http(#[from] reqwest::Error),

    #[error("Authentication error: {0}")]
    #[diagnostic(
        code(catalog_sync::infra::catalog::auth),
        help("Run `gcloud auth application-default login` or set GOOGLE_APPLICATION_CREDENTIALS.")
    )]
    Auth(String),

    #[error("Data Catalog API error ({status}): {message}")]
    #[diagnostic(code(catalog_sync::infra::catalog::api))]
    Api { status: u16, message: String },

    #[error("Unexpected Data Catalog response: {0}")]
    #[diagnostic(code(catalog_sync::infra::catalog::decode))]
    Decode(String),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- REMOTE CATALOG ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(catalog_sync::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- METADATA FILE / YAML ---
    #[error("YAML Parsing Error in '{path}': {source}")]
    #[diagnostic(
        code(catalog_sync::infra::yaml),
        help("Check your YAML syntax (indentation, types). Expected a top-level `tables:` list.")
    )]
    YamlError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Metadata file not found at '{0}'")]
    #[diagnostic(code(catalog_sync::infra::metadata_missing))]
    MetadataNotFound(String),

    // --- ENVIRONMENT ---
    #[error("Missing environment configuration: {0}")]
    #[diagnostic(
        code(catalog_sync::infra::env),
        help("define the environment variables GOOGLE_CLOUD_PROJECT and DATASET_ID")
    )]
    MissingEnv(String),

    // --- REPORT ---
    #[error("JSON Serialization Error: {0}")]
    #[diagnostic(code(catalog_sync::infra::json))]
    Json(#[from] serde_json::Error),
}
