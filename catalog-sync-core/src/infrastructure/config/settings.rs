// catalog-sync-core/src/infrastructure/config/settings.rs

use regex::Regex;
use tracing::{debug, instrument};
use validator::{Validate, ValidationError};

use crate::domain::catalog::{DEFAULT_TEMPLATE_ID, bigquery_linked_resource, template_name};
use crate::domain::error::DomainError;
use crate::error::SyncError;
use crate::infrastructure::error::InfrastructureError;

pub const PROJECT_ENV_VARS: [&str; 2] = ["GOOGLE_CLOUD_PROJECT", "PROJECT_ID"];
pub const DATASET_ENV_VAR: &str = "DATASET_ID";
pub const LOCATION_ENV_VAR: &str = "TAG_TEMPLATE_LOCATION";
pub const ENDPOINT_ENV_VAR: &str = "DATACATALOG_ENDPOINT";
pub const ACCESS_TOKEN_ENV_VAR: &str = "DATACATALOG_ACCESS_TOKEN";

pub const DEFAULT_LOCATION: &str = "us";
pub const DEFAULT_ENDPOINT: &str = "https://datacatalog.googleapis.com/v1";

// Data Catalog tag template ids: lowercase letters, digits and underscores, 64 chars max.
const TEMPLATE_ID_PATTERN: &str = r"^[a-z_][a-z0-9_]{0,63}$";

/// Run configuration, resolved once at start-up and passed by reference.
#[derive(Clone, PartialEq, Eq, Validate)]
pub struct SyncConfig {
    #[validate(length(min = 1, message = "project id cannot be empty"))]
    pub project_id: String,

    #[validate(length(min = 1, message = "dataset id cannot be empty"))]
    pub dataset_id: String,

    #[validate(length(min = 1, message = "tag template location cannot be empty"))]
    pub location: String,

    #[validate(custom(function = "validate_template_id"))]
    pub template_id: String,

    #[validate(length(min = 1, message = "endpoint cannot be empty"))]
    pub endpoint: String,

    /// Static bearer token (emulators, proxies). When unset, credentials are discovered.
    pub access_token: Option<String>,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("project_id", &self.project_id)
            .field("dataset_id", &self.dataset_id)
            .field("location", &self.location)
            .field("template_id", &self.template_id)
            .field("endpoint", &self.endpoint)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SyncConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. Empty values count as unset.
    #[instrument(skip(lookup))]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let project_id = PROJECT_ENV_VARS.iter().find_map(|key| get(*key));
        let dataset_id = get(DATASET_ENV_VAR);

        let (Some(project_id), Some(dataset_id)) = (project_id, dataset_id) else {
            return Err(InfrastructureError::MissingEnv(
                "define the environment variables GOOGLE_CLOUD_PROJECT and DATASET_ID".into(),
            )
            .into());
        };

        let config = Self {
            project_id,
            dataset_id,
            location: get(LOCATION_ENV_VAR).unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            template_id: DEFAULT_TEMPLATE_ID.to_string(),
            endpoint: get(ENDPOINT_ENV_VAR)
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            access_token: get(ACCESS_TOKEN_ENV_VAR).map(|t| t.trim().to_string()),
        };

        config
            .validate()
            .map_err(|e| DomainError::InvalidConfig(e.to_string()))?;

        debug!(
            project = %config.project_id,
            dataset = %config.dataset_id,
            location = %config.location,
            static_token = config.access_token.is_some(),
            "Configuration resolved"
        );
        Ok(config)
    }

    pub fn template_name(&self) -> String {
        template_name(&self.project_id, &self.location, &self.template_id)
    }

    pub fn linked_resource(&self, table_id: &str) -> String {
        bigquery_linked_resource(&self.project_id, &self.dataset_id, table_id)
    }
}

fn validate_template_id(value: &str) -> Result<(), ValidationError> {
    let pattern = Regex::new(TEMPLATE_ID_PATTERN).map_err(|_| ValidationError::new("regex"))?;
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("template_id")
            .with_message("must match ^[a-z_][a-z0-9_]{0,63}$".into()))
    }
}
