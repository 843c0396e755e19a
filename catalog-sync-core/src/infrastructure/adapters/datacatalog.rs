// catalog-sync-core/src/infrastructure/adapters/datacatalog.rs

//! Google Cloud Data Catalog adapter (REST v1).
//!
//! Authentication goes through a [`gcp_auth::TokenProvider`] (by default the one
//! [`gcp_auth::provider`] discovers: service account file, metadata server or
//! gcloud user credentials), or through a static bearer token for emulators.
//! HTTP 404 and 409 are mapped to [`Lookup::NotFound`] and
//! [`Creation::AlreadyExists`]; every other non-2xx status becomes a
//! [`CatalogError::Api`].

use async_trait::async_trait;
use gcp_auth::TokenProvider;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::catalog::{Entry, PrimitiveType, Tag, TagTemplate, TemplateField};
use crate::infrastructure::error::CatalogError;
use crate::ports::catalog::{CatalogClient, Creation, Lookup};

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const LIST_TAGS_PAGE_SIZE: &str = "100";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

enum Credentials {
    Provider(Arc<dyn TokenProvider>),
    AccessToken(String),
}

pub struct DataCatalogClient {
    endpoint: String,
    credentials: Credentials,
    client: reqwest::Client,
}

// Manual Debug implementation since TokenProvider doesn't implement Debug
impl std::fmt::Debug for DataCatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let credentials = match self.credentials {
            Credentials::Provider(_) => "<TokenProvider>",
            Credentials::AccessToken(_) => "<static access token>",
        };
        f.debug_struct("DataCatalogClient")
            .field("endpoint", &self.endpoint)
            .field("credentials", &credentials)
            .field("client", &self.client)
            .finish()
    }
}

/// How a response status is treated before any operation looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    Success,
    NotFound,
    Conflict,
    Failure,
}

fn classify(status: StatusCode) -> StatusClass {
    if status.is_success() {
        return StatusClass::Success;
    }
    match status {
        StatusCode::NOT_FOUND => StatusClass::NotFound,
        StatusCode::CONFLICT => StatusClass::Conflict,
        _ => StatusClass::Failure,
    }
}

/// Outcome of a single HTTP exchange, before it is interpreted per operation.
#[derive(Debug)]
enum Reply<R> {
    Success(R),
    NotFound,
    Conflict,
}

impl<R> Reply<R> {
    /// Reads: 404 is an outcome, 409 makes no sense.
    fn into_lookup(self, resource: &str) -> Result<Lookup<R>, CatalogError> {
        match self {
            Reply::Success(body) => Ok(Lookup::Found(body)),
            Reply::NotFound => Ok(Lookup::NotFound),
            Reply::Conflict => Err(CatalogError::Decode(format!(
                "Unexpected 409 while reading {resource}"
            ))),
        }
    }

    /// Creations: 409 is an outcome, 404 means the parent is gone.
    fn into_creation(self, parent: &str) -> Result<Creation<R>, CatalogError> {
        match self {
            Reply::Success(body) => Ok(Creation::Created(body)),
            Reply::Conflict => Ok(Creation::AlreadyExists),
            Reply::NotFound => Err(CatalogError::Api {
                status: StatusCode::NOT_FOUND.as_u16(),
                message: format!("Parent {parent} not found"),
            }),
        }
    }

    /// For operations where 404/409 are not expected outcomes.
    fn into_success(self, resource: &str) -> Result<R, CatalogError> {
        match self {
            Reply::Success(body) => Ok(body),
            Reply::NotFound => Err(CatalogError::Api {
                status: StatusCode::NOT_FOUND.as_u16(),
                message: format!("{resource} not found"),
            }),
            Reply::Conflict => Err(CatalogError::Api {
                status: StatusCode::CONFLICT.as_u16(),
                message: format!("{resource} already exists"),
            }),
        }
    }
}

impl DataCatalogClient {
    /// Creates a client against `endpoint` (e.g. `https://datacatalog.googleapis.com/v1`)
    /// with credentials discovered from the environment.
    pub async fn new(endpoint: &str) -> Result<Self, CatalogError> {
        let token_provider = gcp_auth::provider()
            .await
            .map_err(|e| CatalogError::Auth(format!("Failed to initialize GCP auth: {e}")))?;
        Self::with_token_provider(endpoint, token_provider)
    }

    pub fn with_token_provider(
        endpoint: &str,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Result<Self, CatalogError> {
        Self::build(endpoint, Credentials::Provider(token_provider))
    }

    /// Sends `access_token` as is on every request. No refresh.
    pub fn with_access_token(endpoint: &str, access_token: &str) -> Result<Self, CatalogError> {
        Self::build(endpoint, Credentials::AccessToken(access_token.to_string()))
    }

    fn build(endpoint: &str, credentials: Credentials) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::from_parts(endpoint, credentials, client))
    }

    fn from_parts(endpoint: &str, credentials: Credentials, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credentials,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    async fn access_token(&self) -> Result<String, CatalogError> {
        match &self.credentials {
            Credentials::AccessToken(token) => Ok(token.clone()),
            Credentials::Provider(provider) => {
                let token = provider
                    .token(&[CLOUD_PLATFORM_SCOPE])
                    .await
                    .map_err(|e| {
                        CatalogError::Auth(format!("Failed to get GCP access token: {e}"))
                    })?;
                Ok(token.as_str().to_string())
            }
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Reply<Response>, CatalogError> {
        let access_token = self.access_token().await?;
        let response = request.bearer_auth(&access_token).send().await?;

        let status = response.status();
        match classify(status) {
            StatusClass::Success => Ok(Reply::Success(response)),
            StatusClass::NotFound => Ok(Reply::NotFound),
            StatusClass::Conflict => Ok(Reply::Conflict),
            StatusClass::Failure => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                Err(api_error(status, &body))
            }
        }
    }

    async fn fetch_tag_page(
        &self,
        parent: &str,
        page_token: Option<String>,
    ) -> Result<ListTagsResponse, CatalogError> {
        debug!(parent = %parent, page = ?page_token, "List tags");
        let mut request = self
            .client
            .get(self.url(&format!("{parent}/tags")))
            .query(&[("pageSize", LIST_TAGS_PAGE_SIZE)]);
        if let Some(token) = &page_token {
            request = request.query(&[("pageToken", token.as_str())]);
        }

        let response = self.send(request).await?.into_success(parent)?;
        decode(response).await
    }
}

async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, CatalogError> {
    response
        .json::<T>()
        .await
        .map_err(|e| CatalogError::Decode(e.to_string()))
}

/// Follows `nextPageToken` until a page comes back without one (absent or empty).
async fn collect_tag_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<Tag>, CatalogError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ListTagsResponse, CatalogError>>,
{
    let mut tags = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch_page(page_token.take()).await?;
        tags.extend(page.tags.into_iter().map(Tag::from));

        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(next) => page_token = Some(next),
            None => return Ok(tags),
        }
    }
}

#[async_trait]
impl CatalogClient for DataCatalogClient {
    async fn get_template(&self, name: &str) -> Result<Lookup<TagTemplate>, CatalogError> {
        debug!(template = %name, "GET tag template");
        let request = self.client.get(self.url(name));

        match self.send(request).await?.into_lookup(name)? {
            Lookup::Found(response) => {
                let dto: TagTemplateDto = decode(response).await?;
                Ok(Lookup::Found(dto.into()))
            }
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    async fn create_template(
        &self,
        parent: &str,
        template_id: &str,
        template: &TagTemplate,
    ) -> Result<Creation<TagTemplate>, CatalogError> {
        debug!(parent = %parent, template_id = %template_id, "POST tag template");
        let request = self
            .client
            .post(self.url(&format!("{parent}/tagTemplates")))
            .query(&[("tagTemplateId", template_id)])
            .json(&TagTemplateDto::from(template));

        match self.send(request).await?.into_creation(parent)? {
            Creation::Created(response) => {
                let dto: TagTemplateDto = decode(response).await?;
                Ok(Creation::Created(dto.into()))
            }
            Creation::AlreadyExists => Ok(Creation::AlreadyExists),
        }
    }

    async fn lookup_entry(&self, linked_resource: &str) -> Result<Lookup<Entry>, CatalogError> {
        debug!(linked_resource = %linked_resource, "Lookup entry");
        let request = self
            .client
            .get(self.url("entries:lookup"))
            .query(&[("linkedResource", linked_resource)]);

        match self.send(request).await?.into_lookup(linked_resource)? {
            Lookup::Found(response) => {
                let dto: EntryDto = decode(response).await?;
                Ok(Lookup::Found(dto.into()))
            }
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    async fn update_entry(
        &self,
        entry: &Entry,
        field_mask: &[&str],
    ) -> Result<Entry, CatalogError> {
        debug!(entry = %entry.name, mask = ?field_mask, "PATCH entry");
        let body = EntryDto {
            name: entry.name.clone(),
            linked_resource: None,
            description: entry.description.clone(),
        };
        let request = self
            .client
            .patch(self.url(&entry.name))
            .query(&[("updateMask", field_mask.join(","))])
            .json(&body);

        let response = self.send(request).await?.into_success(&entry.name)?;
        let dto: EntryDto = decode(response).await?;
        Ok(dto.into())
    }

    async fn list_tags(&self, parent: &str) -> Result<Vec<Tag>, CatalogError> {
        collect_tag_pages(move |page_token| self.fetch_tag_page(parent, page_token)).await
    }

    async fn create_tag(&self, parent: &str, tag: &Tag) -> Result<Tag, CatalogError> {
        debug!(parent = %parent, template = %tag.template, "POST tag");
        let request = self
            .client
            .post(self.url(&format!("{parent}/tags")))
            .json(&TagDto::from(tag));

        let response = self.send(request).await?.into_success(parent)?;
        let dto: TagDto = decode(response).await?;
        Ok(dto.into())
    }
}

// --- ERROR ENVELOPE ---

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
    #[serde(default)]
    status: String,
}

fn api_error(status: StatusCode, body: &str) -> CatalogError {
    let message = match serde_json::from_str::<GoogleErrorResponse>(body) {
        Ok(envelope) if envelope.error.status.is_empty() => envelope.error.message,
        Ok(envelope) => format!("{} ({})", envelope.error.message, envelope.error.status),
        Err(_) => body.to_string(),
    };

    CatalogError::Api {
        status: status.as_u16(),
        message,
    }
}

// --- WIRE FORMAT (DTOs) ---

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TagTemplateDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    fields: BTreeMap<String, TemplateFieldDto>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TemplateFieldDto {
    #[serde(default)]
    display_name: String,
    #[serde(rename = "type", default)]
    field_type: FieldTypeDto,
    #[serde(default)]
    is_required: bool,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FieldTypeDto {
    // Enum-typed fields carry `enumType` instead; those decode as Unspecified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    primitive_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryDto {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    linked_resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    template: String,
    #[serde(default)]
    fields: BTreeMap<String, TagFieldDto>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TagFieldDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ListTagsResponse {
    #[serde(default)]
    tags: Vec<TagDto>,
    #[serde(default)]
    next_page_token: Option<String>,
}

fn primitive_to_wire(primitive: PrimitiveType) -> Option<String> {
    let wire = match primitive {
        PrimitiveType::String => "STRING",
        PrimitiveType::Double => "DOUBLE",
        PrimitiveType::Bool => "BOOL",
        PrimitiveType::Timestamp => "TIMESTAMP",
        PrimitiveType::Richtext => "RICHTEXT",
        PrimitiveType::Unspecified => return None,
    };
    Some(wire.to_string())
}

fn primitive_from_wire(wire: Option<&str>) -> PrimitiveType {
    match wire {
        Some("STRING") => PrimitiveType::String,
        Some("DOUBLE") => PrimitiveType::Double,
        Some("BOOL") => PrimitiveType::Bool,
        Some("TIMESTAMP") => PrimitiveType::Timestamp,
        Some("RICHTEXT") => PrimitiveType::Richtext,
        _ => PrimitiveType::Unspecified,
    }
}

impl From<&TagTemplate> for TagTemplateDto {
    fn from(template: &TagTemplate) -> Self {
        Self {
            name: template.name.clone(),
            display_name: template.display_name.clone(),
            fields: template
                .fields
                .iter()
                .map(|(id, field)| {
                    let dto = TemplateFieldDto {
                        display_name: field.display_name.clone(),
                        field_type: FieldTypeDto {
                            primitive_type: primitive_to_wire(field.primitive_type),
                        },
                        is_required: field.is_required,
                    };
                    (id.clone(), dto)
                })
                .collect(),
        }
    }
}

impl From<TagTemplateDto> for TagTemplate {
    fn from(dto: TagTemplateDto) -> Self {
        Self {
            name: dto.name,
            display_name: dto.display_name,
            fields: dto
                .fields
                .into_iter()
                .map(|(id, field)| {
                    let field = TemplateField {
                        display_name: field.display_name,
                        primitive_type: primitive_from_wire(
                            field.field_type.primitive_type.as_deref(),
                        ),
                        is_required: field.is_required,
                    };
                    (id, field)
                })
                .collect(),
        }
    }
}

impl From<EntryDto> for Entry {
    fn from(dto: EntryDto) -> Self {
        Self {
            name: dto.name,
            linked_resource: dto.linked_resource,
            description: dto.description,
        }
    }
}

impl From<&Tag> for TagDto {
    fn from(tag: &Tag) -> Self {
        Self {
            name: tag.name.clone(),
            template: tag.template.clone(),
            fields: tag
                .fields
                .iter()
                .map(|(id, value)| {
                    let field = TagFieldDto {
                        string_value: Some(value.clone()),
                    };
                    (id.clone(), field)
                })
                .collect(),
        }
    }
}

impl From<TagDto> for Tag {
    fn from(dto: TagDto) -> Self {
        Self {
            name: dto.name,
            template: dto.template,
            fields: dto
                .fields
                .into_iter()
                .filter_map(|(id, field)| field.string_value.map(|v| (id, v)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use serde_json::json;
    use std::collections::VecDeque;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    #[test]
    fn test_template_wire_format() -> Result<()> {
        let dto = TagTemplateDto::from(&TagTemplate::steward_and_labels());
        let value = serde_json::to_value(&dto)?;

        assert_eq!(
            value,
            json!({
                "displayName": "Deacero metadata",
                "fields": {
                    "data_steward": {
                        "displayName": "Data steward",
                        "type": { "primitiveType": "STRING" },
                        "isRequired": false
                    },
                    "labels": {
                        "displayName": "Labels (comma-separated)",
                        "type": { "primitiveType": "STRING" },
                        "isRequired": false
                    }
                }
            })
        );
        Ok(())
    }

    #[test]
    fn test_tag_wire_format() -> Result<()> {
        let tag = Tag::steward_and_labels(
            "projects/p/locations/us/tagTemplates/deacero_metadata",
            "alice",
            &["finance", "pii"],
        );
        let value = serde_json::to_value(TagDto::from(&tag))?;

        assert_eq!(
            value,
            json!({
                "template": "projects/p/locations/us/tagTemplates/deacero_metadata",
                "fields": {
                    "data_steward": { "stringValue": "alice" },
                    "labels": { "stringValue": "finance, pii" }
                }
            })
        );
        Ok(())
    }

    #[test]
    fn test_decode_tag_page_ignores_non_string_fields() -> Result<()> {
        let body = json!({
            "tags": [{
                "name": "projects/p/locations/us/entryGroups/@bigquery/entries/e/tags/t1",
                "template": "projects/p/locations/us/tagTemplates/other",
                "fields": {
                    "score": { "doubleValue": 0.5 },
                    "owner": { "stringValue": "bob" }
                }
            }],
            "nextPageToken": "abc"
        });
        let page: ListTagsResponse = serde_json::from_value(body)?;
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));

        let tags: Vec<Tag> = page.tags.into_iter().map(Tag::from).collect();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].field("owner"), Some("bob"));
        assert_eq!(tags[0].field("score"), None);
        Ok(())
    }

    #[test]
    fn test_decode_empty_tag_page() -> Result<()> {
        let page: ListTagsResponse = serde_json::from_str("{}")?;
        assert!(page.tags.is_empty());
        assert!(page.next_page_token.is_none());
        Ok(())
    }

    #[test]
    fn test_decode_entry() -> Result<()> {
        let dto: EntryDto = serde_json::from_value(json!({
            "name": "projects/p/locations/us/entryGroups/@bigquery/entries/abc",
            "linkedResource": "//bigquery.googleapis.com/projects/p/datasets/d/tables/orders",
            "type": "TABLE"
        }))?;
        let entry = Entry::from(dto);
        assert_eq!(
            entry.linked_resource.as_deref(),
            Some("//bigquery.googleapis.com/projects/p/datasets/d/tables/orders")
        );
        assert!(entry.description.is_none());
        Ok(())
    }

    #[test]
    fn test_decode_template_with_enum_field() -> Result<()> {
        let dto: TagTemplateDto = serde_json::from_value(json!({
            "name": "projects/p/locations/us/tagTemplates/t",
            "fields": {
                "tier": {
                    "displayName": "Tier",
                    "type": { "enumType": { "allowedValues": [{ "displayName": "gold" }] } }
                }
            }
        }))?;
        let template = TagTemplate::from(dto);
        assert_eq!(
            template.fields["tier"].primitive_type,
            PrimitiveType::Unspecified
        );
        Ok(())
    }

    #[test]
    fn test_api_error_parses_google_envelope() -> Result<()> {
        let body = r#"{"error":{"code":403,"message":"Permission denied","status":"PERMISSION_DENIED"}}"#;
        match api_error(StatusCode::FORBIDDEN, body) {
            CatalogError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Permission denied (PERMISSION_DENIED)");
                Ok(())
            }
            other => bail!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_api_error_keeps_raw_body() -> Result<()> {
        match api_error(StatusCode::BAD_GATEWAY, "upstream timeout") {
            CatalogError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream timeout");
                Ok(())
            }
            other => bail!("Expected Api error, got {:?}", other),
        }
    }

    // --- STATUS HANDLING ---

    #[test]
    fn test_classify_statuses() {
        assert_eq!(classify(StatusCode::OK), StatusClass::Success);
        assert_eq!(classify(StatusCode::NO_CONTENT), StatusClass::Success);
        assert_eq!(classify(StatusCode::NOT_FOUND), StatusClass::NotFound);
        assert_eq!(classify(StatusCode::CONFLICT), StatusClass::Conflict);
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::MOVED_PERMANENTLY,
        ] {
            assert_eq!(classify(status), StatusClass::Failure, "{status}");
        }
    }

    #[test]
    fn test_reads_map_404_to_not_found_and_reject_409() -> Result<()> {
        assert!(matches!(Reply::Success(7u8).into_lookup("r")?, Lookup::Found(7)));
        assert!(matches!(
            Reply::<u8>::NotFound.into_lookup("r")?,
            Lookup::NotFound
        ));

        match Reply::<u8>::Conflict.into_lookup("projects/p/locations/us/tagTemplates/t") {
            Err(CatalogError::Decode(message)) => {
                assert!(message.contains("409"));
                assert!(message.contains("tagTemplates/t"));
                Ok(())
            }
            other => bail!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_creations_map_409_to_already_exists_and_404_to_api_error() -> Result<()> {
        assert!(matches!(
            Reply::Success(1u8).into_creation("projects/p/locations/us")?,
            Creation::Created(1)
        ));
        assert!(matches!(
            Reply::<u8>::Conflict.into_creation("projects/p/locations/us")?,
            Creation::AlreadyExists
        ));

        match Reply::<u8>::NotFound.into_creation("projects/p/locations/us") {
            Err(CatalogError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Parent projects/p/locations/us not found");
                Ok(())
            }
            other => bail!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_writes_turn_404_and_409_into_api_errors() -> Result<()> {
        assert_eq!(Reply::Success(3u8).into_success("entry")?, 3);

        match Reply::<u8>::NotFound.into_success("entries/e") {
            Err(CatalogError::Api { status: 404, message }) => {
                assert_eq!(message, "entries/e not found")
            }
            other => bail!("Expected Api 404, got {:?}", other),
        }
        match Reply::<u8>::Conflict.into_success("entries/e/tags") {
            Err(CatalogError::Api { status: 409, message }) => {
                assert_eq!(message, "entries/e/tags already exists")
            }
            other => bail!("Expected Api 409, got {:?}", other),
        }
        Ok(())
    }

    // --- PAGINATION ---

    fn page(templates: &[&str], next_page_token: Option<&str>) -> ListTagsResponse {
        ListTagsResponse {
            tags: templates
                .iter()
                .map(|template| TagDto {
                    name: None,
                    template: template.to_string(),
                    fields: BTreeMap::new(),
                })
                .collect(),
            next_page_token: next_page_token.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_collect_tag_pages_follows_tokens_until_absent() -> Result<()> {
        let mut pages = VecDeque::from(vec![
            page(&["a"], Some("p2")),
            page(&["b", "c"], Some("p3")),
            page(&["d"], None),
        ]);
        let mut requested = Vec::new();

        let tags = collect_tag_pages(|token| {
            requested.push(token);
            let next = pages.pop_front();
            async move { next.ok_or_else(|| CatalogError::Decode("no more pages".into())) }
        })
        .await?;

        assert_eq!(
            requested,
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
        let templates: Vec<&str> = tags.iter().map(|t| t.template.as_str()).collect();
        assert_eq!(templates, ["a", "b", "c", "d"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_collect_tag_pages_stops_on_empty_token() -> Result<()> {
        let mut pages = VecDeque::from(vec![page(&["a"], Some("")), page(&["never"], None)]);
        let mut calls = 0;

        let tags = collect_tag_pages(|_| {
            calls += 1;
            let next = pages.pop_front();
            async move { next.ok_or_else(|| CatalogError::Decode("no more pages".into())) }
        })
        .await?;

        assert_eq!(calls, 1);
        assert_eq!(tags.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_collect_tag_pages_propagates_page_failure() {
        let mut pages = VecDeque::from(vec![Ok(page(&["a"], Some("p2"))), Err(500u16)]);

        let result = collect_tag_pages(|_| {
            let next = pages.pop_front();
            async move {
                match next {
                    Some(Ok(page)) => Ok(page),
                    Some(Err(status)) => Err(CatalogError::Api {
                        status,
                        message: "backend error".into(),
                    }),
                    None => Err(CatalogError::Decode("no more pages".into())),
                }
            }
        })
        .await;

        assert!(matches!(result, Err(CatalogError::Api { status: 500, .. })));
    }

    // --- OVER HTTP ---

    /// Answers one canned response per connection and hands back the raw requests.
    async fn canned_server(
        responses: Vec<(u16, &'static str)>,
    ) -> Result<(String, tokio::task::JoinHandle<Vec<String>>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let endpoint = format!("http://{}/v1", listener.local_addr()?);

        let server = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                requests.push(read_request(&mut socket).await);
                let reply = format!(
                    "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(reply.as_bytes()).await.ok();
                socket.shutdown().await.ok();
            }
            requests
        });

        Ok((endpoint, server))
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn local_client(endpoint: &str) -> Result<DataCatalogClient> {
        let client = reqwest::Client::builder().no_proxy().build()?;
        Ok(DataCatalogClient::from_parts(
            endpoint,
            Credentials::AccessToken("test-token".into()),
            client,
        ))
    }

    #[tokio::test]
    async fn test_list_tags_walks_pages_over_http() -> Result<()> {
        let (endpoint, server) = canned_server(vec![
            (
                200,
                r#"{"tags":[{"template":"t/a","fields":{"data_steward":{"stringValue":"alice"}}}],"nextPageToken":"page-2"}"#,
            ),
            (200, r#"{"tags":[{"template":"t/b"}],"nextPageToken":""}"#),
        ])
        .await?;
        let client = local_client(&endpoint)?;

        let tags = client.list_tags("projects/p/locations/us/entries/e").await?;
        let requests = server.await?;

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].field("data_steward"), Some("alice"));
        assert_eq!(tags[1].template, "t/b");

        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("GET /v1/projects/p/locations/us/entries/e/tags?"));
        assert!(requests[0].contains("pageSize=100"));
        assert!(!requests[0].contains("pageToken"));
        assert!(requests[1].contains("pageToken=page-2"));
        assert!(
            requests[0]
                .to_ascii_lowercase()
                .contains("authorization: bearer test-token")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_http_statuses_become_outcomes_or_errors() -> Result<()> {
        let (endpoint, server) = canned_server(vec![
            (404, r#"{"error":{"code":404,"message":"Not found","status":"NOT_FOUND"}}"#),
            (409, r#"{"error":{"code":409,"message":"Exists","status":"ALREADY_EXISTS"}}"#),
            (
                403,
                r#"{"error":{"code":403,"message":"Permission denied","status":"PERMISSION_DENIED"}}"#,
            ),
        ])
        .await?;
        let client = local_client(&endpoint)?;

        let template = client
            .get_template("projects/p/locations/us/tagTemplates/deacero_metadata")
            .await?;
        assert!(matches!(template, Lookup::NotFound));

        let created = client
            .create_template(
                "projects/p/locations/us",
                "deacero_metadata",
                &TagTemplate::steward_and_labels(),
            )
            .await?;
        assert!(matches!(created, Creation::AlreadyExists));

        match client
            .lookup_entry("//bigquery.googleapis.com/projects/p/datasets/d/tables/orders")
            .await
        {
            Err(CatalogError::Api { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "Permission denied (PERMISSION_DENIED)");
            }
            other => bail!("Expected Api error, got {:?}", other),
        }

        let requests = server.await?;
        assert!(requests[1].starts_with(
            "POST /v1/projects/p/locations/us/tagTemplates?tagTemplateId=deacero_metadata "
        ));
        assert!(requests[1].contains(r#""displayName":"Deacero metadata""#));
        Ok(())
    }
}
