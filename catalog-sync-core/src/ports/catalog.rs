// catalog-sync-core/src/ports/catalog.rs

// What the synchronizer needs from a metadata catalog, without knowing how it's reached.
// "Not found" and "already exists" are outcomes, not errors: callers branch on them.
// Everything else (permissions, invalid arguments, network) is a CatalogError.

use crate::domain::catalog::{Entry, Tag, TagTemplate};
use crate::infrastructure::error::CatalogError;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Creation<T> {
    Created(T),
    AlreadyExists,
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn get_template(&self, name: &str) -> Result<Lookup<TagTemplate>, CatalogError>;

    async fn create_template(
        &self,
        parent: &str,
        template_id: &str,
        template: &TagTemplate,
    ) -> Result<Creation<TagTemplate>, CatalogError>;

    async fn lookup_entry(&self, linked_resource: &str) -> Result<Lookup<Entry>, CatalogError>;

    /// Partial update: only the attributes named in `field_mask` are written.
    async fn update_entry(&self, entry: &Entry, field_mask: &[&str])
    -> Result<Entry, CatalogError>;

    /// Every tag attached to `parent` (an entry name), across all pages.
    async fn list_tags(&self, parent: &str) -> Result<Vec<Tag>, CatalogError>;

    async fn create_tag(&self, parent: &str, tag: &Tag) -> Result<Tag, CatalogError>;
}
