// catalog-sync-core/src/infrastructure/adapters/memory.rs

// In-process catalog. Behaves like the remote service for the calls the synchronizer
// makes, and records every call so tests can assert on the exact traffic.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::Mutex;

use crate::domain::catalog::{Entry, Tag, TagTemplate};
use crate::infrastructure::error::CatalogError;
use crate::ports::catalog::{CatalogClient, Creation, Lookup};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    GetTemplate {
        name: String,
    },
    CreateTemplate {
        parent: String,
        template_id: String,
    },
    LookupEntry {
        linked_resource: String,
    },
    UpdateEntry {
        name: String,
        description: Option<String>,
        field_mask: Vec<String>,
    },
    ListTags {
        parent: String,
    },
    CreateTag {
        parent: String,
        tag: Tag,
    },
}

impl CatalogCall {
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            CatalogCall::CreateTemplate { .. }
                | CatalogCall::UpdateEntry { .. }
                | CatalogCall::CreateTag { .. }
        )
    }
}

#[derive(Default)]
struct CatalogState {
    templates: BTreeMap<String, TagTemplate>,
    // linked resource -> entry
    entries: BTreeMap<String, Entry>,
    // entry name -> attached tags
    tags: BTreeMap<String, Vec<Tag>>,
    calls: Vec<CatalogCall>,
    next_tag_id: u64,
    // create_template answers AlreadyExists once, as if another actor won the race
    racing_template_creator: bool,
    // linked resources whose lookup fails with a permission error
    denied_lookups: HashSet<String>,
}

#[derive(Default)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a discovered table: `linked_resource` resolves to an entry named `entry_name`.
    pub fn with_entry(mut self, linked_resource: &str, entry_name: &str) -> Self {
        self.state.get_mut().entries.insert(
            linked_resource.to_string(),
            Entry {
                name: entry_name.to_string(),
                linked_resource: Some(linked_resource.to_string()),
                description: None,
            },
        );
        self
    }

    pub fn with_template(mut self, name: &str, template: TagTemplate) -> Self {
        let template = TagTemplate {
            name: Some(name.to_string()),
            ..template
        };
        self.state
            .get_mut()
            .templates
            .insert(name.to_string(), template);
        self
    }

    pub fn with_tag(mut self, entry_name: &str, tag: Tag) -> Self {
        self.state
            .get_mut()
            .tags
            .entry(entry_name.to_string())
            .or_default()
            .push(tag);
        self
    }

    pub fn with_racing_template_creator(mut self) -> Self {
        self.state.get_mut().racing_template_creator = true;
        self
    }

    pub fn with_denied_lookup(mut self, linked_resource: &str) -> Self {
        self.state
            .get_mut()
            .denied_lookups
            .insert(linked_resource.to_string());
        self
    }

    pub async fn calls(&self) -> Vec<CatalogCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn mutating_calls(&self) -> Vec<CatalogCall> {
        self.calls()
            .await
            .into_iter()
            .filter(CatalogCall::is_mutating)
            .collect()
    }

    pub async fn tags_of(&self, entry_name: &str) -> Vec<Tag> {
        self.state
            .lock()
            .await
            .tags
            .get(entry_name)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn entry(&self, linked_resource: &str) -> Option<Entry> {
        self.state
            .lock()
            .await
            .entries
            .get(linked_resource)
            .cloned()
    }
}

fn not_found(what: &str) -> CatalogError {
    CatalogError::Api {
        status: 404,
        message: format!("{what} not found"),
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn get_template(&self, name: &str) -> Result<Lookup<TagTemplate>, CatalogError> {
        let mut state = self.state.lock().await;
        state.calls.push(CatalogCall::GetTemplate {
            name: name.to_string(),
        });

        Ok(match state.templates.get(name) {
            Some(template) => Lookup::Found(template.clone()),
            None => Lookup::NotFound,
        })
    }

    async fn create_template(
        &self,
        parent: &str,
        template_id: &str,
        template: &TagTemplate,
    ) -> Result<Creation<TagTemplate>, CatalogError> {
        let mut state = self.state.lock().await;
        state.calls.push(CatalogCall::CreateTemplate {
            parent: parent.to_string(),
            template_id: template_id.to_string(),
        });

        let name = format!("{parent}/tagTemplates/{template_id}");
        let created = TagTemplate {
            name: Some(name.clone()),
            ..template.clone()
        };

        if state.racing_template_creator {
            state.racing_template_creator = false;
            state.templates.insert(name, created);
            return Ok(Creation::AlreadyExists);
        }
        if state.templates.contains_key(&name) {
            return Ok(Creation::AlreadyExists);
        }

        state.templates.insert(name, created.clone());
        Ok(Creation::Created(created))
    }

    async fn lookup_entry(&self, linked_resource: &str) -> Result<Lookup<Entry>, CatalogError> {
        let mut state = self.state.lock().await;
        state.calls.push(CatalogCall::LookupEntry {
            linked_resource: linked_resource.to_string(),
        });

        if state.denied_lookups.contains(linked_resource) {
            return Err(CatalogError::Api {
                status: 403,
                message: format!("Permission denied on {linked_resource}"),
            });
        }

        Ok(match state.entries.get(linked_resource) {
            Some(entry) => Lookup::Found(entry.clone()),
            None => Lookup::NotFound,
        })
    }

    async fn update_entry(
        &self,
        entry: &Entry,
        field_mask: &[&str],
    ) -> Result<Entry, CatalogError> {
        let mut state = self.state.lock().await;
        state.calls.push(CatalogCall::UpdateEntry {
            name: entry.name.clone(),
            description: entry.description.clone(),
            field_mask: field_mask.iter().map(|f| f.to_string()).collect(),
        });

        let stored = state
            .entries
            .values_mut()
            .find(|e| e.name == entry.name)
            .ok_or_else(|| not_found(&entry.name))?;

        for field in field_mask {
            match *field {
                "description" => stored.description = entry.description.clone(),
                other => {
                    return Err(CatalogError::Api {
                        status: 400,
                        message: format!("Unsupported update mask path: {other}"),
                    });
                }
            }
        }

        Ok(stored.clone())
    }

    async fn list_tags(&self, parent: &str) -> Result<Vec<Tag>, CatalogError> {
        let mut state = self.state.lock().await;
        state.calls.push(CatalogCall::ListTags {
            parent: parent.to_string(),
        });

        Ok(state.tags.get(parent).cloned().unwrap_or_default())
    }

    async fn create_tag(&self, parent: &str, tag: &Tag) -> Result<Tag, CatalogError> {
        let mut state = self.state.lock().await;
        state.calls.push(CatalogCall::CreateTag {
            parent: parent.to_string(),
            tag: tag.clone(),
        });

        if !state.entries.values().any(|e| e.name == parent) {
            return Err(not_found(parent));
        }

        state.next_tag_id += 1;
        let created = Tag {
            name: Some(format!("{parent}/tags/t{}", state.next_tag_id)),
            ..tag.clone()
        };
        state
            .tags
            .entry(parent.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }
}
