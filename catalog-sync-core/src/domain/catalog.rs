// catalog-sync-core/src/domain/catalog.rs

use std::collections::BTreeMap;

/// Template managed by this tool. The identity is fixed for a run domain.
pub const DEFAULT_TEMPLATE_ID: &str = "deacero_metadata";
pub const TEMPLATE_DISPLAY_NAME: &str = "Deacero metadata";

pub const STEWARD_FIELD: &str = "data_steward";
pub const LABELS_FIELD: &str = "labels";

/// The only entry attribute this tool ever writes.
pub const DESCRIPTION_MASK: &str = "description";

const LABEL_SEPARATOR: &str = ", ";

// --- RESOURCE NAMES ---

pub fn template_parent(project: &str, location: &str) -> String {
    format!("projects/{project}/locations/{location}")
}

pub fn template_name(project: &str, location: &str, template_id: &str) -> String {
    format!(
        "{}/tagTemplates/{template_id}",
        template_parent(project, location)
    )
}

/// Linked resource of a BigQuery table, as Data Catalog indexes it.
pub fn bigquery_linked_resource(project: &str, dataset: &str, table_id: &str) -> String {
    format!("//bigquery.googleapis.com/projects/{project}/datasets/{dataset}/tables/{table_id}")
}

/// Flattens a label list into the single string stored in the `labels` field.
pub fn join_labels<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(LABEL_SEPARATOR)
}

// --- TAG TEMPLATE ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveType {
    String,
    Double,
    Bool,
    Timestamp,
    Richtext,
    #[default]
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateField {
    pub display_name: String,
    pub primitive_type: PrimitiveType,
    pub is_required: bool,
}

impl TemplateField {
    pub fn string(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            primitive_type: PrimitiveType::String,
            is_required: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagTemplate {
    /// Full resource name. `None` until the catalog has assigned one.
    pub name: Option<String>,
    pub display_name: String,
    pub fields: BTreeMap<String, TemplateField>,
}

impl TagTemplate {
    /// The two-field template (steward + labels) attached to every synced table.
    pub fn steward_and_labels() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(
            STEWARD_FIELD.to_string(),
            TemplateField::string("Data steward"),
        );
        fields.insert(
            LABELS_FIELD.to_string(),
            TemplateField::string("Labels (comma-separated)"),
        );

        Self {
            name: None,
            display_name: TEMPLATE_DISPLAY_NAME.to_string(),
            fields,
        }
    }
}

// --- ENTRY ---

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    pub name: String,
    pub linked_resource: Option<String>,
    pub description: Option<String>,
}

// --- TAG ---

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tag {
    pub name: Option<String>,
    /// Full resource name of the template this tag instantiates.
    pub template: String,
    /// String-valued fields only; this tool never writes other field types.
    pub fields: BTreeMap<String, String>,
}

impl Tag {
    pub fn steward_and_labels<S: AsRef<str>>(template: &str, steward: &str, labels: &[S]) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(STEWARD_FIELD.to_string(), steward.to_string());
        fields.insert(LABELS_FIELD.to_string(), join_labels(labels));

        Self {
            name: None,
            template: template.to_string(),
            fields,
        }
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}
