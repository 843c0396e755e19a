// catalog-sync-core/src/domain/metadata.rs

use serde::{Deserialize, Deserializer, Serialize};

/// Contents of a metadata description file.
///
/// ```yaml
/// tables:
///   - table_id: orders
///     description: Order facts
///     data_steward: alice
///     tags: [finance, pii]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct MetadataFile {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tables: Vec<TableRecord>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TableRecord {
    // Optional at parse time: items without an id are skipped, not rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_steward: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

impl TableRecord {
    /// The table id without surrounding whitespace, if present and not blank.
    pub fn id(&self) -> Option<&str> {
        self.table_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// The description to push, if any. Empty strings mean "leave untouched".
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    pub fn steward(&self) -> &str {
        self.data_steward.as_deref().unwrap_or_default()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
