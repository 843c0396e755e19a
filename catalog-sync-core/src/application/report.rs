// catalog-sync-core/src/application/report.rs

use chrono::Utc;
use serde::Serialize;

/// What happened to one record of the metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TableOutcome {
    /// The record has no `table_id`; `position` is its zero-based index in the file.
    SkippedMissingId { position: usize },
    /// No catalog entry for the table (discovery not run yet, or table absent).
    EntryNotFound {
        table_id: String,
        linked_resource: String,
    },
    Synced {
        table_id: String,
        entry_name: String,
        description_updated: bool,
        tag_created: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: String,
    pub finished_at: Option<String>,
    pub template_name: Option<String>,
    pub template_created: bool,
    pub tables_total: usize,
    pub outcomes: Vec<TableOutcome>,
}

impl SyncReport {
    pub fn start(tables_total: usize) -> Self {
        Self {
            started_at: Utc::now().to_rfc3339(),
            finished_at: None,
            template_name: None,
            template_created: false,
            tables_total,
            outcomes: Vec::new(),
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now().to_rfc3339());
        self
    }

    pub fn skipped_missing_id(&self) -> usize {
        self.count(|o| matches!(o, TableOutcome::SkippedMissingId { .. }))
    }

    pub fn entries_missing(&self) -> usize {
        self.count(|o| matches!(o, TableOutcome::EntryNotFound { .. }))
    }

    pub fn synced(&self) -> usize {
        self.count(|o| matches!(o, TableOutcome::Synced { .. }))
    }

    pub fn descriptions_updated(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                TableOutcome::Synced {
                    description_updated: true,
                    ..
                }
            )
        })
    }

    pub fn tags_created(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                TableOutcome::Synced {
                    tag_created: true,
                    ..
                }
            )
        })
    }

    /// Entries that already carried a tag of the template.
    pub fn tags_skipped(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                TableOutcome::Synced {
                    tag_created: false,
                    ..
                }
            )
        })
    }

    fn count<F: Fn(&TableOutcome) -> bool>(&self, predicate: F) -> usize {
        self.outcomes.iter().filter(|o| predicate(*o)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn synced(table_id: &str, description_updated: bool, tag_created: bool) -> TableOutcome {
        TableOutcome::Synced {
            table_id: table_id.into(),
            entry_name: format!("entries/{table_id}"),
            description_updated,
            tag_created,
        }
    }

    #[test]
    fn test_counters() {
        let mut report = SyncReport::start(5);
        report.outcomes = vec![
            TableOutcome::SkippedMissingId { position: 0 },
            TableOutcome::EntryNotFound {
                table_id: "ghost".into(),
                linked_resource: "//bigquery.googleapis.com/x".into(),
            },
            synced("orders", true, true),
            synced("customers", false, false),
            synced("items", true, false),
        ];

        assert_eq!(report.skipped_missing_id(), 1);
        assert_eq!(report.entries_missing(), 1);
        assert_eq!(report.synced(), 3);
        assert_eq!(report.descriptions_updated(), 2);
        assert_eq!(report.tags_created(), 1);
        assert_eq!(report.tags_skipped(), 2);
    }

    #[test]
    fn test_outcome_serialization_is_tagged() -> Result<()> {
        let value = serde_json::to_value(synced("orders", true, false))?;
        assert_eq!(value["outcome"], "synced");
        assert_eq!(value["table_id"], "orders");
        assert_eq!(value["description_updated"], true);
        Ok(())
    }

    #[test]
    fn test_finish_stamps_end_time() {
        let report = SyncReport::start(0);
        assert!(report.finished_at.is_none());
        assert!(report.finish().finished_at.is_some());
    }
}
