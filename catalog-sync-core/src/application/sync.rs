// catalog-sync-core/src/application/sync.rs

use tracing::{info, instrument, warn};

use crate::application::report::{SyncReport, TableOutcome};
use crate::domain::catalog::{
    DESCRIPTION_MASK, Entry, Tag, TagTemplate, bigquery_linked_resource, template_name,
    template_parent,
};
use crate::domain::error::DomainError;
use crate::domain::metadata::MetadataFile;
use crate::error::SyncError;
use crate::infrastructure::config::SyncConfig;
use crate::ports::catalog::{CatalogClient, Creation, Lookup};

/// The template the run will tag entries with.
#[derive(Debug, Clone)]
pub struct EnsuredTemplate {
    pub template: TagTemplate,
    /// `true` only when this call issued the create that succeeded.
    pub created: bool,
}

/// Fetches the tag template, creating it when absent.
///
/// A concurrent creator winning the race is not an error: the template is re-read.
#[instrument(skip(client))]
pub async fn ensure_template(
    client: &dyn CatalogClient,
    project: &str,
    location: &str,
    template_id: &str,
) -> Result<EnsuredTemplate, SyncError> {
    let name = template_name(project, location, template_id);

    if let Lookup::Found(template) = client.get_template(&name).await? {
        println!("🏷️  Tag template exists: {name}");
        return Ok(EnsuredTemplate {
            template,
            created: false,
        });
    }

    println!("🏗️  Creating tag template: {name}");
    let parent = template_parent(project, location);
    let draft = TagTemplate::steward_and_labels();

    match client.create_template(&parent, template_id, &draft).await? {
        Creation::Created(template) => {
            println!(
                "   ✅ Tag template created: {}",
                template.name.as_deref().unwrap_or(&name)
            );
            Ok(EnsuredTemplate {
                template,
                created: true,
            })
        }
        Creation::AlreadyExists => {
            info!(template = %name, "Template created concurrently, fetching it");
            match client.get_template(&name).await? {
                Lookup::Found(template) => Ok(EnsuredTemplate {
                    template,
                    created: false,
                }),
                Lookup::NotFound => Err(DomainError::TemplateVanished(name).into()),
            }
        }
    }
}

/// Resolves the catalog entry of a BigQuery table. `None` when the catalog doesn't know it.
#[instrument(skip(client))]
pub async fn find_entry(
    client: &dyn CatalogClient,
    project: &str,
    dataset: &str,
    table_id: &str,
) -> Result<Option<Entry>, SyncError> {
    let linked_resource = bigquery_linked_resource(project, dataset, table_id);

    match client.lookup_entry(&linked_resource).await? {
        Lookup::Found(entry) => Ok(Some(entry)),
        Lookup::NotFound => {
            println!("   ⚠️  Entry not found for linked_resource={linked_resource}");
            Ok(None)
        }
    }
}

/// Overwrites the entry description, leaving every other attribute untouched.
///
/// Returns `false` without calling the catalog when there is no entry.
#[instrument(skip(client, entry))]
pub async fn update_description(
    client: &dyn CatalogClient,
    entry: Option<&Entry>,
    text: &str,
) -> Result<bool, SyncError> {
    let Some(entry) = entry else {
        return Ok(false);
    };

    let update = Entry {
        description: Some(text.to_string()),
        ..entry.clone()
    };
    client.update_entry(&update, &[DESCRIPTION_MASK]).await?;

    println!("   📝 Description updated for: {}", entry.name);
    Ok(true)
}

/// Attaches a steward/labels tag unless the entry already has one from `template_name`.
///
/// Existing tags are never modified.
#[instrument(skip(client, labels))]
pub async fn ensure_tag(
    client: &dyn CatalogClient,
    entry_name: &str,
    template_name: &str,
    steward: &str,
    labels: &[String],
) -> Result<Option<Tag>, SyncError> {
    let existing = client.list_tags(entry_name).await?;
    if existing.iter().any(|t| t.template == template_name) {
        println!(
            "   ⏭️  Entry {entry_name} already has a tag from {template_name} (creation skipped)"
        );
        return Ok(None);
    }

    let tag = Tag::steward_and_labels(template_name, steward, labels);
    let created = client.create_tag(entry_name, &tag).await?;

    println!(
        "   🏷️  Tag created: {} on {entry_name}",
        created.name.as_deref().unwrap_or("<unnamed>")
    );
    Ok(Some(created))
}

/// Runs the whole synchronization: template, then each table in file order.
///
/// Tables whose entry is missing are skipped. Any other catalog failure aborts the run.
#[instrument(skip_all, fields(project = %config.project_id, dataset = %config.dataset_id))]
pub async fn sync_catalog(
    client: &dyn CatalogClient,
    config: &SyncConfig,
    metadata: &MetadataFile,
) -> Result<SyncReport, SyncError> {
    let mut report = SyncReport::start(metadata.tables.len());

    if metadata.tables.is_empty() {
        println!("📭 No tables defined in the metadata file.");
        return Ok(report.finish());
    }

    let ensured = ensure_template(
        client,
        &config.project_id,
        &config.location,
        &config.template_id,
    )
    .await?;
    let template_name = config.template_name();
    report.template_name = Some(template_name.clone());
    report.template_created = ensured.created;

    for (position, record) in metadata.tables.iter().enumerate() {
        let Some(table_id) = record.id() else {
            println!("⏭️  Skipping item without table_id.");
            report
                .outcomes
                .push(TableOutcome::SkippedMissingId { position });
            continue;
        };

        println!("----");
        println!("🔎 Processing table: {table_id}");

        let entry = find_entry(client, &config.project_id, &config.dataset_id, table_id).await?;
        let Some(entry) = entry else {
            warn!(
                table = %table_id,
                "Entry not found. Check that Data Catalog discovery ran and that {}.{}.{} exists",
                config.project_id,
                config.dataset_id,
                table_id
            );
            println!(
                "   → Entry not found for {table_id}. Check that Dataplex/Data Catalog discovery ran and that the table/view exists in {}.{}.{table_id}",
                config.project_id, config.dataset_id
            );
            report.outcomes.push(TableOutcome::EntryNotFound {
                table_id: table_id.to_string(),
                linked_resource: config.linked_resource(table_id),
            });
            continue;
        };

        let description_updated = match record.description() {
            Some(text) => update_description(client, Some(&entry), text).await?,
            None => false,
        };

        let tag = ensure_tag(
            client,
            &entry.name,
            &template_name,
            record.steward(),
            &record.tags,
        )
        .await?;

        report.outcomes.push(TableOutcome::Synced {
            table_id: table_id.to_string(),
            entry_name: entry.name.clone(),
            description_updated,
            tag_created: tag.is_some(),
        });
    }

    info!(
        tables = report.tables_total,
        tags_created = report.tags_created(),
        missing = report.entries_missing(),
        "Synchronization finished"
    );
    Ok(report.finish())
}
