// catalog-sync/src/commands/summary.rs
//
// Human-readable rendering of a SyncReport.

use catalog_sync_core::application::{SyncReport, TableOutcome};
use comfy_table::{Cell, Color, Table, presets::UTF8_FULL};

pub fn render(report: &SyncReport) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Table").fg(Color::Green),
        Cell::new("Status").fg(Color::Green),
        Cell::new("Description").fg(Color::Green),
        Cell::new("Tag").fg(Color::Green),
    ]);

    for outcome in &report.outcomes {
        match outcome {
            TableOutcome::SkippedMissingId { position } => {
                table.add_row(vec![
                    Cell::new(format!("#{position} (no table_id)")),
                    Cell::new("skipped").fg(Color::Yellow),
                    Cell::new("-"),
                    Cell::new("-"),
                ]);
            }
            TableOutcome::EntryNotFound { table_id, .. } => {
                table.add_row(vec![
                    Cell::new(table_id),
                    Cell::new("entry not found").fg(Color::Red),
                    Cell::new("-"),
                    Cell::new("-"),
                ]);
            }
            TableOutcome::Synced {
                table_id,
                description_updated,
                tag_created,
                ..
            } => {
                table.add_row(vec![
                    Cell::new(table_id),
                    Cell::new("synced").fg(Color::Green),
                    Cell::new(if *description_updated {
                        "updated"
                    } else {
                        "unchanged"
                    }),
                    Cell::new(if *tag_created { "created" } else { "existing" }),
                ]);
            }
        }
    }

    let mut output = table.to_string();
    output.push_str(&format!(
        "\n{} tables: {} synced, {} missing entries, {} skipped | {} descriptions updated, {} tags created",
        report.tables_total,
        report.synced(),
        report.entries_missing(),
        report.skipped_missing_id(),
        report.descriptions_updated(),
        report.tags_created(),
    ));
    output
}
