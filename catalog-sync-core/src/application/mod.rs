// catalog-sync-core/src/application/mod.rs

pub mod report;
pub mod sync;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI do `use catalog_sync_core::application::{sync_catalog, SyncReport};`
// without knowing the internal file layout.

pub use report::{SyncReport, TableOutcome};
pub use sync::{
    EnsuredTemplate, ensure_tag, ensure_template, find_entry, sync_catalog, update_description,
};
