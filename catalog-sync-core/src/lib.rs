// catalog-sync-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// The contract with the remote metadata catalog.
pub mod ports;

// 2. Domain
// Table records, tag templates, entries, tags and naming rules.
// Depends on nothing else (neither infra nor app).
pub mod domain;

// 3. Infrastructure (Adapters)
// Environment config, YAML loader, Data Catalog REST client, in-memory catalog.
// Depends on the Domain and the Ports.
pub mod infrastructure;

// 4. Application (Use Cases)
// Template ensure, entry resolution, description update, tag creation.
// Depends on the Domain, the Ports and the Infra errors.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use catalog_sync_core::SyncError;
pub use error::SyncError;
