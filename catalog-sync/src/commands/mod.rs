// catalog-sync/src/commands/mod.rs

pub mod summary;
pub mod sync;
