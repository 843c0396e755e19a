pub mod metadata;
pub mod settings;

pub use metadata::load_metadata;
pub use settings::SyncConfig;
