pub mod datacatalog;
pub mod memory;

pub use datacatalog::DataCatalogClient;
pub use memory::{CatalogCall, InMemoryCatalog};
