pub mod catalog;

pub use catalog::{CatalogClient, Creation, Lookup};
