pub mod catalog;
pub mod error;
pub mod metadata;

// Convenient re-exports to simplify imports elsewhere
pub use catalog::{Entry, Tag, TagTemplate};
pub use error::DomainError;
pub use metadata::{MetadataFile, TableRecord};
