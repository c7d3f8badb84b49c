//! Named text files: a writable cache and read-only bundled resources.

mod bundled;
mod local;

use async_trait::async_trait;

use crate::error::CatalogError;

pub use bundled::{BundledResources, StaticResources};
pub use local::{LocalFileCache, MemoryFileCache};

/// Cache file holding the last successfully fetched discount rules.
pub const DISCOUNT_RULES_FILE: &str = "discount_rules.json";

/// Identifier of the compiled-in discount rules.
pub const DISCOUNTS_RESOURCE: &str = "discounts";

/// Writable store of named text files.
#[async_trait]
pub trait FileCache: Send + Sync {
    /// Write `text` to `name`, replacing any previous content.
    async fn write(&self, name: &str, text: &str) -> Result<(), CatalogError>;

    /// Read `name`, or `None` if it does not exist or cannot be read.
    async fn read(&self, name: &str) -> Option<String>;
}

/// Read-only text resources shipped with the application.
pub trait ResourceBundle: Send + Sync {
    /// Read the resource `id`, or `None` if there is no such resource.
    fn read_bundled(&self, id: &str) -> Option<String>;
}
