use async_trait::async_trait;

use crate::errors::Result;

/// Remote persistence of the known builder names.
#[async_trait]
pub trait BuilderRepositoryTrait: Send + Sync {
    async fn list_names(&self) -> Result<Vec<String>>;

    /// Appends a name to the known-name store.
    async fn add_name(&self, name: &str) -> Result<()>;
}

#[async_trait]
pub trait BuilderServiceTrait: Send + Sync {
    /// Fetches the known names and refreshes the local cache.
    async fn list_names(&self) -> Result<Vec<String>>;

    /// Makes sure `name` is a known builder name.
    ///
    /// Returns `true` when the name was new and has been added.
    async fn ensure_known(&self, name: &str) -> Result<bool>;
}
