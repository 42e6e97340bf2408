//! Full-schema cache.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use oxide_rowset_core::{Result, Schema};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::CacheKey;

/// Table schemas by `url|schema|table`.
///
/// Entries are never replaced or evicted once stored.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<CacheKey, Arc<Schema>>>,
    populate: Mutex<()>,
}

impl SchemaCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached schema for `key`.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Schema>> {
        self.entries.read().get(key).cloned()
    }

    /// Number of cached schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the cached schema, running `populate` once on a miss.
    ///
    /// Concurrent callers missing on the same cache wait for the first
    /// population and then see its result.
    pub async fn get_or_populate<F, Fut>(&self, key: CacheKey, populate: F) -> Result<Arc<Schema>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Schema>>,
    {
        if let Some(schema) = self.get(&key) {
            debug!(key = %key, "Schema cache hit");
            return Ok(schema);
        }

        let _guard = self.populate.lock().await;
        if let Some(schema) = self.get(&key) {
            return Ok(schema);
        }

        let schema = Arc::new(populate().await?);
        self.entries.write().insert(key.clone(), Arc::clone(&schema));
        info!(key = %key, columns = schema.len(), "Cached table schema");
        Ok(schema)
    }

    /// Stores `schema` unless the key is already cached.
    pub fn insert_if_absent(&self, key: CacheKey, schema: Schema) -> Arc<Schema> {
        Arc::clone(
            self.entries
                .write()
                .entry(key)
                .or_insert_with(|| Arc::new(schema)),
        )
    }
}
