//! Primary key cache.
//!
//! Maps `url|schema|table` to the key sequence of every primary key
//! column. Schema and table are matched ignoring case. Names are
//! corrected to the connector's own casing before asking for the keys,
//! since many drivers return no keys at all for a miscased table.

use std::collections::HashMap;
use std::sync::Arc;

use oxide_rowset_core::{Result, TABLES_FILTER};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::CacheKey;
use crate::connector::{Connector, MetadataDialect, SQL_SERVER_OWNER};

/// Lowercased column name to 1-based key sequence.
pub type PrimaryKeyMap = HashMap<String, u32>;

/// Primary key columns by table.
#[derive(Debug, Default)]
pub struct PrimaryKeyCache {
    entries: RwLock<HashMap<CacheKey, Arc<PrimaryKeyMap>>>,
    populate: Mutex<()>,
}

impl PrimaryKeyCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, key: &CacheKey) -> Option<Arc<PrimaryKeyMap>> {
        self.entries.read().get(key).cloned()
    }

    /// Number of cached tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Key sequence of `column` in `table`, 0 when it is not a key column.
    pub async fn ordinal<C: Connector>(
        &self,
        conn: &C,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<u32> {
        let keys = self.keys(conn, schema, table).await?;
        Ok(keys.get(&column.to_lowercase()).copied().unwrap_or(0))
    }

    /// All key columns of `table`, loading them on first use.
    pub async fn keys<C: Connector>(
        &self,
        conn: &C,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Arc<PrimaryKeyMap>> {
        let key = CacheKey::folded(conn.url(), schema, table);
        if let Some(keys) = self.get(&key) {
            debug!(key = %key, "Primary key cache hit");
            return Ok(keys);
        }

        let _guard = self.populate.lock().await;
        if let Some(keys) = self.get(&key) {
            return Ok(keys);
        }

        let keys = Arc::new(load(conn, schema, table).await?);
        self.entries.write().insert(key.clone(), Arc::clone(&keys));
        info!(key = %key, columns = keys.len(), "Cached primary key");
        Ok(keys)
    }
}

async fn load<C: Connector>(conn: &C, schema: Option<&str>, table: &str) -> Result<PrimaryKeyMap> {
    let (schema, table) = canonical_names(conn, schema, table).await?;

    let columns = match conn.dialect() {
        MetadataDialect::Generic => {
            conn.primary_keys(conn.catalog(), schema.as_deref(), &table)
                .await?
        }
        MetadataDialect::SqlServer => {
            let (catalog, table) = match table.split_once("..") {
                Some((catalog, table)) => (Some(catalog), table),
                None => (conn.catalog(), table.as_str()),
            };
            conn.primary_keys(catalog, Some(SQL_SERVER_OWNER), table)
                .await?
        }
    };

    Ok(columns
        .into_iter()
        .map(|pk| (pk.column.to_lowercase(), pk.sequence))
        .collect())
}

/// Replaces `schema` and `table` by the casing the connector reports.
/// Names with no match are kept as given.
async fn canonical_names<C: Connector>(
    conn: &C,
    schema: Option<&str>,
    table: &str,
) -> Result<(Option<String>, String)> {
    let schema = match schema.filter(|s| !s.is_empty()) {
        Some(wanted) => Some(
            conn.schemas()
                .await?
                .into_iter()
                .find(|s| s.eq_ignore_ascii_case(wanted))
                .unwrap_or_else(|| wanted.to_string()),
        ),
        None => None,
    };

    let table = conn
        .tables(schema.as_deref(), TABLES_FILTER)
        .await?
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(table))
        .map_or_else(|| table.to_string(), |t| t.name);

    Ok((schema, table))
}
