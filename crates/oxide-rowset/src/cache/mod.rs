//! Process-wide metadata caches.
//!
//! [`MetadataCache`] owns the schema cache and the primary key cache.
//! Build one per process and hand it by reference to every dataset. Both
//! caches are append-only: once a table is loaded its metadata is reused
//! for the life of the cache.

mod primary;
mod schema;

use std::fmt;
use std::sync::Arc;

use oxide_rowset_core::{ColumnDescriptor, Result, Schema, TABLES_FILTER};
use tracing::{debug, info};

use crate::connector::Connector;

pub use primary::{PrimaryKeyCache, PrimaryKeyMap};
pub use schema::SchemaCache;

/// Placeholder used in cache keys when no schema is given.
pub const NO_SCHEMA: &str = "NO_SCHEMA";

/// Cache key, `url|schema|table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds a key. A missing or empty schema becomes [`NO_SCHEMA`].
    #[must_use]
    pub fn new(url: &str, schema: Option<&str>, table: &str) -> Self {
        let schema = schema.filter(|s| !s.is_empty()).unwrap_or(NO_SCHEMA);
        Self(format!("{url}|{schema}|{table}"))
    }

    /// Builds a key that ignores the case of schema and table.
    #[must_use]
    pub fn folded(url: &str, schema: Option<&str>, table: &str) -> Self {
        let schema = schema.filter(|s| !s.is_empty()).map(str::to_lowercase);
        Self::new(url, schema.as_deref(), &table.to_lowercase())
    }

    /// The key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Schema and primary key caches.
#[derive(Debug, Default)]
pub struct MetadataCache {
    schemas: SchemaCache,
    primary_keys: PrimaryKeyCache,
}

impl MetadataCache {
    /// Creates empty caches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema cache.
    #[must_use]
    pub const fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    /// The primary key cache.
    #[must_use]
    pub const fn primary_keys(&self) -> &PrimaryKeyCache {
        &self.primary_keys
    }

    /// Key sequence of a column, 0 when it is not a primary key column.
    pub async fn primary_key_ordinal<C: Connector>(
        &self,
        conn: &C,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<u32> {
        self.primary_keys.ordinal(conn, schema, table, column).await
    }

    /// Schema of `table` restricted to `attributes` (a SELECT column list,
    /// `*` for all columns).
    ///
    /// Full schemas are cached. A `schema.table` name is split when no
    /// schema is given.
    pub async fn table_schema<C: Connector>(
        &self,
        conn: &C,
        schema: Option<&str>,
        table: &str,
        attributes: &str,
    ) -> Result<Arc<Schema>> {
        let (schema, table) = split_qualified(schema, table);
        let attributes = match attributes.trim() {
            "" => "*",
            trimmed => trimmed,
        };
        let sql = schema_query(attributes, schema, table);

        if attributes != "*" {
            debug!(sql = %sql, "Describing projection");
            let shape = conn.describe(&sql).await?;
            let schema = self.populate(conn, &shape, schema, Some(table)).await?;
            return Ok(Arc::new(schema.with_attributes(attributes)));
        }

        let key = CacheKey::new(conn.url(), schema, table);
        self.schemas
            .get_or_populate(key, || async {
                debug!(sql = %sql, "Describing table");
                let shape = conn.describe(&sql).await?;
                self.populate(conn, &shape, schema, Some(table)).await
            })
            .await
    }

    /// Builds a schema from a result shape.
    ///
    /// Columns of tables already in the schema cache are reused with
    /// their key ordinals. Other columns are created here and, when a
    /// `table` is given, their ordinal comes from the primary key cache.
    pub async fn populate<C: Connector>(
        &self,
        conn: &C,
        shape: &[ColumnDescriptor],
        schema: Option<&str>,
        table: Option<&str>,
    ) -> Result<Schema> {
        let table = table.filter(|t| !t.is_empty());
        let mut columns = Vec::with_capacity(shape.len());

        for desc in shape {
            let column_schema = desc
                .schema_name
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(schema);
            let column_table = desc
                .table_name
                .as_deref()
                .filter(|t| !t.is_empty())
                .or(table)
                .unwrap_or_default();

            let cached = if column_table.is_empty() {
                None
            } else {
                self.schemas
                    .get(&CacheKey::new(conn.url(), column_schema, column_table))
                    .and_then(|cached| cached.column_named(&desc.name).ok().cloned())
            };

            let column = match cached {
                Some(column) => column,
                None => {
                    let ordinal = if table.is_some() && !column_table.is_empty() {
                        self.primary_keys
                            .ordinal(conn, column_schema, column_table, &desc.name)
                            .await?
                    } else {
                        0
                    };
                    Arc::new(desc.to_column(column_table, ordinal))
                }
            };
            columns.push(column);
        }

        Ok(Schema::from_columns(columns, table).with_schema_name(schema.map(str::to_string)))
    }

    /// Loads every table the connector reports into the schema cache.
    ///
    /// Returns the number of tables loaded.
    pub async fn prefetch<C: Connector>(&self, conn: &C) -> Result<usize> {
        let mut loaded = 0;
        for info in conn.tables(None, TABLES_FILTER).await? {
            let shape = conn.columns(info.schema.as_deref(), &info.name).await?;
            if shape.is_empty() {
                continue;
            }
            let schema = self
                .populate(conn, &shape, info.schema.as_deref(), Some(&info.name))
                .await?;
            let key = CacheKey::new(conn.url(), info.schema.as_deref(), &info.name);
            self.schemas.insert_if_absent(key, schema);
            loaded += 1;
        }
        info!(tables = loaded, "Prefetched table schemas");
        Ok(loaded)
    }
}

fn split_qualified<'a>(schema: Option<&'a str>, table: &'a str) -> (Option<&'a str>, &'a str) {
    match schema.filter(|s| !s.is_empty()) {
        Some(schema) => (Some(schema), table),
        None => match table.split_once('.') {
            Some((schema, name)) if !schema.is_empty() && !name.starts_with('.') => {
                (Some(schema), name)
            }
            _ => (None, table),
        },
    }
}

fn schema_query(attributes: &str, schema: Option<&str>, table: &str) -> String {
    let mut sql = format!("SELECT {attributes} FROM ");
    if let Some(schema) = schema {
        sql.push_str(schema);
        sql.push('.');
    }
    sql.push_str(table);
    sql.push_str(" WHERE 1 = -1");
    sql
}
