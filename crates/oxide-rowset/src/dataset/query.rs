use std::collections::HashMap;
use std::sync::Arc;

use oxide_rowset_core::{resolve, Datum, Param, Result, Statement};
use tracing::debug;

use super::{DataSet, RecordSet, ALL_RECORDS};
use crate::cache::MetadataCache;
use crate::connector::Connector;
use crate::record::{RowContext, SaveOptions};

/// Read-only rows of an arbitrary SELECT.
///
/// The schema is described from the statement itself, so columns of
/// joined tables keep their cached key ordinals. Records cannot be saved.
#[derive(Debug)]
pub struct QueryDataSet<'c, C> {
    conn: &'c C,
    context: Arc<RowContext>,
    sql: String,
    params: Vec<Param>,
    records: RecordSet,
}

impl<'c, C: Connector> QueryDataSet<'c, C> {
    /// Prepares `sql`; nothing is fetched yet.
    pub async fn new(conn: &'c C, cache: &MetadataCache, sql: impl Into<String>) -> Result<Self> {
        Self::prepared(conn, cache, sql.into(), Vec::new()).await
    }

    /// Prepares a template with `${name}` or `${name:type}` placeholders
    /// bound from `values`.
    pub async fn with_macros(
        conn: &'c C,
        cache: &MetadataCache,
        template: &str,
        values: &HashMap<String, Datum>,
    ) -> Result<Self> {
        let resolved = resolve(template)?;
        let params = resolved.bind(values)?;
        debug!(sql = %resolved.sql, macros = resolved.bindings.len(), "Resolved macro template");
        Self::prepared(conn, cache, resolved.sql, params).await
    }

    async fn prepared(
        conn: &'c C,
        cache: &MetadataCache,
        sql: String,
        params: Vec<Param>,
    ) -> Result<Self> {
        let shape = conn.describe(&sql).await?;
        let schema = cache.populate(conn, &shape, None, None).await?;
        Ok(Self {
            conn,
            context: Arc::new(RowContext::read_only(Arc::new(schema))),
            sql,
            params,
            records: RecordSet::default(),
        })
    }

    /// Bound parameters, in marker order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Fetches every row.
    pub async fn fetch_records(&mut self) -> Result<&mut Self> {
        self.fetch_range(0, ALL_RECORDS).await
    }

    /// Fetches at most `max` rows after skipping `start`.
    pub async fn fetch_range(&mut self, start: usize, max: i64) -> Result<&mut Self> {
        let stmt = Statement::new(self.sql.clone(), self.params.clone());
        self.records
            .fetch(self.conn, &self.context, &stmt, start, max, SaveOptions::default())
            .await?;
        Ok(self)
    }
}

impl<C> DataSet for QueryDataSet<'_, C> {
    fn record_set(&self) -> &RecordSet {
        &self.records
    }

    fn record_set_mut(&mut self) -> &mut RecordSet {
        &mut self.records
    }

    fn context(&self) -> &Arc<RowContext> {
        &self.context
    }

    fn select_string(&self) -> Result<String> {
        Ok(self.sql.clone())
    }
}
