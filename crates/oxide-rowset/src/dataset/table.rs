use std::collections::HashMap;
use std::sync::Arc;

use oxide_rowset_core::{Datum, Error, KeyDef, Result, SqlType, Statement, Value};
use tracing::debug;

use super::{DataSet, RecordSet, ALL_RECORDS};
use crate::cache::MetadataCache;
use crate::connector::Connector;
use crate::record::{Record, RowContext, SaveOptions};

/// Rows of one table that can be changed and saved back.
///
/// ```text
/// SELECT <columns> FROM <table>[ WHERE <where>][ ORDER BY <order>][ <other>]
/// ```
#[derive(Debug)]
pub struct TableDataSet<'c, C> {
    conn: &'c C,
    context: Arc<RowContext>,
    where_clause: Option<String>,
    order: Option<String>,
    other: Option<String>,
    options: SaveOptions,
    records: RecordSet,
}

impl<'c, C: Connector> TableDataSet<'c, C> {
    /// Opens every column of `table`, keyed by its primary key.
    pub async fn new(conn: &'c C, cache: &MetadataCache, table: &str) -> Result<Self> {
        Self::open(conn, cache, table, "*", None).await
    }

    /// Opens every column of `table`, keyed by `key`.
    pub async fn with_key_def(
        conn: &'c C,
        cache: &MetadataCache,
        table: &str,
        key: KeyDef,
    ) -> Result<Self> {
        Self::open(conn, cache, table, "*", Some(key)).await
    }

    /// Opens the comma-separated `columns` of `table`, keyed by its
    /// primary key.
    pub async fn with_columns(
        conn: &'c C,
        cache: &MetadataCache,
        table: &str,
        columns: &str,
    ) -> Result<Self> {
        Self::open(conn, cache, table, columns, None).await
    }

    async fn open(
        conn: &'c C,
        cache: &MetadataCache,
        table: &str,
        columns: &str,
        key: Option<KeyDef>,
    ) -> Result<Self> {
        let schema = cache.table_schema(conn, None, table, columns).await?;
        let key = key.unwrap_or_else(|| KeyDef::from_primary_keys(&schema));
        Ok(Self {
            conn,
            context: Arc::new(RowContext::updatable(schema, key)),
            where_clause: None,
            order: None,
            other: None,
            options: SaveOptions::default(),
            records: RecordSet::default(),
        })
    }

    /// Key definition used to address rows.
    #[must_use]
    pub fn key_def(&self) -> &KeyDef {
        self.context.key_def().unwrap_or(&EMPTY_KEY)
    }

    /// Sets the WHERE condition used by [`TableDataSet::fetch_records`].
    pub fn where_clause(&mut self, condition: impl Into<String>) -> &mut Self {
        self.where_clause = Some(condition.into());
        self
    }

    /// Sets the ORDER BY list.
    pub fn order(&mut self, order: impl Into<String>) -> &mut Self {
        self.order = Some(order.into());
        self
    }

    /// Sets text appended after every other clause.
    pub fn other(&mut self, other: impl Into<String>) -> &mut Self {
        self.other = Some(other.into());
        self
    }

    /// Re-read each record after it is inserted or updated.
    pub fn set_refresh_on_save(&mut self, enabled: bool) {
        self.options = self.options.refresh_on_save(enabled);
        self.propagate_options();
    }

    /// Store generated keys into inserted records.
    pub fn set_generated_keys(&mut self, enabled: bool) {
        self.options = self.options.generated_keys(enabled);
        self.propagate_options();
    }

    /// Options applied to the records of this dataset.
    #[must_use]
    pub const fn options(&self) -> SaveOptions {
        self.options
    }

    fn propagate_options(&mut self) {
        let options = self.options;
        for record in self.records.as_mut_slice() {
            record.set_options(options);
        }
    }

    /// Fetches every matching row.
    pub async fn fetch_records(&mut self) -> Result<&mut Self> {
        self.fetch_range(0, ALL_RECORDS).await
    }

    /// Fetches at most `max` matching rows after skipping `start`.
    pub async fn fetch_range(&mut self, start: usize, max: i64) -> Result<&mut Self> {
        let stmt = Statement::new(self.select_string()?, Vec::new());
        self.fetch_statement(&stmt, start, max).await?;
        Ok(self)
    }

    async fn fetch_statement(&mut self, stmt: &Statement, start: usize, max: i64) -> Result<usize> {
        self.records
            .fetch(self.conn, &self.context, stmt, start, max, self.options)
            .await
    }

    /// Fetches the rows whose key columns equal `keys`.
    ///
    /// Every key column must have a value.
    pub async fn fetch_by_primary_keys(
        &mut self,
        keys: &HashMap<String, Datum>,
    ) -> Result<&mut Self> {
        let key = self.key_def().clone();
        if key.is_empty() {
            return Err(Error::MissingKeyDef("fetch by primary keys"));
        }
        let names: Vec<&str> = key.iter().collect();
        let stmt = self.select_where(&names, keys, "Missing primary key value for")?;
        self.records.clear();
        self.fetch_statement(&stmt, 0, ALL_RECORDS).await?;
        Ok(self)
    }

    /// Fetches the rows whose columns equal `values`.
    ///
    /// Conditions are emitted in column name order.
    pub async fn fetch_by_values(&mut self, values: &HashMap<String, Datum>) -> Result<&mut Self> {
        let mut names: Vec<&str> = values.keys().map(String::as_str).collect();
        names.sort_unstable();
        let stmt = self.select_where(&names, values, "Missing value for")?;
        self.records.clear();
        self.fetch_statement(&stmt, 0, ALL_RECORDS).await?;
        Ok(self)
    }

    /// Fetches the first row matching `condition`, or adds a new record
    /// when there is none.
    pub async fn fetch_one_or_new(&mut self, condition: impl Into<String>) -> Result<&mut Record> {
        self.records.clear();
        self.where_clause(condition);
        if self.fetch_range(0, 1).await?.last_fetch_size() == 1 {
            return self.records.get_mut(0);
        }
        self.add_record()
    }

    /// Appends an empty record pending insertion.
    pub fn add_record(&mut self) -> Result<&mut Record> {
        let record = Record::new_insert(Arc::clone(&self.context))?.with_options(self.options);
        self.records.push(record);
        let last = self.records.len() - 1;
        self.records.get_mut(last)
    }

    /// Saves every record, then drops the deleted ones.
    ///
    /// Returns the number of records that needed saving.
    pub async fn save(&mut self) -> Result<usize> {
        let mut saved = 0;
        for record in self.records.as_mut_slice() {
            if record.needs_to_be_saved() {
                record.save(self.conn).await?;
                saved += 1;
            }
        }
        self.remove_deleted_records();
        debug!(saved, "Saved table dataset");
        Ok(saved)
    }

    /// Drops records that have been deleted from the database.
    pub fn remove_deleted_records(&mut self) {
        self.records.retain(|record| !record.is_zombie());
    }

    /// Re-reads every record from the database.
    pub async fn refresh_all(&mut self) -> Result<()> {
        for record in self.records.as_mut_slice() {
            record.refresh(self.conn).await?;
        }
        Ok(())
    }

    /// `MAX(column) + 1` over the whole table, 1 for an empty table.
    pub async fn next_id(&self, column: &str) -> Result<i64> {
        let col = self.schema().column_named(column)?;
        let sql = format!("SELECT MAX({}) FROM {}", col.name, self.schema().full_table_name()?);
        debug!(sql = %sql, "Computing next id");
        let rows = self.conn.query(&sql, &[]).await?;
        let max = rows.rows.into_iter().next().and_then(|row| row.into_iter().next().flatten());
        let current = Value::new(SqlType::BigInt, 1, max).as_i64_opt()?.unwrap_or(0);
        current.checked_add(1).ok_or_else(|| Error::Conversion {
            index: 1,
            column: col.name.clone(),
            target: "long",
            reason: format!("next id after {current} overflows"),
        })
    }

    fn select_where(
        &self,
        names: &[&str],
        values: &HashMap<String, Datum>,
        missing: &str,
    ) -> Result<Statement> {
        let schema = self.schema();
        let table = schema.full_table_name()?;
        let columns: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();

        let mut terms = Vec::with_capacity(names.len());
        let mut params = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let column = schema.column_named(name)?;
            let datum = values
                .get(*name)
                .ok_or_else(|| Error::MissingKeyValue(format!("{missing} {table}.{name}.")))?;
            terms.push(format!("{name} = ?"));
            params.push(Value::for_column(column, i + 1, Some(datum.clone())).to_param()?);
        }

        let mut sql = format!("SELECT {} FROM {table}", columns.join(", "));
        if !terms.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&terms.join(" AND "));
        }
        Ok(Statement::new(sql, params))
    }
}

static EMPTY_KEY: KeyDef = KeyDef::new();

impl<C> DataSet for TableDataSet<'_, C> {
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
        let schema = self.schema();
        let mut sql = format!(
            "SELECT {} FROM {}",
            schema.attributes(),
            schema.full_table_name()?
        );
        if let Some(condition) = self.where_clause.as_deref().filter(|w| !w.is_empty()) {
            sql.push_str(" WHERE ");
            sql.push_str(condition);
        }
        if let Some(order) = self.order.as_deref().filter(|o| !o.is_empty()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        if let Some(other) = self.other.as_deref().filter(|o| !o.is_empty()) {
            sql.push(' ');
            sql.push_str(other);
        }
        Ok(sql)
    }
}
