//! Dirty-tracked rows.
//!
//! A [`Record`] is one row: a cell per schema column, a clean flag per
//! cell and a pending [`SaveIntent`]. Writes go back to the database as
//! INSERT, UPDATE or DELETE statements built from the dirty cells and the
//! row's key definition.
//!
//! ```text
//! Unknown --mark_for_insert--> Insert --save--> Unknown
//! Unknown --mark_for_update--> Update --save--> Unknown
//! Unknown --mark_for_delete--> Delete --save--> Zombie
//! ```
//!
//! A dirty row with no intent saves as an UPDATE. `unmark` resets any
//! intent except `Zombie`, which is terminal.

use std::fmt;
use std::sync::Arc;

use oxide_rowset_core::{
    Column, Datum, Error, KeyDef, Param, Result, Schema, Statement, ToDatum, Value,
};
use tracing::{debug, warn};

use crate::connector::{Connector, ExecuteResult};

/// Pending save action of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveIntent {
    /// Nothing explicitly requested.
    #[default]
    Unknown,
    /// New row, to be inserted.
    Insert,
    /// Existing row, to be updated.
    Update,
    /// Existing row, to be deleted.
    Delete,
    /// Deleted from the database.
    Zombie,
}

/// Capability of the rows' origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSource {
    /// Rows of an arbitrary query; they cannot be written back.
    ReadOnly,
    /// Rows of one table, addressed by a key definition.
    Updatable(KeyDef),
}

/// Metadata shared by every record of a dataset.
#[derive(Debug)]
pub struct RowContext {
    schema: Arc<Schema>,
    source: RowSource,
}

impl RowContext {
    /// Creates a context.
    #[must_use]
    pub const fn new(schema: Arc<Schema>, source: RowSource) -> Self {
        Self { schema, source }
    }

    /// Context for read-only rows.
    #[must_use]
    pub const fn read_only(schema: Arc<Schema>) -> Self {
        Self::new(schema, RowSource::ReadOnly)
    }

    /// Context for rows of a table addressed by `key`.
    #[must_use]
    pub const fn updatable(schema: Arc<Schema>, key: KeyDef) -> Self {
        Self::new(schema, RowSource::Updatable(key))
    }

    /// The schema.
    #[must_use]
    pub const fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The row source.
    #[must_use]
    pub const fn source(&self) -> &RowSource {
        &self.source
    }

    /// Returns true for read-only rows.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self.source, RowSource::ReadOnly)
    }

    /// Key definition of updatable rows.
    #[must_use]
    pub const fn key_def(&self) -> Option<&KeyDef> {
        match &self.source {
            RowSource::ReadOnly => None,
            RowSource::Updatable(key) => Some(key),
        }
    }
}

/// What happens after a successful write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Re-read the row after INSERT and UPDATE instead of marking it clean.
    pub refresh_on_save: bool,
    /// Assign the key generated by an INSERT to the primary key column.
    pub generated_keys: bool,
}

impl SaveOptions {
    /// Sets [`SaveOptions::refresh_on_save`].
    #[must_use]
    pub const fn refresh_on_save(mut self, enabled: bool) -> Self {
        self.refresh_on_save = enabled;
        self
    }

    /// Sets [`SaveOptions::generated_keys`].
    #[must_use]
    pub const fn generated_keys(mut self, enabled: bool) -> Self {
        self.generated_keys = enabled;
        self
    }
}

/// A column given by 1-based position or by name.
pub trait ColumnRef {
    /// Resolves to a valid 1-based position in `schema`.
    fn position(&self, schema: &Schema) -> Result<usize>;
}

impl ColumnRef for usize {
    fn position(&self, schema: &Schema) -> Result<usize> {
        schema.column(*self).map(|_| *self)
    }
}

impl ColumnRef for &str {
    fn position(&self, schema: &Schema) -> Result<usize> {
        schema.index_of(self)
    }
}

impl ColumnRef for String {
    fn position(&self, schema: &Schema) -> Result<usize> {
        schema.index_of(self)
    }
}

/// One row.
#[derive(Debug, Clone)]
pub struct Record {
    context: Arc<RowContext>,
    values: Vec<Value>,
    clean: Vec<bool>,
    intent: SaveIntent,
    options: SaveOptions,
}

impl Record {
    /// Builds a clean record from a fetched row.
    pub fn from_row(context: Arc<RowContext>, row: Vec<Option<Datum>>) -> Result<Self> {
        let values = read_values(context.schema(), row)?;
        Ok(Self {
            clean: vec![true; values.len()],
            context,
            values,
            intent: SaveIntent::Unknown,
            options: SaveOptions::default(),
        })
    }

    /// Builds an empty record to be inserted.
    ///
    /// Every cell starts NULL and clean; only cells set afterwards are
    /// inserted.
    pub fn new_insert(context: Arc<RowContext>) -> Result<Self> {
        if context.is_read_only() {
            return Err(Error::ReadOnlySource);
        }
        let values: Vec<Value> = context
            .schema()
            .columns()
            .iter()
            .enumerate()
            .map(|(i, col)| Value::for_column(col, i + 1, None))
            .collect();
        Ok(Self {
            clean: vec![true; values.len()],
            context,
            values,
            intent: SaveIntent::Insert,
            options: SaveOptions::default(),
        })
    }

    /// Replaces the save options.
    #[must_use]
    pub const fn with_options(mut self, options: SaveOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the save options in place.
    pub fn set_options(&mut self, options: SaveOptions) {
        self.options = options;
    }

    /// Current save options.
    #[must_use]
    pub const fn options(&self) -> SaveOptions {
        self.options
    }

    /// The shared row context.
    #[must_use]
    pub const fn context(&self) -> &Arc<RowContext> {
        &self.context
    }

    /// The schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        self.context.schema()
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true for a record with no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All cells in column order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Cell of `column`.
    pub fn value(&self, column: impl ColumnRef) -> Result<&Value> {
        let pos = column.position(self.schema())?;
        Ok(&self.values[pos - 1])
    }

    /// Pending save action.
    #[must_use]
    pub const fn intent(&self) -> SaveIntent {
        self.intent
    }

    /// Stores a value and marks the cell dirty.
    pub fn set_value(&mut self, column: impl ColumnRef, value: impl ToDatum) -> Result<&mut Self> {
        let pos = column.position(self.schema())?;
        self.store(pos, value.to_datum());
        Ok(self)
    }

    /// Stores NULL and marks the cell dirty.
    pub fn set_null(&mut self, column: impl ColumnRef) -> Result<&mut Self> {
        let pos = column.position(self.schema())?;
        self.store(pos, None);
        Ok(self)
    }

    /// Stores several values by column name.
    pub fn set_values<K, V>(
        &mut self,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<&mut Self>
    where
        K: AsRef<str>,
        V: ToDatum,
    {
        for (name, value) in values {
            self.set_value(name.as_ref(), value)?;
        }
        Ok(self)
    }

    /// Stores a value if a column called `name` exists, ignoring case.
    ///
    /// Returns whether a column matched.
    pub fn set_value_quiet(&mut self, name: &str, value: impl ToDatum) -> bool {
        match self.schema().find_ignore_case_quiet(name) {
            Some(pos) => {
                self.store(pos, value.to_datum());
                true
            }
            None => false,
        }
    }

    /// Marks one cell clean.
    pub fn mark_value_clean(&mut self, column: impl ColumnRef) -> Result<()> {
        let pos = column.position(self.schema())?;
        self.clean[pos - 1] = true;
        Ok(())
    }

    /// Marks one cell dirty.
    pub fn mark_value_dirty(&mut self, column: impl ColumnRef) -> Result<()> {
        let pos = column.position(self.schema())?;
        self.clean[pos - 1] = false;
        Ok(())
    }

    /// Returns true if the cell has not changed since load or save.
    pub fn value_is_clean(&self, column: impl ColumnRef) -> Result<bool> {
        let pos = column.position(self.schema())?;
        Ok(self.clean[pos - 1])
    }

    /// Marks every cell clean.
    pub fn mark_record_clean(&mut self) {
        self.clean.fill(true);
    }

    /// Returns true when no cell is dirty.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.clean.iter().all(|clean| *clean)
    }

    /// Returns true when [`Record::save`] would send a statement.
    #[must_use]
    pub fn needs_to_be_saved(&self) -> bool {
        match self.intent {
            SaveIntent::Zombie => false,
            SaveIntent::Delete => true,
            SaveIntent::Unknown | SaveIntent::Insert | SaveIntent::Update => !self.is_clean(),
        }
    }

    /// Returns true once the row has been deleted.
    #[must_use]
    pub fn is_zombie(&self) -> bool {
        self.intent == SaveIntent::Zombie
    }

    /// Requests an INSERT on the next save.
    pub fn mark_for_insert(&mut self) -> Result<()> {
        self.mark(SaveIntent::Insert)
    }

    /// Requests an UPDATE on the next save.
    pub fn mark_for_update(&mut self) -> Result<()> {
        self.mark(SaveIntent::Update)
    }

    /// Requests a DELETE on the next save.
    pub fn mark_for_delete(&mut self) -> Result<()> {
        self.mark(SaveIntent::Delete)
    }

    /// Clears any pending intent.
    pub fn unmark(&mut self) -> Result<()> {
        if self.is_zombie() {
            return Err(Error::AlreadyDeleted);
        }
        self.intent = SaveIntent::Unknown;
        Ok(())
    }

    fn mark(&mut self, intent: SaveIntent) -> Result<()> {
        self.writable_key()?;
        self.intent = intent;
        Ok(())
    }

    /// Cells of the primary key columns, by key ordinal.
    #[must_use]
    pub fn primary_key_values(&self) -> Vec<&Value> {
        let mut keys: Vec<(u32, &Value)> = self
            .schema()
            .columns()
            .iter()
            .zip(&self.values)
            .filter(|(col, _)| col.is_primary_key())
            .map(|(col, value)| (col.primary_key, value))
            .collect();
        keys.sort_by_key(|(ordinal, _)| *ordinal);
        keys.into_iter().map(|(_, value)| value).collect()
    }

    /// `INSERT INTO t ( a, b ) VALUES ( ?, ? )` over the dirty, writable
    /// cells.
    pub fn insert_statement(&self) -> Result<Statement> {
        self.writable_key()?;
        let table = self.schema().full_table_name()?;

        let mut columns = Vec::new();
        let mut params = Vec::new();
        for pos in self.dirty_writable() {
            columns.push(self.column(pos).name.as_str());
            params.push(self.values[pos - 1].to_param()?);
        }
        if columns.is_empty() {
            return Err(Error::NothingToSave("insert"));
        }

        let markers = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {table} ( {} ) VALUES ( {markers} )",
            columns.join(", ")
        );
        Ok(Statement::new(sql, params))
    }

    /// `UPDATE t SET a = ? WHERE k = ?` over the dirty, writable cells.
    pub fn update_statement(&self) -> Result<Statement> {
        let key = self.writable_key()?;
        if key.is_empty() {
            return Err(Error::MissingKeyDef("update"));
        }
        self.check_key_clean(key)?;
        let table = self.schema().full_table_name()?;

        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for pos in self.dirty_writable() {
            assignments.push(format!("{} = ?", self.column(pos).name));
            params.push(self.values[pos - 1].to_param()?);
        }
        if assignments.is_empty() {
            return Err(Error::NothingToSave("update"));
        }

        let (filter, key_params) = self.key_filter(key)?;
        params.extend(key_params);
        let sql = format!("UPDATE {table} SET {}{filter}", assignments.join(", "));
        Ok(Statement::new(sql, params))
    }

    /// `DELETE FROM t WHERE k = ?`.
    pub fn delete_statement(&self) -> Result<Statement> {
        let key = self.writable_key()?;
        if key.is_empty() {
            return Err(Error::MissingKeyDef("delete"));
        }
        let table = self.schema().full_table_name()?;
        let (filter, params) = self.key_filter(key)?;
        Ok(Statement::new(format!("DELETE FROM {table}{filter}"), params))
    }

    /// `SELECT a, b FROM t WHERE k = ?`, re-reading this row.
    pub fn refresh_statement(&self) -> Result<Statement> {
        let key = self.writable_key()?;
        if self.intent == SaveIntent::Insert {
            return Err(Error::RefreshPendingInsert);
        }
        if key.is_empty() {
            return Err(Error::MissingKeyDef("refresh"));
        }
        self.check_key_clean(key)?;
        self.select_by_key(key)
    }

    /// Writes the row according to its intent.
    ///
    /// Returns the number of affected rows, 0 when nothing needed saving.
    pub async fn save<C: Connector>(&mut self, conn: &C) -> Result<u64> {
        if self.context.is_read_only() {
            return Err(Error::ReadOnlySource);
        }
        if !self.needs_to_be_saved() {
            return Ok(0);
        }
        match self.intent {
            SaveIntent::Insert => self.save_with_insert(conn).await,
            SaveIntent::Update => self.save_with_update(conn).await,
            SaveIntent::Delete => self.save_with_delete(conn).await,
            SaveIntent::Unknown => {
                self.mark_for_update()?;
                self.save_with_update(conn).await
            }
            SaveIntent::Zombie => Ok(0),
        }
    }

    /// Inserts the row.
    ///
    /// With [`SaveOptions::generated_keys`] the generated key is stored in
    /// the primary key column; the table must then have at most one.
    pub async fn save_with_insert<C: Connector>(&mut self, conn: &C) -> Result<u64> {
        let key_position = if self.options.generated_keys {
            self.generated_key_position()?
        } else {
            None
        };
        let stmt = self.insert_statement()?;
        let result = execute(conn, &stmt).await?;

        if let (Some(pos), Some(key)) = (key_position, result.generated_key) {
            if result.rows_affected > 0 {
                self.store(pos, Some(Datum::Long(key)));
            }
        }
        self.after_write(conn).await?;
        check_row_count("INSERT", result.rows_affected)
    }

    /// Updates the row by its key.
    pub async fn save_with_update<C: Connector>(&mut self, conn: &C) -> Result<u64> {
        let stmt = self.update_statement()?;
        let result = execute(conn, &stmt).await?;
        self.after_write(conn).await?;
        check_row_count("UPDATE", result.rows_affected)
    }

    /// Deletes the row by its key; the record becomes a zombie.
    pub async fn save_with_delete<C: Connector>(&mut self, conn: &C) -> Result<u64> {
        let stmt = self.delete_statement()?;
        let result = execute(conn, &stmt).await?;
        self.intent = SaveIntent::Zombie;
        check_row_count("DELETE", result.rows_affected)
    }

    /// Re-reads every cell from the database.
    ///
    /// Rows pending deletion are left alone. Afterwards all cells are
    /// clean and the intent is reset.
    pub async fn refresh<C: Connector>(&mut self, conn: &C) -> Result<()> {
        if self.intent == SaveIntent::Delete && !self.context.is_read_only() {
            return Ok(());
        }
        let stmt = self.refresh_statement()?;
        self.load(conn, &stmt).await
    }

    async fn after_write<C: Connector>(&mut self, conn: &C) -> Result<()> {
        self.intent = SaveIntent::Unknown;
        if self.options.refresh_on_save {
            let key = self.writable_key()?;
            let stmt = self.select_by_key(key)?;
            self.load(conn, &stmt).await
        } else {
            self.mark_record_clean();
            Ok(())
        }
    }

    async fn load<C: Connector>(&mut self, conn: &C, stmt: &Statement) -> Result<()> {
        debug!(sql = %stmt.sql, "Refreshing record");
        let rows = conn.query(&stmt.sql, &stmt.params).await?;
        let row = rows.rows.into_iter().next().ok_or_else(|| {
            Error::RowNotFound(self.schema().full_table_name().unwrap_or_default())
        })?;
        self.values = read_values(self.context.schema(), row)?;
        self.mark_record_clean();
        self.intent = SaveIntent::Unknown;
        Ok(())
    }

    fn store(&mut self, pos: usize, datum: Option<Datum>) {
        let column = Arc::clone(self.column(pos));
        self.values[pos - 1] = Value::for_column(&column, pos, datum);
        self.clean[pos - 1] = false;
    }

    fn column(&self, pos: usize) -> &Arc<Column> {
        &self.schema().columns()[pos - 1]
    }

    fn dirty_writable(&self) -> impl Iterator<Item = usize> + '_ {
        self.schema()
            .columns()
            .iter()
            .enumerate()
            .filter(|(i, col)| !self.clean[*i] && !col.read_only)
            .map(|(i, _)| i + 1)
    }

    /// Key definition, if this record may be written.
    fn writable_key(&self) -> Result<&KeyDef> {
        if self.is_zombie() {
            return Err(Error::AlreadyDeleted);
        }
        self.context.key_def().ok_or(Error::ReadOnlySource)
    }

    fn check_key_clean(&self, key: &KeyDef) -> Result<()> {
        for name in key.iter() {
            let pos = self.schema().index_of(name)?;
            if !self.clean[pos - 1] {
                return Err(Error::KeyColumnDirty(name.to_string()));
            }
        }
        Ok(())
    }

    fn key_filter(&self, key: &KeyDef) -> Result<(String, Vec<Param>)> {
        let mut terms = Vec::with_capacity(key.len());
        let mut params = Vec::with_capacity(key.len());
        for name in key.iter() {
            let value = self.value(name)?;
            terms.push(format!("{name} = ?"));
            params.push(value.to_param()?);
        }
        Ok((format!(" WHERE {}", terms.join(" AND ")), params))
    }

    fn select_by_key(&self, key: &KeyDef) -> Result<Statement> {
        for name in key.iter() {
            if self.value(name)?.is_null() {
                return Err(Error::MissingKeyValue(format!(
                    "The value for key column '{name}' is null; the record cannot be refreshed."
                )));
            }
        }
        let table = self.schema().full_table_name()?;
        let columns: Vec<&str> = self
            .schema()
            .columns()
            .iter()
            .map(|col| col.name.as_str())
            .collect();
        let (filter, params) = self.key_filter(key)?;
        let sql = format!("SELECT {} FROM {table}{filter}", columns.join(", "));
        Ok(Statement::new(sql, params))
    }

    fn generated_key_position(&self) -> Result<Option<usize>> {
        let keys: Vec<usize> = self
            .schema()
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, col)| col.is_primary_key())
            .map(|(i, _)| i + 1)
            .collect();
        match keys.as_slice() {
            [] => Ok(None),
            [pos] => Ok(Some(*pos)),
            many => Err(Error::GeneratedKeyColumns(many.len())),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self.values.iter().map(|v| format!("'{v}'")).collect();
        write!(f, "{{{}}}", cells.join(","))
    }
}

fn read_values(schema: &Schema, row: Vec<Option<Datum>>) -> Result<Vec<Value>> {
    if row.len() != schema.len() {
        return Err(Error::IllegalState(format!(
            "row has {} cells but the schema has {} columns",
            row.len(),
            schema.len()
        )));
    }
    schema
        .columns()
        .iter()
        .zip(row)
        .enumerate()
        .map(|(i, (col, raw))| Value::extract(col, i + 1, raw))
        .collect()
}

async fn execute<C: Connector>(conn: &C, stmt: &Statement) -> Result<ExecuteResult> {
    debug!(sql = %stmt.sql, params = stmt.params.len(), "Executing statement");
    conn.execute(&stmt.sql, &stmt.params).await
}

fn check_row_count(operation: &'static str, count: u64) -> Result<u64> {
    if count > 1 {
        warn!(operation, count, "Statement affected more than one row");
        return Err(Error::UnexpectedRowCount { operation, count });
    }
    Ok(count)
}
