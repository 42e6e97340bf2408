//! Result and table schemas.
//!
//! A [`Schema`] is the ordered column metadata behind one query. It may
//! span several tables when the query joins them. Positions are 1-based
//! and name lookups ignore case.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::column::Column;
use crate::error::{Error, Result};

/// Table kinds listed when looking for plain tables.
pub const TABLES_FILTER: &[&str] = &["TABLE"];

/// Table kinds listed when looking for views.
pub const VIEWS_FILTER: &[&str] = &["VIEW"];

/// Table kinds listed when looking for tables and views.
pub const TABLES_VIEWS_FILTER: &[&str] = &["TABLE", "VIEW"];

/// Ordered column metadata for one or more tables.
#[derive(Debug, Clone)]
pub struct Schema {
    table_name: String,
    schema_name: Option<String>,
    attributes: String,
    columns: Vec<Arc<Column>>,
    by_name: HashMap<String, usize>,
    by_qualified: HashMap<String, usize>,
    single_table: bool,
}

impl Schema {
    /// Assembles a schema from resolved columns.
    ///
    /// The schema's table name is `table_hint` when non-empty, then the
    /// first column's table, then the empty string.
    #[must_use]
    pub fn from_columns(columns: Vec<Arc<Column>>, table_hint: Option<&str>) -> Self {
        let single_table = columns
            .windows(2)
            .all(|pair| pair[0].table_name.eq_ignore_ascii_case(&pair[1].table_name));

        let table_name = table_hint
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| columns.first().map(|c| c.table_name.clone()))
            .unwrap_or_default();

        let mut by_name = HashMap::with_capacity(columns.len());
        let mut by_qualified = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            by_name.entry(col.name.to_lowercase()).or_insert(i + 1);
            if !col.table_name.is_empty() {
                by_qualified
                    .entry(qualified_key(&col.table_name, &col.name))
                    .or_insert(i + 1);
            }
        }

        Self {
            table_name,
            schema_name: None,
            attributes: "*".to_string(),
            columns,
            by_name,
            by_qualified,
            single_table,
        }
    }

    /// Sets the database schema the table lives in.
    #[must_use]
    pub fn with_schema_name(mut self, schema_name: Option<String>) -> Self {
        self.schema_name = schema_name.filter(|s| !s.is_empty());
        self
    }

    /// Sets the column list used in the originating SELECT.
    #[must_use]
    pub fn with_attributes(mut self, attributes: impl Into<String>) -> Self {
        self.attributes = attributes.into();
        self
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true when the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All columns in order.
    #[must_use]
    pub fn columns(&self) -> &[Arc<Column>] {
        &self.columns
    }

    /// Column at 1-based `position`.
    pub fn column(&self, position: usize) -> Result<&Arc<Column>> {
        position
            .checked_sub(1)
            .and_then(|i| self.columns.get(i))
            .ok_or(Error::ColumnOutOfRange {
                position,
                count: self.columns.len(),
            })
    }

    /// Column called `name`. Accepts `table.column`.
    pub fn column_named(&self, name: &str) -> Result<&Arc<Column>> {
        self.column(self.index_of(name)?)
    }

    /// Column `column` of table `table`.
    pub fn column_in_table(&self, table: &str, column: &str) -> Result<&Arc<Column>> {
        self.column(self.index_of_qualified(table, column)?)
    }

    /// 1-based position of `name`, or `None`.
    #[must_use]
    pub fn index_of_quiet(&self, name: &str) -> Option<usize> {
        let key = name.to_lowercase();
        self.by_name
            .get(&key)
            .or_else(|| self.by_qualified.get(&key))
            .copied()
    }

    /// 1-based position of `name`. Accepts `table.column`.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.index_of_quiet(name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    /// 1-based position of `column` in `table`.
    pub fn index_of_qualified(&self, table: &str, column: &str) -> Result<usize> {
        self.by_qualified
            .get(&qualified_key(table, column))
            .copied()
            .ok_or_else(|| Error::UnknownColumn(format!("{table}.{column}")))
    }

    /// First position whose column name equals `name` ignoring case,
    /// scanning in column order.
    #[must_use]
    pub fn find_ignore_case_quiet(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(name))
            .map(|i| i + 1)
    }

    /// Like [`Schema::find_ignore_case_quiet`], failing on a miss.
    pub fn find_ignore_case(&self, name: &str) -> Result<usize> {
        self.find_ignore_case_quiet(name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    /// Primary key columns sorted by key ordinal.
    #[must_use]
    pub fn primary_keys(&self) -> Vec<&Arc<Column>> {
        let mut keys: Vec<_> = self
            .columns
            .iter()
            .filter(|col| col.is_primary_key())
            .collect();
        keys.sort_by_key(|col| col.primary_key);
        keys
    }

    /// Returns true when every column comes from the same table.
    #[must_use]
    pub const fn is_single_table(&self) -> bool {
        self.single_table
    }

    /// The single table this schema represents.
    pub fn table_name(&self) -> Result<&str> {
        if self.single_table {
            Ok(&self.table_name)
        } else {
            Err(Error::MultipleTables)
        }
    }

    /// `schema.table`, or just the table when no schema is known.
    pub fn full_table_name(&self) -> Result<String> {
        let table = self.table_name()?;
        Ok(match &self.schema_name {
            Some(schema) => format!("{schema}.{table}"),
            None => table.to_string(),
        })
    }

    /// Database schema name, if any.
    #[must_use]
    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    /// Distinct table names in first-seen order.
    #[must_use]
    pub fn all_table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for col in &self.columns {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&col.table_name)) {
                names.push(&col.table_name);
            }
        }
        names
    }

    /// Column list used in the originating SELECT.
    #[must_use]
    pub fn attributes(&self) -> &str {
        &self.attributes
    }
}

fn qualified_key(table: &str, column: &str) -> String {
    format!("{}.{}", table.to_lowercase(), column.to_lowercase())
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .columns
            .iter()
            .map(|col| format!("'{}'", col.name))
            .collect();
        write!(f, "{{{}}}", names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;

    fn transcode() -> Schema {
        let columns = vec![
            Column::new("app", SqlType::VarChar).table("t").primary_key(1),
            Column::new("tipo", SqlType::VarChar).table("t").primary_key(2),
            Column::new("codice_app", SqlType::VarChar).table("t"),
            Column::new("codice_vero", SqlType::VarChar).table("t").primary_key(3),
        ];
        Schema::from_columns(columns.into_iter().map(Arc::new).collect(), Some("t"))
    }

    #[test]
    fn test_lookup_ignores_case() {
        let schema = transcode();
        assert_eq!(schema.index_of("APP").unwrap(), 1);
        assert_eq!(schema.index_of("t.Codice_App").unwrap(), 3);
        assert_eq!(schema.index_of_qualified("T", "codice_vero").unwrap(), 4);
        assert_eq!(schema.find_ignore_case("TIPO").unwrap(), 2);
        assert!(matches!(
            schema.index_of("missing"),
            Err(Error::UnknownColumn(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let columns = vec![
            Arc::new(Column::new("id", SqlType::BigInt).table("orders")),
            Arc::new(Column::new("ID", SqlType::BigInt).table("items")),
        ];
        let schema = Schema::from_columns(columns, None);
        assert_eq!(schema.index_of("id").unwrap(), 1);
        assert_eq!(schema.index_of("Id").unwrap(), schema.find_ignore_case("Id").unwrap());
        assert_eq!(schema.index_of_qualified("items", "id").unwrap(), 2);
    }

    #[test]
    fn test_positions_are_one_based() {
        let schema = transcode();
        assert_eq!(schema.column(1).unwrap().name, "app");
        assert!(matches!(
            schema.column(0),
            Err(Error::ColumnOutOfRange { position: 0, count: 4 })
        ));
        assert!(schema.column(5).is_err());
    }

    #[test]
    fn test_primary_keys_sorted_by_ordinal() {
        let columns = vec![
            Arc::new(Column::new("b", SqlType::Integer).primary_key(2)),
            Arc::new(Column::new("a", SqlType::Integer).primary_key(1)),
            Arc::new(Column::new("c", SqlType::Integer)),
        ];
        let schema = Schema::from_columns(columns, Some("x"));
        let names: Vec<_> = schema.primary_keys().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_multi_table_schema() {
        let columns = vec![
            Arc::new(Column::new("id", SqlType::BigInt).table("orders")),
            Arc::new(Column::new("name", SqlType::VarChar).table("ORDERS")),
            Arc::new(Column::new("sku", SqlType::VarChar).table("items")),
        ];
        let schema = Schema::from_columns(columns, None);
        assert!(!schema.is_single_table());
        assert!(matches!(schema.table_name(), Err(Error::MultipleTables)));
        assert_eq!(schema.all_table_names(), ["orders", "items"]);
    }

    #[test]
    fn test_table_name_fallback() {
        let columns = vec![Arc::new(Column::new("id", SqlType::BigInt).table("users"))];
        let schema = Schema::from_columns(columns.clone(), None);
        assert_eq!(schema.table_name().unwrap(), "users");

        let schema = Schema::from_columns(columns, Some("people"))
            .with_schema_name(Some("main".into()));
        assert_eq!(schema.table_name().unwrap(), "people");
        assert_eq!(schema.full_table_name().unwrap(), "main.people");

        let schema = Schema::from_columns(Vec::new(), None);
        assert_eq!(schema.table_name().unwrap(), "");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            transcode().to_string(),
            "{'app','tipo','codice_app','codice_vero'}"
        );
    }
}
