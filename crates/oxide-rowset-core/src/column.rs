//! Column metadata.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::types::SqlType;

/// Metadata of one result column.
///
/// Equality and hashing use the column name only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Owning table name, empty when unknown.
    pub table_name: String,
    /// Type tag.
    pub sql_type: SqlType,
    /// Type name reported by the driver.
    pub type_name: String,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Whether the column is excluded from INSERT and UPDATE.
    pub read_only: bool,
    /// Position inside the primary key, 0 when not part of it.
    pub primary_key: u32,
}

impl Column {
    /// Creates a nullable, writable, non-key column.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            table_name: String::new(),
            sql_type,
            type_name: sql_type.name().to_string(),
            nullable: true,
            read_only: false,
            primary_key: 0,
        }
    }

    /// Sets the owning table.
    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table_name = table.into();
        self
    }

    /// Sets the driver type name.
    #[must_use]
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Sets nullability.
    #[must_use]
    pub const fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Marks the column read-only.
    #[must_use]
    pub const fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Places the column at `ordinal` (1-based) inside the primary key.
    #[must_use]
    pub const fn primary_key(mut self, ordinal: u32) -> Self {
        self.primary_key = ordinal;
        self
    }

    /// Returns true when the column is part of the primary key.
    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.primary_key > 0
    }

    /// Returns true for numeric columns.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.sql_type.is_numeric()
    }

    /// Returns true for character columns.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        self.sql_type.is_string()
    }

    /// Returns true for date, time and timestamp columns.
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        self.sql_type.is_temporal()
    }

    /// Returns true for boolean columns.
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        matches!(self.sql_type, SqlType::Boolean)
    }

    /// Returns true for binary columns.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        self.sql_type.is_binary()
    }

    /// Host family label, e.g. `INTEGER` or `STRING`.
    #[must_use]
    pub fn type_label(&self) -> String {
        self.sql_type.label().map_or_else(
            || format!("UNKNOWN TYPE: {}", self.sql_type),
            str::to_string,
        )
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Column{{name={}, columnType={}, tableName={}, nullAllowed={}, readOnly={}}}",
            self.name,
            self.type_label(),
            self.table_name,
            self.nullable,
            self.read_only
        )
    }
}

/// One column of a result shape, as reported by a connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name or label.
    pub name: String,
    /// Owning table, when the driver reports it.
    pub table_name: Option<String>,
    /// Owning schema, when the driver reports it.
    pub schema_name: Option<String>,
    /// Type tag.
    pub sql_type: SqlType,
    /// Driver type name.
    pub type_name: String,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Whether the column can be written.
    pub read_only: bool,
}

impl ColumnDescriptor {
    /// Creates a descriptor with no table origin.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            table_name: None,
            schema_name: None,
            sql_type,
            type_name: sql_type.name().to_string(),
            nullable: true,
            read_only: false,
        }
    }

    /// Sets the owning table.
    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table_name = Some(table.into());
        self
    }

    /// Sets the owning schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    /// Sets the driver type name.
    #[must_use]
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Sets nullability.
    #[must_use]
    pub const fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Builds a [`Column`] owned by `table`.
    #[must_use]
    pub fn to_column(&self, table: &str, primary_key: u32) -> Column {
        Column {
            name: self.name.clone(),
            table_name: table.to_string(),
            sql_type: self.sql_type,
            type_name: self.type_name.clone(),
            nullable: self.nullable,
            read_only: self.read_only,
            primary_key,
        }
    }
}
