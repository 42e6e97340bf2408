//! The database connector seam.
//!
//! Everything that touches a live database goes through [`Connector`]:
//! running statements and reading table metadata. Pooling, transactions
//! and driver selection belong to the implementation.

use oxide_rowset_core::{ColumnDescriptor, Datum, Param, Result};

/// Rows returned by a query, with the shape of the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    /// Result columns in order.
    pub columns: Vec<ColumnDescriptor>,
    /// Raw rows; `None` is SQL NULL.
    pub rows: Vec<Vec<Option<Datum>>>,
}

/// Outcome of an INSERT, UPDATE or DELETE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteResult {
    /// Rows the statement changed.
    pub rows_affected: u64,
    /// Key generated by an INSERT, when the driver reports one.
    pub generated_key: Option<i64>,
}

/// A table or view reported by the connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    /// Owning schema.
    pub schema: Option<String>,
    /// Table name in the database's own casing.
    pub name: String,
    /// `TABLE`, `VIEW`, ...
    pub kind: String,
}

/// One column of a primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyColumn {
    /// Column name.
    pub column: String,
    /// 1-based position inside the key.
    pub sequence: u32,
}

/// Owner schema assumed for primary key lookups in [`MetadataDialect::SqlServer`].
pub const SQL_SERVER_OWNER: &str = "dbo";

/// How primary key metadata is looked up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetadataDialect {
    /// Ask for the given catalog, schema and table.
    #[default]
    Generic,
    /// Table names may be written `catalog..table`; the owner schema is
    /// always [`SQL_SERVER_OWNER`].
    SqlServer,
}

impl MetadataDialect {
    /// Picks the dialect from a driver signature such as a driver or
    /// connector type name.
    #[must_use]
    pub fn detect(signature: &str) -> Self {
        if signature.to_ascii_lowercase().contains("jtds") {
            Self::SqlServer
        } else {
            Self::Generic
        }
    }
}

/// A live database connection.
///
/// Statements use `?` markers bound in order from `params`. Resources
/// acquired for one call are released before it returns.
#[allow(async_fn_in_trait)]
pub trait Connector {
    /// Connection URL. Identifies the database in cache keys.
    fn url(&self) -> &str;

    /// Primary key lookup strategy.
    fn dialect(&self) -> MetadataDialect {
        MetadataDialect::Generic
    }

    /// Current catalog, if the database has catalogs.
    fn catalog(&self) -> Option<&str> {
        None
    }

    /// Runs a query and returns all of its rows.
    async fn query(&self, sql: &str, params: &[Param]) -> Result<RowSet>;

    /// Prepares `sql` and reports its result shape without fetching.
    async fn describe(&self, sql: &str) -> Result<Vec<ColumnDescriptor>>;

    /// Runs an INSERT, UPDATE or DELETE.
    async fn execute(&self, sql: &str, params: &[Param]) -> Result<ExecuteResult>;

    /// Schema names known to the database.
    async fn schemas(&self) -> Result<Vec<String>>;

    /// Tables in `schema` (all schemas when `None`) whose kind is one of
    /// `kinds`.
    async fn tables(&self, schema: Option<&str>, kinds: &[&str]) -> Result<Vec<TableInfo>>;

    /// Primary key columns of a table.
    async fn primary_keys(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<PrimaryKeyColumn>>;

    /// Columns of a table, in table order.
    async fn columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnDescriptor>>;
}
