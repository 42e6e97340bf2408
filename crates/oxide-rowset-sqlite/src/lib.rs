//! # oxide-rowset-sqlite
//!
//! A [`Connector`] over a `sqlx` SQLite pool.
//!
//! ```ignore
//! use oxide_rowset::{DataSet, MetadataCache, TableDataSet};
//! use oxide_rowset_sqlite::SqliteConnector;
//!
//! let conn = SqliteConnector::connect("sqlite::memory:").await?;
//! let cache = MetadataCache::new();
//! let mut users = TableDataSet::new(&conn, &cache, "users").await?;
//! users.fetch_records().await?;
//! ```
//!
//! SQLite reports no table origin for result columns, so schemas built
//! from arbitrary queries carry no primary key information. Declared
//! `INTEGER` columns map to [`SqlType::BigInt`] and `REAL` columns to
//! [`SqlType::Double`], matching SQLite's 64-bit storage classes.

use oxide_rowset::{
    ColumnDescriptor, Connector, Datum, Error, ExecuteResult, Param, PrimaryKeyColumn, Result,
    RowSet, SqlType, TableInfo,
};
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteColumn, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::query::Query;
use sqlx::{Column as _, Executor, Row, Statement as _, TypeInfo, ValueRef};
use tracing::debug;

/// Database connector backed by a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    pool: SqlitePool,
    url: String,
}

impl SqliteConnector {
    /// Opens a pool on `url`.
    ///
    /// In-memory databases get a single connection so every statement
    /// sees the same database.
    pub async fn connect(url: &str) -> Result<Self> {
        let mut options = SqlitePoolOptions::new();
        if url.contains(":memory:") {
            options = options.max_connections(1);
        }
        let pool = options.connect(url).await.map_err(Error::connector)?;
        Ok(Self::new(pool, url))
    }

    /// Wraps an existing pool. `url` identifies the database in cache keys.
    #[must_use]
    pub fn new(pool: SqlitePool, url: impl Into<String>) -> Self {
        Self {
            pool,
            url: url.into(),
        }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Connector for SqliteConnector {
    fn url(&self) -> &str {
        &self.url
    }

    async fn query(&self, sql: &str, params: &[Param]) -> Result<RowSet> {
        debug!(sql = %sql, params = params.len(), "Executing query");
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(Error::connector)?;

        let columns = rows.first().map(describe_row).unwrap_or_default();
        let rows = rows.iter().map(decode_row).collect::<Result<Vec<_>>>()?;
        Ok(RowSet { columns, rows })
    }

    async fn describe(&self, sql: &str) -> Result<Vec<ColumnDescriptor>> {
        let stmt = self.pool.prepare(sql).await.map_err(Error::connector)?;
        Ok(stmt.columns().iter().map(descriptor).collect())
    }

    async fn execute(&self, sql: &str, params: &[Param]) -> Result<ExecuteResult> {
        debug!(sql = %sql, params = params.len(), "Executing statement");
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }
        let result = query.execute(&self.pool).await.map_err(Error::connector)?;

        let is_insert = sql.trim_start().to_ascii_uppercase().starts_with("INSERT");
        Ok(ExecuteResult {
            rows_affected: result.rows_affected(),
            generated_key: (is_insert && result.rows_affected() > 0)
                .then(|| result.last_insert_rowid()),
        })
    }

    async fn schemas(&self) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT name FROM pragma_database_list ORDER BY seq")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::connector)
    }

    async fn tables(&self, schema: Option<&str>, kinds: &[&str]) -> Result<Vec<TableInfo>> {
        let master = schema.map_or_else(
            || "sqlite_master".to_string(),
            |s| format!("\"{}\".sqlite_master", s.replace('"', "\"\"")),
        );
        let sql = format!(
            "SELECT name, type FROM {master} \
             WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' ORDER BY name"
        );
        let rows: Vec<(String, String)> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::connector)?;

        Ok(rows
            .into_iter()
            .map(|(name, kind)| TableInfo {
                schema: schema.map(str::to_string),
                name,
                kind: kind.to_ascii_uppercase(),
            })
            .filter(|info| kinds.iter().any(|k| k.eq_ignore_ascii_case(&info.kind)))
            .collect())
    }

    async fn primary_keys(
        &self,
        _catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<PrimaryKeyColumn>> {
        let rows: Vec<(String, i64)> = table_info_query(
            "SELECT name, pk FROM pragma_table_info(?1, ?2) WHERE pk > 0 ORDER BY pk",
            schema,
            table,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::connector)?;

        rows.into_iter()
            .map(|(column, pk)| {
                let sequence = u32::try_from(pk).map_err(Error::connector)?;
                Ok(PrimaryKeyColumn { column, sequence })
            })
            .collect()
    }

    async fn columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let rows: Vec<(String, String, i64)> = table_info_query(
            "SELECT name, type, \"notnull\" FROM pragma_table_info(?1, ?2) ORDER BY cid",
            schema,
            table,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::connector)?;

        Ok(rows
            .into_iter()
            .map(|(name, type_name, not_null)| {
                let desc = ColumnDescriptor::new(name, sql_type(&type_name))
                    .table(table)
                    .type_name(type_name)
                    .nullable(not_null == 0);
                match schema {
                    Some(schema) => desc.schema(schema),
                    None => desc,
                }
            })
            .collect())
    }
}

/// Query over `pragma_table_info`; a missing schema searches `main`.
fn table_info_query<'q, O>(
    sql: &'q str,
    schema: Option<&'q str>,
    table: &'q str,
) -> sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>>
where
    O: for<'r> sqlx::FromRow<'r, SqliteRow>,
{
    sqlx::query_as(sql).bind(table).bind(schema.unwrap_or("main"))
}

/// Maps a SQLite type name to a type tag.
fn sql_type(type_name: &str) -> SqlType {
    match SqlType::from_type_name(type_name) {
        SqlType::Integer => SqlType::BigInt,
        SqlType::Real => SqlType::Double,
        SqlType::Null => SqlType::Other,
        other => other,
    }
}

fn bind_param<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    param: &Param,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match param {
        Param::Null(_) => query.bind(Option::<i64>::None),
        Param::Bool(b) => query.bind(*b),
        Param::TinyInt(v) => query.bind(i32::from(*v)),
        Param::SmallInt(v) => query.bind(i32::from(*v)),
        Param::Int(v) => query.bind(*v),
        Param::BigInt(v) => query.bind(*v),
        Param::Real(v) => query.bind(f64::from(*v)),
        Param::Double(v) => query.bind(*v),
        Param::Decimal(v) => query.bind(v.to_string()),
        Param::Bytes(v) => query.bind(v.clone()),
        Param::Text(v) => query.bind(v.clone()),
        Param::Date(v) => query.bind(*v),
        Param::Time(v) => query.bind(*v),
        Param::Timestamp(v) => query.bind(*v),
    }
}

fn describe_row(row: &SqliteRow) -> Vec<ColumnDescriptor> {
    row.columns().iter().map(descriptor).collect()
}

fn descriptor(col: &SqliteColumn) -> ColumnDescriptor {
    let type_name = col.type_info().name();
    ColumnDescriptor::new(col.name(), sql_type(type_name)).type_name(type_name)
}

/// Decodes each cell by its runtime storage class.
fn decode_row(row: &SqliteRow) -> Result<Vec<Option<Datum>>> {
    (0..row.len())
        .map(|i| {
            let raw = row.try_get_raw(i).map_err(Error::connector)?;
            if raw.is_null() {
                return Ok(None);
            }
            let storage = raw.type_info().name().to_string();
            let datum = match storage.as_str() {
                "INTEGER" => Datum::Long(row.try_get_unchecked(i).map_err(Error::connector)?),
                "REAL" => Datum::Double(row.try_get_unchecked(i).map_err(Error::connector)?),
                "BLOB" => Datum::Bytes(row.try_get_unchecked(i).map_err(Error::connector)?),
                _ => Datum::Text(row.try_get_unchecked(i).map_err(Error::connector)?),
            };
            Ok(Some(datum))
        })
        .collect()
}
