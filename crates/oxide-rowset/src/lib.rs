//! # oxide-rowset
//!
//! Dirty-tracked row access over SQL tables.
//!
//! This crate provides:
//! - `Connector`, the seam to a live database
//! - `MetadataCache` for table schemas and primary key ordinals
//! - `Record`, one row with per-cell change tracking that saves itself as
//!   INSERT, UPDATE or DELETE
//! - `QueryDataSet` and `TableDataSet` to fetch and save many rows
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_rowset::{DataSet, MetadataCache, TableDataSet};
//!
//! async fn example(conn: &impl oxide_rowset::Connector) -> oxide_rowset::Result<()> {
//!     let cache = MetadataCache::new();
//!
//!     let mut users = TableDataSet::new(conn, &cache, "users").await?;
//!     users.where_clause("active = 1").order("name");
//!     users.fetch_records().await?;
//!
//!     // Change a cell; the next save sends an UPDATE by primary key
//!     users.record_mut(0)?.set_value("name", "Alice")?;
//!
//!     // New rows are inserted
//!     users.add_record()?.set_value("name", "Bob")?;
//!
//!     users.save().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Templates
//!
//! ```ignore
//! use std::collections::HashMap;
//! use oxide_rowset::{Datum, QueryDataSet};
//!
//! let values = HashMap::from([("app".to_string(), Datum::Text("web".into()))]);
//! let mut rows = QueryDataSet::with_macros(
//!     conn,
//!     &cache,
//!     "SELECT * FROM transcode WHERE app = ${app} AND tipo = ${tipo:int}",
//!     &values,
//! )
//! .await?;
//! ```

pub mod cache;
pub mod connector;
pub mod dataset;
pub mod record;

pub use cache::{CacheKey, MetadataCache, PrimaryKeyCache, PrimaryKeyMap, SchemaCache, NO_SCHEMA};
pub use connector::{
    Connector, ExecuteResult, MetadataDialect, PrimaryKeyColumn, RowSet, TableInfo,
    SQL_SERVER_OWNER,
};
pub use dataset::{DataSet, QueryDataSet, RecordSet, TableDataSet, ALL_RECORDS};
pub use record::{ColumnRef, Record, RowContext, RowSource, SaveIntent, SaveOptions};

// Re-export the data model from oxide-rowset-core
pub use oxide_rowset_core::{
    resolve, Column, ColumnDescriptor, ConversionPolicy, Datum, Error, ErrorKind, KeyDef, Param,
    Result, Schema, SqlType, Statement, ToDatum, Value, TABLES_FILTER, TABLES_VIEWS_FILTER,
    VIEWS_FILTER,
};
