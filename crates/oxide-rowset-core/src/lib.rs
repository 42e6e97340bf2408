//! # oxide-rowset-core
//!
//! The data model behind dirty-tracked row access: typed cells, column
//! metadata, key definitions, schemas and SQL templates with named
//! placeholders. Nothing in this crate performs I/O; the `oxide-rowset`
//! crate drives it against a database connector.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use oxide_rowset_core::{Column, Datum, Schema, SqlType, Value};
//!
//! let columns = vec![
//!     Arc::new(Column::new("id", SqlType::BigInt).table("users").primary_key(1)),
//!     Arc::new(Column::new("name", SqlType::VarChar).table("users")),
//! ];
//! let schema = Schema::from_columns(columns, Some("users"));
//! assert_eq!(schema.index_of("NAME").unwrap(), 2);
//!
//! let id = Value::extract(schema.column(1).unwrap(), 1, Some(Datum::Text("42".into()))).unwrap();
//! assert_eq!(id.as_i64().unwrap(), 42);
//! ```

pub mod column;
pub mod datum;
pub mod error;
pub mod keydef;
pub mod param;
pub mod schema;
pub mod template;
pub mod temporal;
pub mod types;
pub mod value;

pub use column::{Column, ColumnDescriptor};
pub use datum::{Datum, ToDatum};
pub use error::{BoxError, Error, ErrorKind, Result};
pub use keydef::KeyDef;
pub use param::{Param, Statement};
pub use schema::{Schema, TABLES_FILTER, TABLES_VIEWS_FILTER, VIEWS_FILTER};
pub use template::{resolve, MacroBinding, MacroType, ResolvedTemplate};
pub use types::SqlType;
pub use value::{is_true, ConversionPolicy, Value};
