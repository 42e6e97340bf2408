//! Outbound statement parameters.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::datum::Datum;
use crate::types::SqlType;

/// A typed value bound into a `?` slot of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// SQL NULL of the given type.
    Null(SqlType),
    /// Boolean.
    Bool(bool),
    /// TINYINT.
    TinyInt(i8),
    /// SMALLINT.
    SmallInt(i16),
    /// INTEGER.
    Int(i32),
    /// BIGINT.
    BigInt(i64),
    /// REAL.
    Real(f32),
    /// DOUBLE.
    Double(f64),
    /// NUMERIC / DECIMAL.
    Decimal(Decimal),
    /// Binary.
    Bytes(Vec<u8>),
    /// Character data.
    Text(String),
    /// DATE.
    Date(NaiveDate),
    /// TIME.
    Time(NaiveTime),
    /// TIMESTAMP.
    Timestamp(NaiveDateTime),
}

impl Param {
    /// Returns true for [`Param::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }

    /// Converts the parameter back into a cell payload.
    #[must_use]
    pub fn into_datum(self) -> Option<Datum> {
        Some(match self {
            Self::Null(_) => return None,
            Self::Bool(v) => Datum::Bool(v),
            Self::TinyInt(v) => Datum::Byte(v),
            Self::SmallInt(v) => Datum::Short(v),
            Self::Int(v) => Datum::Int(v),
            Self::BigInt(v) => Datum::Long(v),
            Self::Real(v) => Datum::Float(v),
            Self::Double(v) => Datum::Double(v),
            Self::Decimal(v) => Datum::Decimal(v),
            Self::Bytes(v) => Datum::Bytes(v),
            Self::Text(v) => Datum::Text(v),
            Self::Date(v) => Datum::Date(v),
            Self::Time(v) => Datum::Time(v),
            Self::Timestamp(v) => Datum::Timestamp(v),
        })
    }
}

impl From<Datum> for Param {
    fn from(datum: Datum) -> Self {
        match datum {
            Datum::Bool(v) => Self::Bool(v),
            Datum::Byte(v) => Self::TinyInt(v),
            Datum::Short(v) => Self::SmallInt(v),
            Datum::Int(v) => Self::Int(v),
            Datum::Long(v) => Self::BigInt(v),
            Datum::Float(v) => Self::Real(v),
            Datum::Double(v) => Self::Double(v),
            Datum::Decimal(v) => Self::Decimal(v),
            Datum::Bytes(v) => Self::Bytes(v),
            Datum::Text(v) => Self::Text(v),
            Datum::Date(v) => Self::Date(v),
            Datum::Time(v) => Self::Time(v),
            Datum::Timestamp(v) => Self::Timestamp(v),
        }
    }
}

/// A SQL statement with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text with `?` markers.
    pub sql: String,
    /// Parameters in marker order.
    pub params: Vec<Param>,
}

impl Statement {
    /// Creates a statement.
    #[must_use]
    pub fn new(sql: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}
