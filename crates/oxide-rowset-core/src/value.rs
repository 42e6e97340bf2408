//! Typed cells.
//!
//! A [`Value`] holds one column's payload together with the column's
//! [`SqlType`] tag and 1-based index. Reading a row and binding a
//! parameter go through the same tag switch ([`Value::extract`] and
//! [`Value::to_param`]), so what is written reads back unchanged.
//!
//! # Conversion policy
//!
//! - NULL converts to zero/false for primitive accessors and to `None`
//!   for the `_opt` and object accessors.
//! - Blank text converts to zero when
//!   [`ConversionPolicy::empty_string_is_zero`] is set; other text must
//!   parse strictly.
//! - Temporal accessors take the direct payload first, then parse text
//!   with [`crate::temporal`]. Unparseable text is
//!   [`Error::BadTimestamp`].
//! - Cross-family conversions that make no sense (a boolean as an
//!   integer, a number as a date) fail with [`Error::Conversion`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::column::Column;
use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::param::Param;
use crate::temporal;
use crate::types::SqlType;

/// Text accepted as boolean true, compared ignoring case.
const TRUE_WORDS: [&str; 6] = ["true", "t", "yes", "si", "y", "1"];

/// Returns true if `text` spells boolean true.
#[must_use]
pub fn is_true(text: &str) -> bool {
    let text = text.trim();
    TRUE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(text))
}

/// How text converts to numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionPolicy {
    /// Blank text converts to zero instead of failing.
    pub empty_string_is_zero: bool,
}

impl ConversionPolicy {
    /// Sets [`ConversionPolicy::empty_string_is_zero`].
    #[must_use]
    pub const fn empty_string_is_zero(mut self, enabled: bool) -> Self {
        self.empty_string_is_zero = enabled;
        self
    }
}

impl Default for ConversionPolicy {
    fn default() -> Self {
        Self {
            empty_string_is_zero: true,
        }
    }
}

/// One typed cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    datum: Option<Datum>,
    sql_type: SqlType,
    index: usize,
    column: Option<Arc<Column>>,
    policy: ConversionPolicy,
}

impl Value {
    /// Creates a cell from an explicit payload, without a column.
    #[must_use]
    pub fn new(sql_type: SqlType, index: usize, datum: Option<Datum>) -> Self {
        Self {
            datum,
            sql_type,
            index,
            column: None,
            policy: ConversionPolicy::default(),
        }
    }

    /// Creates a cell for `column` holding `datum` as given.
    #[must_use]
    pub fn for_column(column: &Arc<Column>, index: usize, datum: Option<Datum>) -> Self {
        Self {
            datum,
            sql_type: column.sql_type,
            index,
            column: Some(Arc::clone(column)),
            policy: ConversionPolicy::default(),
        }
    }

    /// Creates a cell from a raw driver value, normalizing the payload to
    /// the family of the column's type tag.
    pub fn extract(column: &Arc<Column>, index: usize, raw: Option<Datum>) -> Result<Self> {
        let mut value = Self::for_column(column, index, raw);
        value.datum = value.native()?;
        Ok(value)
    }

    /// Replaces the conversion policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ConversionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns true if the cell is NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.datum.is_none()
    }

    /// The payload.
    #[must_use]
    pub const fn datum(&self) -> Option<&Datum> {
        self.datum.as_ref()
    }

    /// Consumes the cell, returning the payload.
    #[must_use]
    pub fn into_datum(self) -> Option<Datum> {
        self.datum
    }

    /// Type tag of the owning column.
    #[must_use]
    pub const fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    /// 1-based column index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Owning column, if any.
    #[must_use]
    pub const fn column(&self) -> Option<&Arc<Column>> {
        self.column.as_ref()
    }

    /// Owning column name, empty when there is none.
    #[must_use]
    pub fn column_name(&self) -> &str {
        self.column.as_ref().map_or("", |c| c.name.as_str())
    }

    /// Returns true if the payload is a boolean.
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self.datum, Some(Datum::Bool(_)))
    }

    /// Returns true if the payload is an 8-bit integer.
    #[must_use]
    pub const fn is_i8(&self) -> bool {
        matches!(self.datum, Some(Datum::Byte(_)))
    }

    /// Returns true if the payload is a 16-bit integer.
    #[must_use]
    pub const fn is_i16(&self) -> bool {
        matches!(self.datum, Some(Datum::Short(_)))
    }

    /// Returns true if the payload is a 32-bit integer.
    #[must_use]
    pub const fn is_i32(&self) -> bool {
        matches!(self.datum, Some(Datum::Int(_)))
    }

    /// Returns true if the payload is a 64-bit integer.
    #[must_use]
    pub const fn is_i64(&self) -> bool {
        matches!(self.datum, Some(Datum::Long(_)))
    }

    /// Returns true if the payload is a single precision float.
    #[must_use]
    pub const fn is_f32(&self) -> bool {
        matches!(self.datum, Some(Datum::Float(_)))
    }

    /// Returns true if the payload is a double precision float.
    #[must_use]
    pub const fn is_f64(&self) -> bool {
        matches!(self.datum, Some(Datum::Double(_)))
    }

    /// Returns true if the payload is a decimal.
    #[must_use]
    pub const fn is_decimal(&self) -> bool {
        matches!(self.datum, Some(Datum::Decimal(_)))
    }

    /// Returns true if the payload is raw bytes.
    #[must_use]
    pub const fn is_bytes(&self) -> bool {
        matches!(self.datum, Some(Datum::Bytes(_)))
    }

    /// Returns true if the payload is text.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self.datum, Some(Datum::Text(_)))
    }

    /// Returns true if the payload is a date.
    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self.datum, Some(Datum::Date(_)))
    }

    /// Returns true if the payload is a time of day.
    #[must_use]
    pub const fn is_time(&self) -> bool {
        matches!(self.datum, Some(Datum::Time(_)))
    }

    /// Returns true if the payload is a timestamp.
    #[must_use]
    pub const fn is_timestamp(&self) -> bool {
        matches!(self.datum, Some(Datum::Timestamp(_)))
    }

    /// Text form of the payload.
    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        self.datum.as_ref().map(ToString::to_string)
    }

    /// Boolean form; NULL is `None`.
    #[must_use]
    pub fn as_bool_opt(&self) -> Option<bool> {
        match self.datum.as_ref()? {
            Datum::Bool(v) => Some(*v),
            other => Some(is_true(&other.to_string())),
        }
    }

    /// Boolean form; NULL is false.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        self.as_bool_opt().unwrap_or(false)
    }

    /// 8-bit integer form; NULL is `None`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i8_opt(&self) -> Result<Option<i8>> {
        match &self.datum {
            Some(Datum::Text(text)) => self.parse_text(text, "byte").map(Some),
            _ => Ok(self.integral("byte")?.map(|v| v as i8)),
        }
    }

    /// 8-bit integer form; NULL is 0.
    pub fn as_i8(&self) -> Result<i8> {
        self.as_i8_opt().map(Option::unwrap_or_default)
    }

    /// 16-bit integer form; NULL is `None`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i16_opt(&self) -> Result<Option<i16>> {
        match &self.datum {
            Some(Datum::Text(text)) => self.parse_text(text, "short").map(Some),
            _ => Ok(self.integral("short")?.map(|v| v as i16)),
        }
    }

    /// 16-bit integer form; NULL is 0.
    pub fn as_i16(&self) -> Result<i16> {
        self.as_i16_opt().map(Option::unwrap_or_default)
    }

    /// 32-bit integer form; NULL is `None`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i32_opt(&self) -> Result<Option<i32>> {
        match &self.datum {
            Some(Datum::Text(text)) => self.parse_text(text, "int").map(Some),
            _ => Ok(self.integral("int")?.map(|v| v as i32)),
        }
    }

    /// 32-bit integer form; NULL is 0.
    pub fn as_i32(&self) -> Result<i32> {
        self.as_i32_opt().map(Option::unwrap_or_default)
    }

    /// 64-bit integer form; NULL is `None`.
    pub fn as_i64_opt(&self) -> Result<Option<i64>> {
        self.integral("long")
    }

    /// 64-bit integer form; NULL is 0.
    pub fn as_i64(&self) -> Result<i64> {
        self.as_i64_opt().map(Option::unwrap_or_default)
    }

    /// Single precision form; NULL is `None`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_f32_opt(&self) -> Result<Option<f32>> {
        match &self.datum {
            Some(Datum::Float(v)) => Ok(Some(*v)),
            Some(Datum::Text(text)) => self.parse_text(text, "float").map(Some),
            _ => Ok(self.floating("float")?.map(|v| v as f32)),
        }
    }

    /// Single precision form; NULL is 0.
    pub fn as_f32(&self) -> Result<f32> {
        self.as_f32_opt().map(Option::unwrap_or_default)
    }

    /// Double precision form; NULL is `None`.
    pub fn as_f64_opt(&self) -> Result<Option<f64>> {
        self.floating("double")
    }

    /// Double precision form; NULL is 0.
    pub fn as_f64(&self) -> Result<f64> {
        self.as_f64_opt().map(Option::unwrap_or_default)
    }

    /// Decimal form.
    pub fn as_decimal(&self) -> Result<Option<Decimal>> {
        const TARGET: &str = "BigDecimal";
        let Some(datum) = &self.datum else {
            return Ok(None);
        };
        let decimal = match datum {
            Datum::Decimal(v) => *v,
            Datum::Byte(v) => Decimal::from(*v),
            Datum::Short(v) => Decimal::from(*v),
            Datum::Int(v) => Decimal::from(*v),
            Datum::Long(v) => Decimal::from(*v),
            Datum::Float(v) => Decimal::from_f64_retain(f64::from(*v))
                .ok_or_else(|| self.conversion(TARGET, format!("{v} is not finite")))?,
            Datum::Double(v) => Decimal::from_f64_retain(*v)
                .ok_or_else(|| self.conversion(TARGET, format!("{v} is not finite")))?,
            Datum::Text(text) => self.parse_text(text, TARGET)?,
            Datum::Bytes(bytes) => self.parse_text(&String::from_utf8_lossy(bytes), TARGET)?,
            Datum::Bool(_) | Datum::Date(_) | Datum::Time(_) | Datum::Timestamp(_) => {
                return Err(self.not_numeric(TARGET, datum));
            }
        };
        Ok(Some(decimal))
    }

    /// Decimal form at exactly `scale` fractional digits.
    ///
    /// Fails when the value has more significant fractional digits.
    pub fn as_decimal_scaled(&self, scale: u32) -> Result<Option<Decimal>> {
        let Some(decimal) = self.as_decimal()? else {
            return Ok(None);
        };
        let mut scaled = decimal;
        scaled.rescale(scale);
        if scaled == decimal {
            Ok(Some(scaled))
        } else {
            Err(self.conversion(
                "BigDecimal",
                format!("{decimal} does not fit scale {scale} without rounding"),
            ))
        }
    }

    /// Byte form. NULL and non-text, non-binary payloads are empty.
    #[must_use]
    pub fn as_bytes(&self) -> Vec<u8> {
        match &self.datum {
            Some(Datum::Bytes(bytes)) => bytes.clone(),
            Some(Datum::Text(text)) => text.as_bytes().to_vec(),
            _ => Vec::new(),
        }
    }

    /// Timestamp form. Dates read as midnight, times as 1970-01-01.
    pub fn as_timestamp(&self) -> Result<Option<NaiveDateTime>> {
        let Some(datum) = &self.datum else {
            return Ok(None);
        };
        match datum {
            Datum::Timestamp(v) => Ok(Some(*v)),
            Datum::Date(v) => Ok(Some(v.and_time(NaiveTime::MIN))),
            Datum::Time(v) => Ok(Some(temporal::epoch().and_time(*v))),
            Datum::Text(text) => self.parse_temporal(text, temporal::parse_timestamp),
            Datum::Bytes(bytes) => {
                self.parse_temporal(&String::from_utf8_lossy(bytes), temporal::parse_timestamp)
            }
            _ => Err(self.not_temporal("Timestamp", datum)),
        }
    }

    /// Date form. Timestamps are truncated.
    pub fn as_date(&self) -> Result<Option<NaiveDate>> {
        let Some(datum) = &self.datum else {
            return Ok(None);
        };
        match datum {
            Datum::Date(v) => Ok(Some(*v)),
            Datum::Timestamp(v) => Ok(Some(v.date())),
            Datum::Time(_) => Ok(Some(temporal::epoch())),
            Datum::Text(text) => self.parse_temporal(text, temporal::parse_date),
            Datum::Bytes(bytes) => {
                self.parse_temporal(&String::from_utf8_lossy(bytes), temporal::parse_date)
            }
            _ => Err(self.not_temporal("Date", datum)),
        }
    }

    /// Time form. Dates read as midnight.
    pub fn as_time(&self) -> Result<Option<NaiveTime>> {
        let Some(datum) = &self.datum else {
            return Ok(None);
        };
        match datum {
            Datum::Time(v) => Ok(Some(*v)),
            Datum::Timestamp(v) => Ok(Some(v.time())),
            Datum::Date(_) => Ok(Some(NaiveTime::MIN)),
            Datum::Text(text) => self.parse_temporal(text, temporal::parse_time),
            Datum::Bytes(bytes) => {
                self.parse_temporal(&String::from_utf8_lossy(bytes), temporal::parse_time)
            }
            _ => Err(self.not_temporal("Time", datum)),
        }
    }

    /// Converts the cell into a statement parameter.
    ///
    /// NULL binds as a typed NULL. Failures are wrapped with the column
    /// index, name and rendered value.
    pub fn to_param(&self) -> Result<Param> {
        if self.is_null() {
            return Ok(Param::Null(self.sql_type));
        }
        match self.native() {
            Ok(datum) => Ok(datum.map_or(Param::Null(self.sql_type), Param::from)),
            Err(source) => Err(Error::Bind {
                index: self.index,
                column: self.column_name().to_string(),
                value: self.to_string(),
                source: Box::new(source),
            }),
        }
    }

    /// Payload converted to the family of the type tag.
    fn native(&self) -> Result<Option<Datum>> {
        if self.datum.is_none() {
            return Ok(None);
        }
        Ok(match self.sql_type {
            SqlType::Boolean => self.as_bool_opt().map(Datum::Bool),
            SqlType::TinyInt => self.as_i8_opt()?.map(Datum::Byte),
            SqlType::SmallInt => self.as_i16_opt()?.map(Datum::Short),
            SqlType::Integer => self.as_i32_opt()?.map(Datum::Int),
            SqlType::BigInt => self.as_i64_opt()?.map(Datum::Long),
            SqlType::Real => self.as_f32_opt()?.map(Datum::Float),
            SqlType::Float | SqlType::Double => self.as_f64_opt()?.map(Datum::Double),
            SqlType::Numeric | SqlType::Decimal => self.as_decimal()?.map(Datum::Decimal),
            SqlType::Binary | SqlType::VarBinary | SqlType::LongVarBinary | SqlType::Blob => {
                Some(Datum::Bytes(self.as_bytes()))
            }
            SqlType::Char
            | SqlType::VarChar
            | SqlType::LongVarChar
            | SqlType::Clob
            | SqlType::Other => self.as_string().map(Datum::Text),
            SqlType::Date => self.as_date()?.map(Datum::Date),
            SqlType::Time => self.as_time()?.map(Datum::Time),
            SqlType::Timestamp => self.as_timestamp()?.map(Datum::Timestamp),
            SqlType::Null => None,
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn integral(&self, target: &'static str) -> Result<Option<i64>> {
        let Some(datum) = &self.datum else {
            return Ok(None);
        };
        let value = match datum {
            Datum::Byte(v) => i64::from(*v),
            Datum::Short(v) => i64::from(*v),
            Datum::Int(v) => i64::from(*v),
            Datum::Long(v) => *v,
            Datum::Float(v) => *v as i64,
            Datum::Double(v) => *v as i64,
            Datum::Decimal(v) => v
                .trunc()
                .to_i64()
                .ok_or_else(|| self.conversion(target, format!("{v} is out of range")))?,
            Datum::Text(text) => self.parse_text(text, target)?,
            Datum::Bytes(bytes) => self.parse_text(&String::from_utf8_lossy(bytes), target)?,
            Datum::Bool(_) | Datum::Date(_) | Datum::Time(_) | Datum::Timestamp(_) => {
                return Err(self.not_numeric(target, datum));
            }
        };
        Ok(Some(value))
    }

    #[allow(clippy::cast_precision_loss)]
    fn floating(&self, target: &'static str) -> Result<Option<f64>> {
        let Some(datum) = &self.datum else {
            return Ok(None);
        };
        let value = match datum {
            Datum::Byte(v) => f64::from(*v),
            Datum::Short(v) => f64::from(*v),
            Datum::Int(v) => f64::from(*v),
            Datum::Long(v) => *v as f64,
            Datum::Float(v) => f64::from(*v),
            Datum::Double(v) => *v,
            Datum::Decimal(v) => v
                .to_f64()
                .ok_or_else(|| self.conversion(target, format!("{v} is out of range")))?,
            Datum::Text(text) => self.parse_text(text, target)?,
            Datum::Bytes(bytes) => self.parse_text(&String::from_utf8_lossy(bytes), target)?,
            Datum::Bool(_) | Datum::Date(_) | Datum::Time(_) | Datum::Timestamp(_) => {
                return Err(self.not_numeric(target, datum));
            }
        };
        Ok(Some(value))
    }

    fn parse_text<T>(&self, text: &str, target: &'static str) -> Result<T>
    where
        T: FromStr + Default,
        T::Err: fmt::Display,
    {
        let trimmed = text.trim();
        if trimmed.is_empty() && self.policy.empty_string_is_zero {
            return Ok(T::default());
        }
        trimmed
            .parse()
            .map_err(|e: T::Err| self.conversion(target, format!("'{text}': {e}")))
    }

    fn parse_temporal<T>(&self, text: &str, parse: fn(&str) -> Option<T>) -> Result<Option<T>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        parse(text).map(Some).ok_or_else(|| Error::BadTimestamp {
            index: self.index,
            column: self.column_name().to_string(),
            text: text.to_string(),
        })
    }

    fn conversion(&self, target: &'static str, reason: impl Into<String>) -> Error {
        Error::Conversion {
            index: self.index,
            column: self.column_name().to_string(),
            target,
            reason: reason.into(),
        }
    }

    fn not_numeric(&self, target: &'static str, datum: &Datum) -> Error {
        self.conversion(target, format!("{} value '{datum}' is not numeric", datum.family()))
    }

    fn not_temporal(&self, target: &'static str, datum: &Datum) -> Error {
        self.conversion(
            target,
            format!("{} value '{datum}' is not a date or time", datum.family()),
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.datum {
            Some(datum) => write!(f, "{datum}"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::new(SqlType::VarChar, 1, Some(Datum::Text(s.into())))
    }

    fn column(name: &str, sql_type: SqlType) -> Arc<Column> {
        Arc::new(Column::new(name, sql_type).table("t"))
    }

    #[test]
    fn test_null_defaults() {
        let null = Value::new(SqlType::Integer, 1, None);
        assert!(null.is_null());
        assert_eq!(null.as_i32().unwrap(), 0);
        assert_eq!(null.as_i32_opt().unwrap(), None);
        assert!(!null.as_bool());
        assert_eq!(null.as_bool_opt(), None);
        assert_eq!(null.as_string(), None);
        assert!(null.as_bytes().is_empty());
        assert_eq!(null.as_timestamp().unwrap(), None);
        assert_eq!(null.to_string(), "");
    }

    #[test]
    fn test_text_to_numbers() {
        assert_eq!(text(" 42 ").as_i32().unwrap(), 42);
        assert_eq!(text("300").as_i64().unwrap(), 300);
        assert!((text("2.5").as_f64().unwrap() - 2.5).abs() < f64::EPSILON);
        assert_eq!(text("10.50").as_decimal().unwrap(), Some(Decimal::new(1050, 2)));
        assert_eq!(text("   ").as_i32().unwrap(), 0);
        assert!(matches!(
            text("12x").as_i32(),
            Err(Error::Conversion { index: 1, target: "int", .. })
        ));
    }

    #[test]
    fn test_empty_string_policy() {
        let strict = text("").with_policy(ConversionPolicy::default().empty_string_is_zero(false));
        assert!(strict.as_i64().is_err());
    }

    #[test]
    fn test_boolean_words() {
        for word in ["true", "T", "yes", "Si", "y", "1"] {
            assert!(text(word).as_bool(), "{word}");
        }
        for word in ["false", "no", "0", "2", ""] {
            assert!(!text(word).as_bool(), "{word}");
        }
        assert!(Value::new(SqlType::Integer, 1, Some(Datum::Int(1))).as_bool());
    }

    #[test]
    fn test_narrowing_wraps() {
        let v = Value::new(SqlType::BigInt, 1, Some(Datum::Long(300)));
        assert_eq!(v.as_i8().unwrap(), 44);
        let d = Value::new(SqlType::Double, 1, Some(Datum::Double(7.9)));
        assert_eq!(d.as_i32().unwrap(), 7);
    }

    #[test]
    fn test_cross_family_failures() {
        let flag = Value::new(SqlType::Boolean, 3, Some(Datum::Bool(true)));
        assert!(matches!(flag.as_i32(), Err(Error::Conversion { index: 3, .. })));

        let number = Value::for_column(&column("qty", SqlType::Integer), 2, Some(Datum::Int(5)));
        match number.as_timestamp() {
            Err(Error::Conversion { index, column, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(column, "qty");
            }
            other => panic!("expected conversion error, got {other:?}"),
        }
    }

    #[test]
    fn test_temporal_conversions() {
        let ts = NaiveDate::from_ymd_opt(2025, 11, 1)
            .unwrap()
            .and_hms_opt(8, 47, 0)
            .unwrap();
        let v = Value::new(SqlType::Timestamp, 1, Some(Datum::Timestamp(ts)));
        assert_eq!(v.as_date().unwrap(), Some(ts.date()));
        assert_eq!(v.as_time().unwrap(), Some(ts.time()));

        assert_eq!(text("20251101 084700").as_timestamp().unwrap(), Some(ts));
        assert_eq!(text("2025-11-01").as_date().unwrap(), Some(ts.date()));
        assert!(matches!(
            text("next tuesday").as_date(),
            Err(Error::BadTimestamp { .. })
        ));

        let date = Value::new(SqlType::Date, 1, Some(Datum::Date(ts.date())));
        assert_eq!(
            date.as_timestamp().unwrap(),
            Some(ts.date().and_time(NaiveTime::MIN))
        );
    }

    #[test]
    fn test_bytes() {
        assert_eq!(text("ab").as_bytes(), b"ab");
        let blob = Value::new(SqlType::Blob, 1, Some(Datum::Bytes(vec![0, 1, 2])));
        assert_eq!(blob.as_bytes(), [0, 1, 2]);
        assert_eq!(
            Value::new(SqlType::Integer, 1, Some(Datum::Int(9))).as_bytes(),
            Vec::<u8>::new()
        );
        let utf8 = Value::new(SqlType::Blob, 1, Some(Datum::Bytes(b"caf\xc3\xa9".to_vec())));
        assert_eq!(utf8.as_string().as_deref(), Some("café"));
    }

    #[test]
    fn test_decimal_scale() {
        let v = text("10.5");
        assert_eq!(v.as_decimal_scaled(2).unwrap(), Some(Decimal::new(1050, 2)));
        assert!(text("10.555").as_decimal_scaled(2).is_err());
    }

    #[test]
    fn test_extract_normalizes_by_tag() {
        let flag =
            Value::extract(&column("active", SqlType::Boolean), 1, Some(Datum::Long(1))).unwrap();
        assert_eq!(flag.datum(), Some(&Datum::Bool(true)));

        let born = Value::extract(
            &column("born", SqlType::Date),
            2,
            Some(Datum::Text("2025-11-01".into())),
        )
        .unwrap();
        assert!(born.is_date());

        let amount = Value::extract(
            &column("amount", SqlType::Decimal),
            3,
            Some(Datum::Double(2.5)),
        )
        .unwrap();
        assert_eq!(amount.datum(), Some(&Datum::Decimal(Decimal::new(25, 1))));
    }

    #[test]
    fn test_bind_then_extract_is_stable() {
        let ts = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(23, 59, 1)
            .unwrap();
        let cases = [
            (SqlType::Integer, Datum::Int(-17)),
            (SqlType::Decimal, Datum::Decimal(Decimal::new(123_456, 3))),
            (SqlType::VarChar, Datum::Text("ciao".into())),
            (SqlType::Timestamp, Datum::Timestamp(ts)),
        ];
        for (sql_type, datum) in cases {
            let col = column("c", sql_type);
            let written = Value::for_column(&col, 1, Some(datum.clone())).to_param().unwrap();
            let read = Value::extract(&col, 1, written.into_datum()).unwrap();
            assert_eq!(read.datum(), Some(&datum), "{sql_type}");
        }
    }

    #[test]
    fn test_bind_errors_carry_context() {
        let col = column("qty", SqlType::Integer);
        let v = Value::for_column(&col, 4, Some(Datum::Text("lots".into())));
        let err = v.to_param().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Data);
        assert!(err.to_string().ends_with("in 4/qty value [lots]"), "{err}");
        assert_eq!(
            Value::new(SqlType::Date, 1, None).to_param().unwrap(),
            Param::Null(SqlType::Date)
        );
    }
}
