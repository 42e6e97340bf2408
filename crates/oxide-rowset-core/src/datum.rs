//! Cell payloads.
//!
//! [`Datum`] is the tagged union every cell stores. Conversions between
//! families are exhaustive matches over it (see [`crate::value`]).

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// Format used to render timestamps as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A non-null cell payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    /// Boolean.
    Bool(bool),
    /// 8-bit integer.
    Byte(i8),
    /// 16-bit integer.
    Short(i16),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// Single precision float.
    Float(f32),
    /// Double precision float.
    Double(f64),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Text.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time.
    Timestamp(NaiveDateTime),
}

impl Datum {
    /// Name of the payload family, used in error messages.
    #[must_use]
    pub const fn family(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Boolean",
            Self::Byte(_) => "Byte",
            Self::Short(_) => "Short",
            Self::Int(_) => "Integer",
            Self::Long(_) => "Long",
            Self::Float(_) => "Float",
            Self::Double(_) => "Double",
            Self::Decimal(_) => "BigDecimal",
            Self::Bytes(_) => "Bytes",
            Self::Text(_) => "String",
            Self::Date(_) => "Date",
            Self::Time(_) => "Time",
            Self::Timestamp(_) => "Timestamp",
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Bytes(v) => f.write_str(&String::from_utf8_lossy(v)),
            Self::Text(v) => f.write_str(v),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::Time(v) => write!(f, "{}", v.format("%H:%M:%S")),
            Self::Timestamp(v) => write!(f, "{}", v.format(TIMESTAMP_FORMAT)),
        }
    }
}

/// Trait for host types that can be stored in a cell.
///
/// `None` stores SQL NULL.
pub trait ToDatum {
    /// Converts the value to a payload.
    fn to_datum(self) -> Option<Datum>;
}

impl ToDatum for Datum {
    fn to_datum(self) -> Option<Datum> {
        Some(self)
    }
}

impl<T: ToDatum> ToDatum for Option<T> {
    fn to_datum(self) -> Option<Datum> {
        self.and_then(ToDatum::to_datum)
    }
}

macro_rules! impl_to_datum {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ToDatum for $ty {
                fn to_datum(self) -> Option<Datum> {
                    Some(Datum::$variant(self.into()))
                }
            }
        )*
    };
}

impl_to_datum! {
    bool => Bool,
    i8 => Byte,
    u8 => Short,
    i16 => Short,
    u16 => Int,
    i32 => Int,
    u32 => Long,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Decimal => Decimal,
    Vec<u8> => Bytes,
    String => Text,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
}

impl ToDatum for &str {
    fn to_datum(self) -> Option<Datum> {
        Some(Datum::Text(self.to_owned()))
    }
}

impl ToDatum for &[u8] {
    fn to_datum(self) -> Option<Datum> {
        Some(Datum::Bytes(self.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_datum_conversions() {
        assert_eq!(true.to_datum(), Some(Datum::Bool(true)));
        assert_eq!(200_u8.to_datum(), Some(Datum::Short(200)));
        assert_eq!(42_i32.to_datum(), Some(Datum::Int(42)));
        assert_eq!("abc".to_datum(), Some(Datum::Text("abc".into())));
        assert_eq!(Option::<i64>::None.to_datum(), None);
        assert_eq!(Some(7_i64).to_datum(), Some(Datum::Long(7)));
    }

    #[test]
    fn test_display() {
        let ts = NaiveDate::from_ymd_opt(2025, 11, 1)
            .unwrap()
            .and_hms_opt(8, 47, 0)
            .unwrap();
        assert_eq!(Datum::Timestamp(ts).to_string(), "2025-11-01 08:47:00");
        assert_eq!(Datum::Bytes(b"hi".to_vec()).to_string(), "hi");
        assert_eq!(Datum::Decimal(Decimal::new(1050, 2)).to_string(), "10.50");
    }
}
