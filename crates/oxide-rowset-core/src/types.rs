//! SQL type tags.
//!
//! Every column carries one [`SqlType`]. The tag drives how a raw driver
//! value is normalized on read and how a cell is bound on write.

use serde::{Deserialize, Serialize};

/// Declared SQL type category of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    /// BOOLEAN / BIT.
    Boolean,
    /// TINYINT (8-bit).
    TinyInt,
    /// SMALLINT (16-bit).
    SmallInt,
    /// INTEGER (32-bit).
    Integer,
    /// BIGINT (64-bit).
    BigInt,
    /// REAL (single precision).
    Real,
    /// FLOAT (double precision).
    Float,
    /// DOUBLE.
    Double,
    /// NUMERIC.
    Numeric,
    /// DECIMAL.
    Decimal,
    /// BINARY.
    Binary,
    /// VARBINARY.
    VarBinary,
    /// LONGVARBINARY.
    LongVarBinary,
    /// BLOB.
    Blob,
    /// CHAR.
    Char,
    /// VARCHAR.
    VarChar,
    /// LONGVARCHAR.
    LongVarChar,
    /// CLOB / TEXT.
    Clob,
    /// DATE.
    Date,
    /// TIME.
    Time,
    /// TIMESTAMP / DATETIME.
    Timestamp,
    /// The NULL type (expression columns with no declared type).
    Null,
    /// Anything else; handled as text.
    Other,
}

impl SqlType {
    /// Returns true for integer, floating point and decimal tags.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::TinyInt
                | Self::SmallInt
                | Self::Integer
                | Self::BigInt
                | Self::Real
                | Self::Float
                | Self::Double
                | Self::Numeric
                | Self::Decimal
        )
    }

    /// Returns true for character tags.
    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(
            self,
            Self::Char | Self::VarChar | Self::LongVarChar | Self::Clob
        )
    }

    /// Returns true for DATE, TIME and TIMESTAMP.
    #[must_use]
    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }

    /// Returns true for binary tags.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        matches!(
            self,
            Self::Binary | Self::VarBinary | Self::LongVarBinary | Self::Blob
        )
    }

    /// Standard SQL name of the tag.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Real => "REAL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Numeric => "NUMERIC",
            Self::Decimal => "DECIMAL",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::LongVarBinary => "LONGVARBINARY",
            Self::Blob => "BLOB",
            Self::Char => "CHAR",
            Self::VarChar => "VARCHAR",
            Self::LongVarChar => "LONGVARCHAR",
            Self::Clob => "CLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Null => "NULL",
            Self::Other => "OTHER",
        }
    }

    /// Name of the host value family the tag reads into.
    ///
    /// Tags without a dedicated family report `None`.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::Boolean => Some("BOOLEAN"),
            Self::TinyInt => Some("BYTE"),
            Self::SmallInt => Some("SHORT"),
            Self::Integer => Some("INTEGER"),
            Self::BigInt => Some("LONG"),
            Self::Real => Some("FLOAT"),
            Self::Float | Self::Double => Some("DOUBLE"),
            Self::Numeric | Self::Decimal => Some("BIGDECIMAL"),
            Self::Date => Some("DATE"),
            Self::Time => Some("TIME"),
            Self::Timestamp => Some("TIMESTAMP"),
            Self::Char | Self::VarChar | Self::LongVarChar | Self::Clob => Some("STRING"),
            Self::Binary => Some("BINARY"),
            Self::VarBinary => Some("VARBINARY"),
            Self::LongVarBinary => Some("LONGVARBINARY"),
            Self::Blob | Self::Null | Self::Other => None,
        }
    }

    /// Maps a driver-reported declared type name to a tag.
    ///
    /// Length and precision suffixes are ignored (`VARCHAR(20)` is
    /// `VarChar`). Names that match nothing exactly fall back to the
    /// SQLite affinity rules, then to [`SqlType::Other`].
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or_default().trim();

        match base {
            "BOOLEAN" | "BOOL" | "BIT" => Self::Boolean,
            "TINYINT" => Self::TinyInt,
            "SMALLINT" | "INT2" => Self::SmallInt,
            "INT" | "INTEGER" | "INT4" | "MEDIUMINT" => Self::Integer,
            "BIGINT" | "INT8" => Self::BigInt,
            "REAL" | "FLOAT4" => Self::Real,
            "FLOAT" => Self::Float,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => Self::Double,
            "NUMERIC" => Self::Numeric,
            "DECIMAL" | "DEC" | "MONEY" => Self::Decimal,
            "BINARY" => Self::Binary,
            "VARBINARY" => Self::VarBinary,
            "LONGVARBINARY" => Self::LongVarBinary,
            "BLOB" | "BYTEA" => Self::Blob,
            "CHAR" | "CHARACTER" | "NCHAR" => Self::Char,
            "VARCHAR" | "NVARCHAR" | "VARCHAR2" | "CHARACTER VARYING" | "TEXT" => Self::VarChar,
            "LONGVARCHAR" | "LONGNVARCHAR" => Self::LongVarChar,
            "CLOB" => Self::Clob,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "TIMESTAMP" | "DATETIME" => Self::Timestamp,
            "NULL" => Self::Null,
            "" => Self::Other,
            _ if base.contains("INT") => Self::BigInt,
            _ if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") => {
                Self::VarChar
            }
            _ if base.contains("BLOB") => Self::Blob,
            _ if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") => {
                Self::Double
            }
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_type_name() {
        assert_eq!(SqlType::from_type_name("varchar(20)"), SqlType::VarChar);
        assert_eq!(SqlType::from_type_name("DECIMAL(10, 2)"), SqlType::Decimal);
        assert_eq!(SqlType::from_type_name("DATETIME"), SqlType::Timestamp);
        assert_eq!(SqlType::from_type_name("unsigned big int"), SqlType::BigInt);
        assert_eq!(SqlType::from_type_name("NATIVE CHARACTER(70)"), SqlType::VarChar);
        assert_eq!(SqlType::from_type_name("geometry"), SqlType::Other);
        assert_eq!(SqlType::from_type_name(""), SqlType::Other);
    }

    #[test]
    fn test_families() {
        assert!(SqlType::Decimal.is_numeric());
        assert!(!SqlType::Boolean.is_numeric());
        assert!(SqlType::Clob.is_string());
        assert!(SqlType::Time.is_temporal());
        assert!(SqlType::Blob.is_binary());
        assert_eq!(SqlType::BigInt.label(), Some("LONG"));
        assert_eq!(SqlType::Other.label(), None);
    }
}
