//! Error types shared by every rowset crate.

use thiserror::Error;

/// Boxed error raised by a database connector.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Broad family of an [`Error`].
///
/// Lets callers decide whether to surface, retry or abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value could not be coerced (bad data).
    Data,
    /// The caller asked for something the row or schema does not allow.
    Usage,
    /// The connector or the database itself failed.
    Connector,
}

/// Rowset errors.
#[derive(Debug, Error)]
pub enum Error {
    /// No column with that name exists in the schema.
    #[error("Column name: {0} does not exist!")]
    UnknownColumn(String),

    /// A 1-based column position outside the schema.
    #[error("Columns are 1 based; position {position} is outside 1..={count}")]
    ColumnOutOfRange {
        /// Requested position.
        position: usize,
        /// Number of columns available.
        count: usize,
    },

    /// A single table name was required from a multi-table schema.
    #[error("This schema represents several tables.")]
    MultipleTables,

    /// The operation needs a non-empty key definition.
    #[error("You must specify KeyDef attributes for this TableDataSet in order to {0}.")]
    MissingKeyDef(&'static str),

    /// A key value needed to address a row is missing.
    #[error("{0}")]
    MissingKeyValue(String),

    /// The refresh query returned no row.
    #[error("no row found for key values of table {0}")]
    RowNotFound(String),

    /// A value could not be converted to the requested type.
    #[error("Bad conversion in column {index}/{column} to {target}: {reason}")]
    Conversion {
        /// 1-based column index.
        index: usize,
        /// Column name, empty when the value has no column.
        column: String,
        /// Name of the requested target type.
        target: &'static str,
        /// Root cause.
        reason: String,
    },

    /// Text could not be parsed as a date, time or timestamp.
    #[error("Bad date value for {index}/{column} - {text}")]
    BadTimestamp {
        /// 1-based column index.
        index: usize,
        /// Column name.
        column: String,
        /// Offending text.
        text: String,
    },

    /// Binding a value into a statement parameter failed.
    #[error("{source} in {index}/{column} value [{value}]")]
    Bind {
        /// 1-based column index.
        index: usize,
        /// Column name.
        column: String,
        /// Rendered value that failed.
        value: String,
        /// Underlying conversion failure.
        #[source]
        source: Box<Error>,
    },

    /// Write and refresh operations are not allowed on rows of a
    /// read-only query.
    #[error("You cannot save a QueryDataSet. Please use a TableDataSet instead.")]
    ReadOnlySource,

    /// The record was already deleted.
    #[error("This record has already been deleted!")]
    AlreadyDeleted,

    /// A key column was modified.
    #[error("The value for column '{0}' is a key value and cannot be updated.")]
    KeyColumnDirty(String),

    /// Nothing dirty to write.
    #[error("You must call Record::set_value on a column before doing an {0}.")]
    NothingToSave(&'static str),

    /// A row pending insertion cannot be refreshed.
    #[error("A record from TableDataSet::add_record cannot be refreshed until inserted.")]
    RefreshPendingInsert,

    /// Generated keys need exactly one primary key column.
    #[error("The generated-keys mode can be used only if the table has one primary key; found {0}")]
    GeneratedKeyColumns(usize),

    /// A statement touched more rows than a single record can own.
    #[error("{operation} affected {count} rows; only one was expected")]
    UnexpectedRowCount {
        /// Statement verb.
        operation: &'static str,
        /// Reported affected row count.
        count: u64,
    },

    /// Records must be cleared before fetching again.
    #[error("You must call DataSet::clear_records before fetching records again!")]
    RecordsPending,

    /// Any other misuse, with a descriptive message.
    #[error("{0}")]
    IllegalState(String),

    /// A `${...}` placeholder was left in the SQL.
    #[error("Unresolved macro in sql ({0})")]
    UnresolvedMacro(String),

    /// No parameter was supplied for a placeholder.
    #[error("Missing value for macro {0}.")]
    MissingMacroValue(String),

    /// The supplied parameter has no automatic bind type.
    #[error("Illegal value for macro {name}: {value}")]
    IllegalMacroValue {
        /// Placeholder name.
        name: String,
        /// Rendered parameter.
        value: String,
    },

    /// A typed placeholder named a type outside the supported set.
    #[error("Unknown macro type '{kind}' for macro {name}")]
    UnknownMacroType {
        /// Placeholder name.
        name: String,
        /// Requested type.
        kind: String,
    },

    /// Error raised by the database connector.
    #[error("connector error: {0}")]
    Connector(#[source] BoxError),
}

impl Error {
    /// Wraps a driver error.
    pub fn connector(err: impl Into<BoxError>) -> Self {
        Self::Connector(err.into())
    }

    /// Returns the broad family this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Conversion { .. }
            | Self::BadTimestamp { .. }
            | Self::IllegalMacroValue { .. } => ErrorKind::Data,
            Self::Bind { source, .. } => source.kind(),
            Self::Connector(_) => ErrorKind::Connector,
            _ => ErrorKind::Usage,
        }
    }
}

/// Result type alias for rowset operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let conversion = Error::Conversion {
            index: 2,
            column: "qty".into(),
            target: "int",
            reason: "invalid digit found in string".into(),
        };
        assert_eq!(conversion.kind(), ErrorKind::Data);
        assert_eq!(Error::AlreadyDeleted.kind(), ErrorKind::Usage);
        assert_eq!(Error::connector("socket closed").kind(), ErrorKind::Connector);

        let bind = Error::Bind {
            index: 2,
            column: "qty".into(),
            value: "x".into(),
            source: Box::new(conversion),
        };
        assert_eq!(bind.kind(), ErrorKind::Data);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::UnknownColumn("foo".into()).to_string(),
            "Column name: foo does not exist!"
        );
        assert_eq!(
            Error::MissingMacroValue("n".into()).to_string(),
            "Missing value for macro n."
        );
        assert_eq!(
            Error::BadTimestamp {
                index: 3,
                column: "born".into(),
                text: "yesterday".into(),
            }
            .to_string(),
            "Bad date value for 3/born - yesterday"
        );
    }

    #[test]
    fn test_state_messages_name_rust_methods() {
        assert_eq!(
            Error::NothingToSave("update").to_string(),
            "You must call Record::set_value on a column before doing an update."
        );
        assert_eq!(
            Error::RefreshPendingInsert.to_string(),
            "A record from TableDataSet::add_record cannot be refreshed until inserted."
        );
        assert_eq!(
            Error::RecordsPending.to_string(),
            "You must call DataSet::clear_records before fetching records again!"
        );
    }
}
