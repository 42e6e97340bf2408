//! SQL templates with named placeholders.
//!
//! A template names its parameters instead of numbering them:
//!
//! ```text
//! SELECT * FROM transcode WHERE app = ${app} AND since > ${since:date}
//! ```
//!
//! [`resolve`] rewrites every `${name}` and `${name:type}` into a `?`
//! marker and records, per marker, the macro name and the requested
//! type (`auto` when untyped). [`ResolvedTemplate::bind`] then turns a
//! name to value map into positional [`Param`]s.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::column::Column;
use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::param::Param;
use crate::types::SqlType;
use crate::value::Value;

static UNTYPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_.]+)\}").expect("valid untyped macro regex")
});

static TYPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_.]+):([A-Za-z]+)\}").expect("valid typed macro regex")
});

/// Target type requested by a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroType {
    /// Inferred from the supplied value.
    Auto,
    /// `str`, `st`, `String`.
    Str,
    /// `int`, `Integer`.
    Int,
    /// `long`, `Long`.
    Long,
    /// `float`, `Float`.
    Float,
    /// `number`, `currency`, `double`, `Double`.
    Double,
    /// `boolean`, `Boolean`.
    Boolean,
    /// `ts`, `timestamp`, `Timestamp`.
    Timestamp,
    /// `date`, `Date`, `UDate`.
    Date,
}

impl MacroType {
    /// Parses a placeholder type annotation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "str" | "st" | "String" => Self::Str,
            "int" | "Integer" => Self::Int,
            "long" | "Long" => Self::Long,
            "float" | "Float" => Self::Float,
            "number" | "currency" | "double" | "Double" => Self::Double,
            "boolean" | "Boolean" => Self::Boolean,
            "ts" | "timestamp" | "Timestamp" => Self::Timestamp,
            "date" | "Date" | "UDate" => Self::Date,
            _ => return None,
        })
    }

    /// Type tag the placeholder binds as. `None` for [`MacroType::Auto`].
    #[must_use]
    pub const fn sql_type(self) -> Option<SqlType> {
        match self {
            Self::Auto => None,
            Self::Str => Some(SqlType::VarChar),
            Self::Int => Some(SqlType::Integer),
            Self::Long => Some(SqlType::BigInt),
            Self::Float => Some(SqlType::Real),
            Self::Double => Some(SqlType::Double),
            Self::Boolean => Some(SqlType::Boolean),
            Self::Timestamp => Some(SqlType::Timestamp),
            Self::Date => Some(SqlType::Date),
        }
    }
}

/// One resolved placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroBinding {
    /// Byte offset of the placeholder in the original template.
    pub offset: usize,
    /// Macro name.
    pub name: String,
    /// Type annotation as written, or `auto`.
    pub requested: String,
    /// Parsed type annotation.
    pub kind: MacroType,
}

impl MacroBinding {
    /// Coerces `datum` for this placeholder into the parameter bound at
    /// 1-based `position`.
    pub fn bind(&self, position: usize, datum: &Datum) -> Result<Param> {
        let sql_type = match self.kind.sql_type() {
            Some(sql_type) => sql_type,
            None => auto_type(&self.name, datum)?,
        };
        let column = Arc::new(Column::new(self.name.clone(), sql_type));
        Value::for_column(&column, position, Some(datum.clone())).to_param()
    }
}

impl fmt::Display for MacroBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Info{{first={}, macro={}, param={}}}",
            self.offset, self.name, self.requested
        )
    }
}

/// Bind type for an untyped placeholder, from the value's family.
fn auto_type(name: &str, datum: &Datum) -> Result<SqlType> {
    match datum {
        Datum::Text(_) => Ok(SqlType::VarChar),
        Datum::Int(_) => Ok(SqlType::Integer),
        Datum::Long(_) => Ok(SqlType::BigInt),
        Datum::Float(_) => Ok(SqlType::Real),
        Datum::Double(_) => Ok(SqlType::Double),
        Datum::Bool(_) => Ok(SqlType::Boolean),
        Datum::Timestamp(_) => Ok(SqlType::Timestamp),
        Datum::Date(_) => Ok(SqlType::Date),
        other => Err(Error::IllegalMacroValue {
            name: name.to_string(),
            value: format!("{} {other}", other.family()),
        }),
    }
}

/// A template rewritten to positional markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// SQL with `?` markers.
    pub sql: String,
    /// One entry per marker, in marker order.
    pub bindings: Vec<MacroBinding>,
}

impl ResolvedTemplate {
    /// Builds the parameter list from named values.
    pub fn bind(&self, params: &HashMap<String, Datum>) -> Result<Vec<Param>> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(i, binding)| {
                let datum = params
                    .get(&binding.name)
                    .ok_or_else(|| Error::MissingMacroValue(binding.name.clone()))?;
                binding.bind(i + 1, datum)
            })
            .collect()
    }
}

/// Rewrites the placeholders of `template` into `?` markers.
///
/// Untyped placeholders are replaced first, typed ones in a second pass
/// over the reduced text. Offsets of the second pass are mapped back to
/// the original text so both kinds sort in source order.
pub fn resolve(template: &str) -> Result<ResolvedTemplate> {
    let mut bindings = Vec::new();
    // (offset of the marker in the reduced text, bytes removed there)
    let mut shifts: Vec<(usize, usize)> = Vec::new();

    let mut reduced = String::with_capacity(template.len());
    let mut last = 0;
    for caps in UNTYPED.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        let name = caps.get(1).map_or("", |m| m.as_str());
        reduced.push_str(&template[last..whole.start()]);
        shifts.push((reduced.len(), whole.len() - 1));
        reduced.push('?');
        bindings.push(MacroBinding {
            offset: whole.start(),
            name: name.to_string(),
            requested: "auto".to_string(),
            kind: MacroType::Auto,
        });
        last = whole.end();
    }
    reduced.push_str(&template[last..]);

    let mut sql = String::with_capacity(reduced.len());
    let mut last = 0;
    for caps in TYPED.captures_iter(&reduced) {
        let Some(whole) = caps.get(0) else { continue };
        let name = caps.get(1).map_or("", |m| m.as_str());
        let requested = caps.get(2).map_or("", |m| m.as_str());
        let kind = MacroType::parse(requested).ok_or_else(|| Error::UnknownMacroType {
            name: name.to_string(),
            kind: requested.to_string(),
        })?;
        let removed: usize = shifts
            .iter()
            .take_while(|(at, _)| *at < whole.start())
            .map(|(_, removed)| removed)
            .sum();

        sql.push_str(&reduced[last..whole.start()]);
        sql.push('?');
        bindings.push(MacroBinding {
            offset: whole.start() + removed,
            name: name.to_string(),
            requested: requested.to_string(),
            kind,
        });
        last = whole.end();
    }
    sql.push_str(&reduced[last..]);

    if sql.contains("${") {
        return Err(Error::UnresolvedMacro(sql));
    }

    bindings.sort_by_key(|b| b.offset);
    Ok(ResolvedTemplate { sql, bindings })
}
