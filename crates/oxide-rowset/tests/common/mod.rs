#![allow(dead_code)]

use std::collections::VecDeque;

use oxide_rowset::{
    ColumnDescriptor, Connector, Datum, ExecuteResult, MetadataDialect, Param, PrimaryKeyColumn,
    Result, RowSet, SqlType, TableInfo,
};
use parking_lot::Mutex;

pub const URL: &str = "mock://village";

/// One call received by [`MockConnector`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query(String, Vec<Param>),
    Describe(String),
    Execute(String, Vec<Param>),
    Schemas,
    Tables(Option<String>),
    PrimaryKeys(Option<String>, Option<String>, String),
    Columns(Option<String>, String),
}

#[derive(Debug, Clone)]
pub struct MockTable {
    pub schema: Option<String>,
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub keys: Vec<&'static str>,
}

/// Scripted connector that records every call.
///
/// Queries pop canned row sets in order and return no rows once the
/// script runs out; executes report one affected row unless scripted.
#[derive(Debug)]
pub struct MockConnector {
    pub dialect: MetadataDialect,
    pub catalog: Option<String>,
    pub schemas: Vec<String>,
    pub tables: Vec<MockTable>,
    results: Mutex<VecDeque<Vec<Vec<Option<Datum>>>>>,
    executes: Mutex<VecDeque<ExecuteResult>>,
    calls: Mutex<Vec<Call>>,
}

impl MockConnector {
    pub fn new(tables: Vec<MockTable>) -> Self {
        Self {
            dialect: MetadataDialect::Generic,
            catalog: None,
            schemas: vec!["STP".to_string()],
            tables,
            results: Mutex::new(VecDeque::new()),
            executes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_dialect(mut self, dialect: MetadataDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn push_rows(&self, rows: Vec<Vec<Option<Datum>>>) {
        self.results.lock().push_back(rows);
    }

    pub fn push_execute(&self, rows_affected: u64, generated_key: Option<i64>) {
        self.executes.lock().push_back(ExecuteResult {
            rows_affected,
            generated_key,
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn executed(&self) -> Vec<(String, Vec<Param>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Execute(sql, params) => Some((sql, params)),
                _ => None,
            })
            .collect()
    }

    pub fn queries(&self) -> Vec<(String, Vec<Param>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Query(sql, params) => Some((sql, params)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| matches(call)).count()
    }

    pub fn describe_calls(&self) -> usize {
        self.count(|call| matches!(call, Call::Describe(_)))
    }

    pub fn primary_key_calls(&self) -> usize {
        self.count(|call| matches!(call, Call::PrimaryKeys(..)))
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn table_in(&self, sql: &str) -> Option<&MockTable> {
        let upper = sql.to_ascii_uppercase();
        let from = upper.find(" FROM ")? + " FROM ".len();
        let name = sql[from..].split_whitespace().next()?;
        let name = name.rsplit('.').next().unwrap_or(name);
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

impl Connector for MockConnector {
    fn url(&self) -> &str {
        URL
    }

    fn dialect(&self) -> MetadataDialect {
        self.dialect
    }

    fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    async fn query(&self, sql: &str, params: &[Param]) -> Result<RowSet> {
        self.record(Call::Query(sql.to_string(), params.to_vec()));
        let rows = self.results.lock().pop_front().unwrap_or_default();
        Ok(RowSet {
            columns: Vec::new(),
            rows,
        })
    }

    async fn describe(&self, sql: &str) -> Result<Vec<ColumnDescriptor>> {
        self.record(Call::Describe(sql.to_string()));
        let Some(table) = self.table_in(sql) else {
            return Ok(Vec::new());
        };
        let select = sql
            .strip_prefix("SELECT ")
            .unwrap_or(sql)
            .split(" FROM ")
            .next()
            .unwrap_or("*")
            .trim();
        if select == "*" {
            return Ok(table.columns.clone());
        }
        Ok(select
            .split(',')
            .filter_map(|name| {
                table
                    .columns
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
                    .cloned()
            })
            .collect())
    }

    async fn execute(&self, sql: &str, params: &[Param]) -> Result<ExecuteResult> {
        self.record(Call::Execute(sql.to_string(), params.to_vec()));
        Ok(self.executes.lock().pop_front().unwrap_or(ExecuteResult {
            rows_affected: 1,
            generated_key: None,
        }))
    }

    async fn schemas(&self) -> Result<Vec<String>> {
        self.record(Call::Schemas);
        Ok(self.schemas.clone())
    }

    async fn tables(&self, schema: Option<&str>, _kinds: &[&str]) -> Result<Vec<TableInfo>> {
        self.record(Call::Tables(schema.map(str::to_string)));
        tokio::task::yield_now().await;
        Ok(self
            .tables
            .iter()
            .filter(|t| schema.is_none() || t.schema.as_deref() == schema)
            .map(|t| TableInfo {
                schema: t.schema.clone(),
                name: t.name.clone(),
                kind: "TABLE".to_string(),
            })
            .collect())
    }

    async fn primary_keys(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<PrimaryKeyColumn>> {
        self.record(Call::PrimaryKeys(
            catalog.map(str::to_string),
            schema.map(str::to_string),
            table.to_string(),
        ));
        tokio::task::yield_now().await;
        // Exact match only, like drivers that do not fold identifiers.
        Ok(self
            .tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| {
                t.keys
                    .iter()
                    .zip(1..)
                    .map(|(column, sequence)| PrimaryKeyColumn {
                        column: (*column).to_string(),
                        sequence,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.record(Call::Columns(schema.map(str::to_string), table.to_string()));
        Ok(self
            .tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(table))
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }
}

/// `STP.transcode(app, tipo, codice_app, codice_vero)` keyed by
/// `(app, tipo, codice_vero)`.
pub fn transcode() -> MockTable {
    MockTable {
        schema: Some("STP".to_string()),
        name: "transcode".to_string(),
        columns: ["app", "tipo", "codice_app", "codice_vero"]
            .into_iter()
            .map(|name| ColumnDescriptor::new(name, SqlType::VarChar).type_name("VARCHAR"))
            .collect(),
        keys: vec!["app", "tipo", "codice_vero"],
    }
}

/// `people(id, name)` keyed by `id`.
pub fn people() -> MockTable {
    MockTable {
        schema: None,
        name: "people".to_string(),
        columns: vec![
            ColumnDescriptor::new("id", SqlType::BigInt).type_name("BIGINT"),
            ColumnDescriptor::new("name", SqlType::VarChar).type_name("VARCHAR"),
        ],
        keys: vec!["id"],
    }
}

pub fn text(value: &str) -> Option<Datum> {
    Some(Datum::Text(value.to_string()))
}

pub fn transcode_row(
    app: &str,
    tipo: &str,
    codice_app: &str,
    codice_vero: &str,
) -> Vec<Option<Datum>> {
    vec![text(app), text(tipo), text(codice_app), text(codice_vero)]
}
