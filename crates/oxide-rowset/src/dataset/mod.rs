//! Row collections fetched through a connector.
//!
//! [`QueryDataSet`] holds the read-only rows of an arbitrary SELECT.
//! [`TableDataSet`] holds rows of one table and writes changes back.
//! Both keep their records in a [`RecordSet`] and share the accessors of
//! the [`DataSet`] trait. Row indices are 0-based.

mod query;
mod table;

use std::sync::Arc;

use oxide_rowset_core::{Error, Result, Schema, Statement};
use tracing::debug;

use crate::connector::Connector;
use crate::record::{Record, RowContext, SaveOptions};

pub use query::QueryDataSet;
pub use table::TableDataSet;

/// `max` value of [`RecordSet::fetch`] meaning no limit.
pub const ALL_RECORDS: i64 = -1;

/// Records of a dataset plus fetch bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<Record>,
    all_retrieved: bool,
    last_fetch_size: usize,
}

impl RecordSet {
    /// Runs `stmt` and keeps at most `max` rows after skipping `start`.
    ///
    /// Negative `max` keeps every row. Records fetched earlier must be
    /// cleared first.
    pub async fn fetch<C: Connector>(
        &mut self,
        conn: &C,
        context: &Arc<RowContext>,
        stmt: &Statement,
        start: usize,
        max: i64,
        options: SaveOptions,
    ) -> Result<usize> {
        if max == 0 {
            return Err(Error::IllegalState(
                "Max is 1 based and must be greater than 0!".to_string(),
            ));
        }
        if self.last_fetch_size > 0 {
            return Err(Error::RecordsPending);
        }

        debug!(sql = %stmt.sql, start, max, "Fetching records");
        let rows = conn.query(&stmt.sql, &stmt.params).await?.rows;
        let available = rows.len().saturating_sub(start);
        let limit = usize::try_from(max).unwrap_or(usize::MAX);

        let mut fetched = 0;
        for row in rows.into_iter().skip(start).take(limit) {
            let record = Record::from_row(Arc::clone(context), row)?.with_options(options);
            self.records.push(record);
            fetched += 1;
        }
        self.all_retrieved = available < limit;
        self.last_fetch_size = fetched;
        Ok(fetched)
    }

    /// Appends a record.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// All records.
    #[must_use]
    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// All records, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [Record] {
        &mut self.records
    }

    /// Record at `index`.
    pub fn get(&self, index: usize) -> Result<&Record> {
        self.records.get(index).ok_or_else(|| not_found(index))
    }

    /// Record at `index`, mutably.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut Record> {
        self.records.get_mut(index).ok_or_else(|| not_found(index))
    }

    /// Removes and returns the record at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Record> {
        if index >= self.records.len() {
            return Err(not_found(index));
        }
        Ok(self.records.remove(index))
    }

    /// Keeps only the records for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Record) -> bool) {
        self.records.retain(keep);
    }

    /// Drops every record and resets the fetch state.
    pub fn clear(&mut self) {
        self.records.clear();
        self.all_retrieved = false;
        self.last_fetch_size = 0;
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when no record is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn not_found(index: usize) -> Error {
    Error::IllegalState(format!("Record not found at index: {index}"))
}

/// Accessors shared by every dataset.
pub trait DataSet {
    /// The record collection.
    fn record_set(&self) -> &RecordSet;

    /// The record collection, mutably.
    fn record_set_mut(&mut self) -> &mut RecordSet;

    /// Context shared by the records.
    fn context(&self) -> &Arc<RowContext>;

    /// SELECT statement the dataset fetches with.
    fn select_string(&self) -> Result<String>;

    /// Schema of the records.
    fn schema(&self) -> &Arc<Schema> {
        self.context().schema()
    }

    /// All records.
    fn records(&self) -> &[Record] {
        self.record_set().as_slice()
    }

    /// Record at a 0-based index.
    fn record(&self, index: usize) -> Result<&Record> {
        self.record_set().get(index)
    }

    /// Record at a 0-based index, mutably.
    fn record_mut(&mut self, index: usize) -> Result<&mut Record> {
        self.record_set_mut().get_mut(index)
    }

    /// First record matching `predicate`.
    fn find_record(&self, predicate: impl FnMut(&&Record) -> bool) -> Option<&Record> {
        self.records().iter().find(predicate)
    }

    /// Removes the record at a 0-based index.
    fn remove_record(&mut self, index: usize) -> Result<Record> {
        self.record_set_mut().remove(index)
    }

    /// Drops all records so the dataset can fetch again.
    fn clear_records(&mut self) {
        self.record_set_mut().clear();
    }

    /// Number of records held.
    fn len(&self) -> usize {
        self.record_set().len()
    }

    /// Returns true when no record is held.
    fn is_empty(&self) -> bool {
        self.record_set().is_empty()
    }

    /// Returns true when the last fetch reached the end of the result.
    fn all_records_retrieved(&self) -> bool {
        self.record_set().all_retrieved
    }

    /// Number of records the last fetch added.
    fn last_fetch_size(&self) -> usize {
        self.record_set().last_fetch_size
    }
}
