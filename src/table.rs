//! The table data collaborator.
//!
//! The grid never owns cell storage; it talks to a [`TableData`]
//! implementation through a shared handle. [`MemTable`] is a chunked
//! in-memory implementation for embedding and tests.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, PoisonError};

/// A cell value; `None` is null
pub type CellValue = Option<String>;

/// Per-cell access to the data behind a grid. Coordinates are logical
/// indexes, never visual positions.
pub trait TableData {
    fn column_count(&self) -> usize;
    fn row_count(&self) -> usize;
    fn get_value(&self, col: usize, row: usize) -> CellValue;
    /// Store a value; `false` when the model refused it
    fn set_value(&mut self, col: usize, row: usize, value: CellValue) -> bool;
    /// Validate a candidate without storing it. `Some(message)` rejects.
    fn check_value(&self, _col: usize, _row: usize, _candidate: &CellValue) -> Option<String> {
        None
    }
}

/// Table data shared between the view and the copy worker
pub type SharedTable = Arc<RwLock<dyn TableData + Send + Sync>>;

pub fn share<T: TableData + Send + Sync + 'static>(table: T) -> SharedTable {
    Arc::new(RwLock::new(table))
}

/// Read access that survives a poisoned lock; the data owns its own
/// consistency.
pub fn read(table: &SharedTable) -> RwLockReadGuard<'_, dyn TableData + Send + Sync + 'static> {
    table.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write(table: &SharedTable) -> RwLockWriteGuard<'_, dyn TableData + Send + Sync + 'static> {
    table.write().unwrap_or_else(PoisonError::into_inner)
}

/// Number of rows per chunk for memory-efficient storage
pub const CHUNK_SIZE: usize = 1024;

type Validator = Box<dyn Fn(usize, usize, &CellValue) -> Option<String> + Send + Sync>;

/// In-memory table with chunked row storage
pub struct MemTable {
    /// Rows stored in fixed-size chunks
    chunks: Vec<Vec<Vec<CellValue>>>,
    total_rows: usize,
    col_count: usize,
    validator: Option<Validator>,
}

impl fmt::Debug for MemTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemTable")
            .field("total_rows", &self.total_rows)
            .field("col_count", &self.col_count)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl MemTable {
    #[inline]
    fn chunk_idx(row: usize) -> usize {
        row / CHUNK_SIZE
    }

    #[inline]
    fn row_in_chunk(row: usize) -> usize {
        row % CHUNK_SIZE
    }

    /// Table of `cols` x `rows` null cells
    pub fn new(cols: usize, rows: usize) -> Self {
        let mut table = Self {
            chunks: Vec::new(),
            total_rows: 0,
            col_count: cols,
            validator: None,
        };
        table.insert_rows(0, rows);
        table
    }

    /// Build from row-major text; short rows are padded with nulls
    pub fn from_rows(rows: Vec<Vec<&str>>) -> Self {
        let col_count = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let cells: Vec<Vec<CellValue>> = rows
            .into_iter()
            .map(|row| {
                let mut row: Vec<CellValue> = row.into_iter().map(|s| Some(s.to_string())).collect();
                row.resize(col_count, None);
                row
            })
            .collect();
        let total_rows = cells.len();
        let chunks = cells.chunks(CHUNK_SIZE).map(|chunk| chunk.to_vec()).collect();
        Self {
            chunks,
            total_rows,
            col_count,
            validator: None,
        }
    }

    /// Reject candidates for which `validator` returns a message
    pub fn with_validator(
        mut self,
        validator: impl Fn(usize, usize, &CellValue) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    fn row_mut(&mut self, row: usize) -> Option<&mut Vec<CellValue>> {
        self.chunks
            .get_mut(Self::chunk_idx(row))?
            .get_mut(Self::row_in_chunk(row))
    }

    fn row_ref(&self, row: usize) -> Option<&Vec<CellValue>> {
        self.chunks
            .get(Self::chunk_idx(row))?
            .get(Self::row_in_chunk(row))
    }

    fn flatten(&mut self) -> Vec<Vec<CellValue>> {
        std::mem::take(&mut self.chunks).into_iter().flatten().collect()
    }

    fn rechunk(&mut self, rows: Vec<Vec<CellValue>>) {
        self.total_rows = rows.len();
        self.chunks = rows.chunks(CHUNK_SIZE).map(|chunk| chunk.to_vec()).collect();
    }

    /// Insert `count` null rows before `at`
    pub fn insert_rows(&mut self, at: usize, count: usize) {
        let at = at.min(self.total_rows);
        let mut rows = self.flatten();
        let blank = vec![None; self.col_count];
        rows.splice(at..at, std::iter::repeat(blank).take(count));
        self.rechunk(rows);
    }

    /// Remove `count` rows starting at `at`
    pub fn delete_rows(&mut self, at: usize, count: usize) {
        let at = at.min(self.total_rows);
        let end = (at + count).min(self.total_rows);
        let mut rows = self.flatten();
        rows.drain(at..end);
        self.rechunk(rows);
    }

    /// Grow or shrink every row to `cols` columns
    pub fn set_column_count(&mut self, cols: usize) {
        for chunk in self.chunks.iter_mut() {
            for row in chunk.iter_mut() {
                row.resize(cols, None);
            }
        }
        self.col_count = cols;
    }

    /// Text of a cell, `""` for null (test and debug helper)
    pub fn text(&self, col: usize, row: usize) -> String {
        self.get_value(col, row).unwrap_or_default()
    }
}

impl TableData for MemTable {
    fn column_count(&self) -> usize {
        self.col_count
    }

    fn row_count(&self) -> usize {
        self.total_rows
    }

    fn get_value(&self, col: usize, row: usize) -> CellValue {
        self.row_ref(row)?.get(col)?.clone()
    }

    fn set_value(&mut self, col: usize, row: usize, value: CellValue) -> bool {
        if self.check_value(col, row, &value).is_some() {
            return false;
        }
        match self.row_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    fn check_value(&self, col: usize, row: usize, candidate: &CellValue) -> Option<String> {
        if col >= self.col_count || row >= self.total_rows {
            return Some(format!("cell ({}, {}) is outside the table", col, row));
        }
        self.validator.as_ref().and_then(|v| v(col, row, candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_pads_short_rows() {
        let table = MemTable::from_rows(vec![vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get_value(0, 1), Some("d".to_string()));
        assert_eq!(table.get_value(2, 1), None);
    }

    #[test]
    fn set_value_outside_is_refused() {
        let mut table = MemTable::new(2, 2);
        assert!(table.set_value(1, 1, Some("x".to_string())));
        assert!(!table.set_value(2, 0, Some("x".to_string())));
        assert_eq!(table.text(1, 1), "x");
    }

    #[test]
    fn validator_rejects() {
        let mut table = MemTable::new(2, 2).with_validator(|_, _, v| match v {
            Some(s) if s.parse::<i64>().is_err() => Some(format!("'{}' is not a number", s)),
            _ => None,
        });
        assert!(table.check_value(0, 0, &Some("abc".to_string())).is_some());
        assert!(!table.set_value(0, 0, Some("abc".to_string())));
        assert!(table.set_value(0, 0, Some("42".to_string())));
    }

    #[test]
    fn rows_span_chunks() {
        let mut table = MemTable::new(1, CHUNK_SIZE + 5);
        table.set_value(0, CHUNK_SIZE + 2, Some("far".to_string()));
        table.insert_rows(0, 1);
        assert_eq!(table.text(0, CHUNK_SIZE + 3), "far");
        table.delete_rows(0, 10);
        assert_eq!(table.row_count(), CHUNK_SIZE - 4);
        assert_eq!(table.text(0, CHUNK_SIZE - 7), "far");
    }

    #[test]
    fn shared_handle_reads_and_writes() {
        let shared = share(MemTable::from_rows(vec![vec!["a"]]));
        assert!(write(&shared).set_value(0, 0, Some("b".to_string())));
        assert_eq!(read(&shared).get_value(0, 0), Some("b".to_string()));
    }
}
