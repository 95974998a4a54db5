//! Record exchanged between reader and writer tasks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of data: an ordered list of column values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Column values in declaration order.
    pub columns: Vec<Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record with the given columns.
    pub fn with_columns(columns: Vec<Value>) -> Self {
        Self { columns }
    }

    /// Appends a column.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.columns.push(value.into());
    }

    /// Returns the column at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.columns.get(index)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
