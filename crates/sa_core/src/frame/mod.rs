//! Tabular input model.
//!
//! A `Frame` is an ordered sequence of named columns sharing one row
//! count. It is immutable once handed to the harness; every component
//! downstream of the loader treats it as read-only.

pub mod loader;

pub use loader::load_frame;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Fault;

/// Value kind carried by a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Numeric,
    Categorical,
    Datetime,
}

/// Column payload. Missing cells are `None`; the missing policy is
/// applied later, per descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
    Datetime(Vec<Option<NaiveDateTime>>),
}

impl ColumnData {
    pub fn kind(&self) -> ValueKind {
        match self {
            ColumnData::Numeric(_) => ValueKind::Numeric,
            ColumnData::Categorical(_) => ValueKind::Categorical,
            ColumnData::Datetime(_) => ValueKind::Datetime,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
            ColumnData::Datetime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of present (non-missing) cells.
    pub fn present(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.iter().filter(|c| c.is_some()).count(),
            ColumnData::Categorical(v) => v.iter().filter(|c| c.is_some()).count(),
            ColumnData::Datetime(v) => v.iter().filter(|c| c.is_some()).count(),
        }
    }
}

/// One named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Numeric(values.into_iter().map(Some).collect()),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<&str>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Categorical(
                values.into_iter().map(|s| Some(s.to_string())).collect(),
            ),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.data.kind()
    }

    /// Numeric view of the column, `None` when not numeric.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// Categorical view of the column, `None` when not categorical.
    pub fn as_categorical(&self) -> Option<&[Option<String>]> {
        match &self.data {
            ColumnData::Categorical(v) => Some(v),
            _ => None,
        }
    }
}

/// Ordered, immutable table of columns with a shared row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    rows: usize,
}

impl Frame {
    /// Builds a frame, enforcing the shared row count.
    pub fn new(columns: Vec<Column>) -> Result<Self, Fault> {
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        for col in &columns {
            if col.data.len() != rows {
                return Err(Fault::LoadFailure(format!(
                    "column '{}' has {} rows, expected {}",
                    col.name,
                    col.data.len(),
                    rows
                )));
            }
        }
        Ok(Frame { columns, rows })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_enforces_shared_row_count() {
        let cols = vec![
            Column::numeric("a", vec![1.0, 2.0]),
            Column::numeric("b", vec![1.0]),
        ];
        assert!(matches!(Frame::new(cols), Err(Fault::LoadFailure(_))));
    }

    #[test]
    fn frame_preserves_column_order() {
        let f = Frame::new(vec![
            Column::numeric("x", vec![1.0]),
            Column::categorical("g", vec!["a"]),
        ])
        .unwrap();
        assert_eq!(f.names(), vec!["x", "g"]);
        assert_eq!(f.column("g").unwrap().kind(), ValueKind::Categorical);
        assert_eq!(f.rows(), 1);
    }

    #[test]
    fn present_counts_skip_missing() {
        let data = ColumnData::Numeric(vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(data.present(), 2);
        assert_eq!(data.len(), 3);
    }
}
