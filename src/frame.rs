//! Typed columnar frames returned to the dashboard

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    DateTime,
    Number,
    Boolean,
    String,
}

/// Null-aware cells of a column, all of one type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum ColumnValues {
    DateTime(Vec<Option<DateTime<Utc>>>),
    Number(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    String(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnValues::DateTime(_) => ColumnType::DateTime,
            ColumnValues::Number(_) => ColumnType::Number,
            ColumnValues::Boolean(_) => ColumnType::Boolean,
            ColumnValues::String(_) => ColumnType::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::DateTime(values) => values.len(),
            ColumnValues::Number(values) => values.len(),
            ColumnValues::Boolean(values) => values.len(),
            ColumnValues::String(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `None` cells.
    pub fn null_count(&self) -> usize {
        match self {
            ColumnValues::DateTime(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnValues::Number(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnValues::Boolean(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnValues::String(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(flatten)]
    pub values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn column_type(&self) -> ColumnType {
        self.values.column_type()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Named, ordered set of equally long columns.
///
/// Built once per query result and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub name: String,
    pub fields: Vec<Column>,
}

impl Frame {
    /// Assembles a frame, keeping the columns in the order given.
    pub fn new(name: impl Into<String>, fields: Vec<Column>) -> Self {
        Frame {
            name: name.into(),
            fields,
        }
    }

    /// Number of rows, taken from the first column (zero without columns).
    pub fn row_count(&self) -> usize {
        self.fields.first().map(Column::len).unwrap_or(0)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.fields.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|column| column.name.as_str()).collect()
    }

    /// True when every column has the same length.
    pub fn is_rectangular(&self) -> bool {
        let rows = self.row_count();
        self.fields.iter().all(|column| column.len() == rows)
    }
}
