//! Core types for representing tabular record sets

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An ordered set of named columns plus the rows that share them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Row data
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Create an empty dataset with the given column names
    pub fn new(names: &[&str]) -> Self {
        Self {
            columns: names
                .iter()
                .enumerate()
                .map(|(i, name)| Column::new(name.to_string(), i))
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True if the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get the index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// True if a column with this name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// All column names in schema order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get a cell value by row and column index
    pub fn value(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Append a row, padding or truncating to the schema width
    pub fn push_row(&mut self, mut values: Vec<Value>) {
        while values.len() < self.columns.len() {
            values.push(Value::Null);
        }
        values.truncate(self.columns.len());
        self.rows.push(Row::new(values));
    }

    /// Return a new dataset containing only the named columns, in the given order
    pub fn project(&self, names: &[String]) -> Result<Dataset> {
        let indices: Vec<usize> = names
            .iter()
            .map(|n| {
                self.column_index(n)
                    .ok_or_else(|| Error::ColumnNotFound { column: n.clone() })
            })
            .collect::<Result<_>>()?;

        let columns: Vec<Column> = names
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.clone(), i))
            .collect();

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|row| {
                Row::new(
                    indices
                        .iter()
                        .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
                        .collect(),
                )
            })
            .collect();

        Ok(Dataset { columns, rows })
    }

    /// Return a new dataset with an all-blank column appended
    pub fn with_blank_column(&self, name: &str) -> Dataset {
        let mut columns = self.columns.clone();
        columns.push(Column::new(name.to_string(), columns.len()));

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|row| {
                let mut values = row.values.clone();
                values.push(Value::Text(String::new()));
                Row::new(values)
            })
            .collect();

        Dataset { columns, rows }
    }

    /// Return a copy of this dataset's schema with no rows
    pub fn empty_like(&self) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: Vec::new(),
        }
    }
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (e.g., "email")
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Cell values for each column
    pub values: Vec<Value>,
}

impl Row {
    /// Create a new row
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// A scalar cell value with type detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// String value
    Text(String),
    /// Calendar date (ISO `%Y-%m-%d` on the wire)
    Date(NaiveDate),
    /// Absent value
    Null,
}

impl Value {
    /// Parse a string into a Value, detecting the type
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Value::Null;
        }

        // Try parsing as integer first
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }

        // Try parsing as float
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }

        // Try parsing as an ISO date
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Value::Date(d);
        }

        // Otherwise, keep as string
        Value::Text(trimmed.to_string())
    }

    /// True only for the explicit absent value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True if the value counts as absent for merge purposes.
    ///
    /// Text is absent when its whitespace-trimmed form is empty; any other
    /// typed value is absent only when it is `Null`. A numeric zero or a
    /// valid date is never absent, so trimming is never applied outside of
    /// text.
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Convert to a display string; `Null` renders empty
    pub fn to_field_string(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Null => String::new(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Text(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Null => write!(f, ""),
        }
    }
}
