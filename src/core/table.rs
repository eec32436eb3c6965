//! Raw tabular input: a header plus rows of loosely typed scalars.

use crate::error::{Result, SchemaError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A single raw cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    #[default]
    Null,
    Text(String),
    Number(f64),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Scalar::Null,
            serde_json::Value::Bool(b) => Scalar::Number(if b { 1.0 } else { 0.0 }),
            serde_json::Value::Number(n) => n.as_f64().map(Scalar::Number).unwrap_or_default(),
            serde_json::Value::String(s) => Scalar::Text(s),
            other => Scalar::Text(other.to_string()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// An ordered sequence of rows sharing one header.
///
/// No schema is imposed beyond every row having one cell per column;
/// column meaning is assigned later by a column selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

impl RawTable {
    /// Create a table, checking that every row matches the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(SchemaError::RaggedRow {
                    row: i,
                    expected: columns.len(),
                    got: row.len(),
                }
                .into());
            }
        }
        Ok(Self { columns, rows })
    }

    /// Read a CSV stream with a header row. Empty fields become [`Scalar::Null`].
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != columns.len() {
                return Err(SchemaError::RaggedRow {
                    row: i,
                    expected: columns.len(),
                    got: record.len(),
                }
                .into());
            }
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            Scalar::Null
                        } else {
                            Scalar::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }

        Ok(Self { columns, rows })
    }

    /// Read a CSV file with a header row.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file))
    }

    /// Parse a JSON array of flat objects.
    ///
    /// Columns appear in first-seen key order; keys absent from a record
    /// become [`Scalar::Null`].
    pub fn from_json_records(json: &str) -> Result<Self> {
        let records: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(json)?;

        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in &records {
            for key in record.keys() {
                if !index.contains_key(key) {
                    index.insert(key.clone(), columns.len());
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|record| {
                let mut row = vec![Scalar::Null; columns.len()];
                for (key, value) in record {
                    if let Some(&col) = index.get(&key) {
                        row[col] = Scalar::from_json(value);
                    }
                }
                row
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column in the header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Position of a column, or a [`SchemaError::MissingColumn`].
    pub fn require_column(&self, name: &str) -> std::result::Result<usize, SchemaError> {
        self.column_index(name)
            .ok_or_else(|| SchemaError::MissingColumn {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }

    /// Cell at (`row`, `col`).
    pub fn cell(&self, row: usize, col: usize) -> &Scalar {
        &self.rows[row][col]
    }

    /// Keep only the rows for which `keep` is true, preserving order.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Scalar]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }
}
