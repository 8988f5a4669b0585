//! Tabular dataset model with dynamically typed cells.
//!
//! Column types are only known once a source has been loaded, so every cell is
//! a tagged value checked against its column's type on insertion.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    Text,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Nulls fit any column.
    pub fn fits(&self, column_type: ColumnType) -> bool {
        matches!(
            (self, column_type),
            (Self::Null, _)
                | (Self::Boolean(_), ColumnType::Boolean)
                | (Self::Integer(_), ColumnType::Integer)
                | (Self::Float(_), ColumnType::Float)
                | (Self::Text(_), ColumnType::Text)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetError {
    message: String,
}

impl DatasetError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DatasetError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn try_from_rows(
        columns: Vec<Column>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, DatasetError> {
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// A dataset with the same columns and no rows.
    pub fn empty_like(&self) -> Self {
        Self::new(self.columns.clone())
    }

    pub fn push_row(&mut self, values: Vec<CellValue>) -> Result<(), DatasetError> {
        if values.len() != self.columns.len() {
            return Err(DatasetError::new(format!(
                "Row {} has {} values but the dataset has {} columns",
                self.rows.len(),
                values.len(),
                self.columns.len()
            )));
        }

        for (column, value) in self.columns.iter().zip(&values) {
            if !value.fits(column.column_type) {
                return Err(DatasetError::new(format!(
                    "Row {} holds {value:?} in {} column '{}'",
                    self.rows.len(),
                    column.column_type.as_str(),
                    column.name
                )));
            }
        }

        self.rows.push(values);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// Cells of one column, top to bottom.
    pub(crate) fn column_cells(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().map(move |row| &row[index])
    }

    pub(crate) fn push_unchecked(&mut self, row: &Row<'_>) {
        self.rows.push(row.values.to_vec());
    }
}

/// Borrowed view of one row: column name to cell.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [Column],
    values: &'a [CellValue],
}

impl<'a> Row<'a> {
    pub fn get(&self, column_name: &str) -> Option<&'a CellValue> {
        let values = self.values;
        self.columns
            .iter()
            .position(|column| column.name == column_name)
            .map(|index| &values[index])
    }

    pub fn values(&self) -> &'a [CellValue] {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> {
        let (columns, values) = (self.columns, self.values);
        columns
            .iter()
            .map(|column| column.name.as_str())
            .zip(values.iter())
    }

    pub fn has_null(&self) -> bool {
        self.values.iter().any(CellValue::is_null)
    }
}
