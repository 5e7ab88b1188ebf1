//! Data
//!
//! Column-oriented tabular container handed to the drift detector. A `Dataset` is an ordered
//! collection of named columns of equal length, each holding either numeric values (`NaN` marks
//! a missing value) or categorical labels (`None` marks a missing value).
use crate::errors::DriftError;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Which side of the comparison a sample comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Training-time data.
    Reference,
    /// Live data.
    Observed,
}

impl Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Reference => write!(f, "reference"),
            Source::Observed => write!(f, "observed"),
        }
    }
}

/// Statistical type of a column, decided once per column and used to pick the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Categorical,
    Continuous,
}

impl ColumnType {
    /// Classify a column by its element type: labels are categorical, numbers are continuous.
    pub fn classify(values: &ColumnValues) -> Self {
        match values {
            ColumnValues::Numeric(_) => ColumnType::Continuous,
            ColumnValues::Categorical(_) => ColumnType::Categorical,
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Categorical => write!(f, "categorical"),
            ColumnType::Continuous => write!(f, "continuous"),
        }
    }
}

/// Typed values of a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Numeric values, `NaN` is missing.
    Numeric(Vec<f64>),
    /// Labels, `None` is missing.
    Categorical(Vec<Option<String>>),
}

impl ColumnValues {
    /// Number of rows, including missing ones.
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values with missing entries removed, `None` for categorical columns.
    pub fn present_numbers(&self) -> Option<Vec<f64>> {
        match self {
            ColumnValues::Numeric(v) => Some(v.iter().copied().filter(|x| !x.is_nan()).collect()),
            ColumnValues::Categorical(_) => None,
        }
    }

    /// Labels with missing entries removed, `None` for numeric columns.
    pub fn present_labels(&self) -> Option<Vec<&str>> {
        match self {
            ColumnValues::Numeric(_) => None,
            ColumnValues::Categorical(v) => Some(v.iter().filter_map(|x| x.as_deref()).collect()),
        }
    }

    /// Number of non-missing values.
    pub fn present_count(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.iter().filter(|x| !x.is_nan()).count(),
            ColumnValues::Categorical(v) => v.iter().filter(|x| x.is_some()).count(),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    /// Create a new column.
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Create a numeric column.
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Column::new(name, ColumnValues::Numeric(values))
    }

    /// Create a categorical column with no missing values.
    pub fn categorical<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Column::new(
            name,
            ColumnValues::Categorical(values.into_iter().map(|v| Some(v.into())).collect()),
        )
    }

    /// Type of the column.
    pub fn column_type(&self) -> ColumnType {
        ColumnType::classify(&self.values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered collection of equally sized, uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Create a dataset, checking that column names are unique and lengths agree.
    ///
    /// * `columns` - The columns, in the order they should be reported.
    pub fn new(columns: Vec<Column>) -> Result<Self, DriftError> {
        let mut index = HashMap::with_capacity(columns.len());
        let expected = columns.first().map(|c| c.len()).unwrap_or(0);
        for (i, col) in columns.iter().enumerate() {
            if index.insert(col.name.clone(), i).is_some() {
                return Err(DriftError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != expected {
                return Err(DriftError::LengthMismatch {
                    column: col.name.clone(),
                    expected,
                    actual: col.len(),
                });
            }
        }
        Ok(Dataset { columns, index })
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Name and type of every column, in order.
    pub fn schema(&self) -> Vec<(&str, ColumnType)> {
        self.columns.iter().map(|c| (c.name.as_str(), c.column_type())).collect()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
