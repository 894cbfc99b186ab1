//! In-memory column store consumed by the preprocessing steps

use crate::error::{EvalError, Result};

/// A single feature column. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of missing cells
    pub fn null_count(&self) -> usize {
        match self {
            Column::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
            Column::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    /// Copy of the column restricted to `rows`, in the given order
    pub fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(values) => Column::Numeric(rows.iter().map(|&i| values[i]).collect()),
            Column::Categorical(values) => {
                Column::Categorical(rows.iter().map(|&i| values[i].clone()).collect())
            }
        }
    }

    /// View the column as numbers. Text cells must parse as `f64`.
    ///
    /// `NaN` counts as missing.
    pub fn to_numeric(&self, name: &str) -> Result<Vec<Option<f64>>> {
        match self {
            Column::Numeric(values) => Ok(values
                .iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect()),
            Column::Categorical(values) => values
                .iter()
                .map(|v| match v {
                    None => Ok(None),
                    Some(s) => s
                        .trim()
                        .parse::<f64>()
                        .map(|x| Some(x).filter(|x| !x.is_nan()))
                        .map_err(|_| {
                            EvalError::data(format!(
                                "Column '{}' must be numeric, found value '{}'",
                                name, s
                            ))
                        }),
                })
                .collect(),
        }
    }

    /// View the column as text. Numbers are formatted with `{}`.
    pub fn to_categorical(&self) -> Vec<Option<String>> {
        match self {
            Column::Numeric(values) => values.iter().map(|v| v.map(|n| format!("{}", n))).collect(),
            Column::Categorical(values) => values.clone(),
        }
    }
}

/// Ordered collection of named feature columns of equal length
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<(String, Column)>,
    height: usize,
}

impl FeatureFrame {
    /// Build a frame, checking that every column has the same length and
    /// that names are unique
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self> {
        let height = columns.first().map(|(_, c)| c.len()).unwrap_or(0);

        for (i, (name, column)) in columns.iter().enumerate() {
            if column.len() != height {
                return Err(EvalError::data(format!(
                    "Column '{}' has {} rows, expected {}",
                    name,
                    column.len(),
                    height
                )));
            }
            if columns[..i].iter().any(|(other, _)| other == name) {
                return Err(EvalError::data(format!("Duplicate column name '{}'", name)));
            }
        }

        Ok(Self { columns, height })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
    }

    /// Like [`FeatureFrame::column`], but a missing column is an error
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| EvalError::data(format!("Column '{}' not found", name)))
    }

    /// Row subset of every column, used to build fold-local frames
    pub fn take(&self, rows: &[usize]) -> FeatureFrame {
        FeatureFrame {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.take(rows)))
                .collect(),
            height: rows.len(),
        }
    }
}
