//! Scaling and encoding of imputed columns into numeric output blocks

use std::collections::BTreeSet;

use crate::error::{EvalError, Result};
use crate::pipeline::estimator::Estimator;
use crate::pipeline::frame::Column;

/// Output columns of one encoder, each with one value per input row
pub type Block = Vec<Vec<f64>>;

fn complete_numeric(column: &Column, name: &str) -> Result<Vec<f64>> {
    column
        .to_numeric(name)?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                EvalError::data(format!(
                    "Column '{}' still has missing values after imputation",
                    name
                ))
            })
        })
        .collect()
}

/// Standardizes a column to zero mean and unit variance
#[derive(Debug, Clone)]
pub struct StandardScaler {
    column: String,
    mean: f64,
    scale: f64,
    fitted: bool,
}

impl StandardScaler {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            mean: 0.0,
            scale: 1.0,
            fitted: false,
        }
    }

    /// Learned `(mean, scale)`
    pub fn params(&self) -> (f64, f64) {
        (self.mean, self.scale)
    }
}

impl Estimator<Column> for StandardScaler {
    type Out = Block;

    fn fit(&mut self, input: &Column, _labels: &[u8]) -> Result<()> {
        let values = complete_numeric(input, &self.column)?;
        if values.is_empty() {
            return Err(EvalError::data(format!(
                "Cannot fit scaler on empty column '{}'",
                self.column
            )));
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        self.mean = mean;
        // Constant columns are centred but not scaled
        self.scale = if std > f64::EPSILON { std } else { 1.0 };
        self.fitted = true;
        Ok(())
    }

    fn apply(&self, input: &Column) -> Result<Block> {
        if !self.fitted {
            return Err(EvalError::NotFitted {
                model: format!("scaler[{}]", self.column),
            });
        }
        let values = complete_numeric(input, &self.column)?;
        Ok(vec![values
            .into_iter()
            .map(|v| (v - self.mean) / self.scale)
            .collect()])
    }
}

/// One indicator column per category seen at fit time.
///
/// Categories unseen during fitting encode as all zeros.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    column: String,
    categories: Option<Vec<String>>,
}

impl OneHotEncoder {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            categories: None,
        }
    }

    /// Known categories in output order (sorted)
    pub fn categories(&self) -> &[String] {
        self.categories.as_deref().unwrap_or(&[])
    }
}

impl Estimator<Column> for OneHotEncoder {
    type Out = Block;

    fn fit(&mut self, input: &Column, _labels: &[u8]) -> Result<()> {
        let categories: BTreeSet<String> = input.to_categorical().into_iter().flatten().collect();
        self.categories = Some(categories.into_iter().collect());
        Ok(())
    }

    fn apply(&self, input: &Column) -> Result<Block> {
        let categories = self.categories.as_ref().ok_or_else(|| EvalError::NotFitted {
            model: format!("one-hot[{}]", self.column),
        })?;

        let values = input.to_categorical();
        let mut block = vec![vec![0.0; values.len()]; categories.len()];
        for (row, value) in values.iter().enumerate() {
            if let Some(value) = value {
                if let Ok(pos) = categories.binary_search(value) {
                    block[pos][row] = 1.0;
                }
            }
        }
        Ok(block)
    }
}

/// Emits the (imputed) numeric value unchanged
#[derive(Debug, Clone)]
pub struct Passthrough {
    column: String,
}

impl Passthrough {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Estimator<Column> for Passthrough {
    type Out = Block;

    fn fit(&mut self, input: &Column, _labels: &[u8]) -> Result<()> {
        complete_numeric(input, &self.column).map(|_| ())
    }

    fn apply(&self, input: &Column) -> Result<Block> {
        Ok(vec![complete_numeric(input, &self.column)?])
    }
}
