//! Missing value imputation

use crate::error::{EvalError, Result};
use crate::pipeline::estimator::Estimator;
use crate::pipeline::frame::Column;

/// Placeholder category used by constant text imputation
pub const MISSING_CATEGORY: &str = "missing";

/// Rule used to fill missing cells
#[derive(Debug, Clone, PartialEq)]
pub enum ImputeStrategy {
    /// Median of the observed training values
    Median,
    /// Most frequent observed training value, ties broken by the smallest value
    MostFrequent,
    /// A fixed number
    ConstantNumber(f64),
    /// A fixed category
    ConstantText(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Fill {
    Number(f64),
    Text(String),
}

/// Fills missing cells of one column with a value learned at fit time.
///
/// A training column with no observed values imputes `0.0` (numeric) or
/// [`MISSING_CATEGORY`] (text) instead of failing.
#[derive(Debug, Clone)]
pub struct SimpleImputer {
    column: String,
    strategy: ImputeStrategy,
    fill: Option<Fill>,
}

impl SimpleImputer {
    pub fn new(column: impl Into<String>, strategy: ImputeStrategy) -> Self {
        Self {
            column: column.into(),
            strategy,
            fill: None,
        }
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }

    /// Learned fill value as a number, if the column is numeric
    pub fn numeric_fill(&self) -> Option<f64> {
        match &self.fill {
            Some(Fill::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Learned fill value as text, if the column is categorical
    pub fn text_fill(&self) -> Option<&str> {
        match &self.fill {
            Some(Fill::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl Estimator<Column> for SimpleImputer {
    type Out = Column;

    fn fit(&mut self, input: &Column, _labels: &[u8]) -> Result<()> {
        let fill = match (&self.strategy, input) {
            (ImputeStrategy::Median, column) => {
                let values = column.to_numeric(&self.column)?;
                Fill::Number(median(values.into_iter().flatten().collect()).unwrap_or(0.0))
            }
            (ImputeStrategy::MostFrequent, column @ Column::Numeric(_)) => {
                let values = column.to_numeric(&self.column)?;
                Fill::Number(most_frequent_number(values.into_iter().flatten().collect()).unwrap_or(0.0))
            }
            (ImputeStrategy::MostFrequent, Column::Categorical(values)) => Fill::Text(
                most_frequent_text(values.iter().flatten().collect())
                    .unwrap_or_else(|| MISSING_CATEGORY.to_string()),
            ),
            (ImputeStrategy::ConstantNumber(n), column) => {
                // validates that the column is numeric
                column.to_numeric(&self.column)?;
                Fill::Number(*n)
            }
            (ImputeStrategy::ConstantText(s), _) => Fill::Text(s.clone()),
        };

        self.fill = Some(fill);
        Ok(())
    }

    fn apply(&self, input: &Column) -> Result<Column> {
        let fill = self.fill.as_ref().ok_or_else(|| EvalError::NotFitted {
            model: format!("imputer[{}]", self.column),
        })?;

        match fill {
            Fill::Number(n) => {
                let values = input.to_numeric(&self.column)?;
                Ok(Column::Numeric(
                    values.into_iter().map(|v| Some(v.unwrap_or(*n))).collect(),
                ))
            }
            Fill::Text(s) => Ok(Column::Categorical(
                input
                    .to_categorical()
                    .into_iter()
                    .map(|v| Some(v.unwrap_or_else(|| s.clone())))
                    .collect(),
            )),
        }
    }
}

/// Median with the mean of the two middle values for even counts
fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn most_frequent_number(mut values: Vec<f64>) -> Option<f64> {
    values.sort_by(f64::total_cmp);
    most_frequent_sorted(&values).copied()
}

fn most_frequent_text(mut values: Vec<&String>) -> Option<String> {
    values.sort();
    most_frequent_sorted(&values).map(|s| s.to_string())
}

/// Longest run in a sorted slice; the first (smallest) value wins ties
fn most_frequent_sorted<T: PartialEq>(sorted: &[T]) -> Option<&T> {
    let mut best: Option<(&T, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let run = j - i;
        if best.map_or(true, |(_, count)| run > count) {
            best = Some((&sorted[i], run));
        }
        i = j;
    }
    best.map(|(value, _)| value)
}
