//! Binary label validation and extraction
//!
//! The label column must hold only 0 and 1, with no missing values. Numeric,
//! boolean and text encodings of those two values are accepted.

use polars::prelude::*;

use crate::error::{EvalError, Result};

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Read the label column as 0/1 values
pub fn extract_labels(df: &DataFrame, target: &str) -> Result<Vec<u8>> {
    let target_col = df
        .column(target)
        .map_err(|_| EvalError::data(format!("Target column '{}' not found", target)))?;

    if target_col.len() == 0 {
        return Err(EvalError::data(format!("Target column '{}' is empty", target)));
    }
    if target_col.null_count() > 0 {
        return Err(EvalError::data(format!(
            "Target column '{}' has {} missing values",
            target,
            target_col.null_count()
        )));
    }

    let dtype = target_col.dtype();
    let values: Vec<Option<f64>> = if dtype.is_primitive_numeric() || matches!(dtype, DataType::Boolean) {
        let float_col = target_col.cast(&DataType::Float64)?;
        float_col.f64()?.into_iter().collect()
    } else {
        let text_col = target_col.cast(&DataType::String)?;
        text_col
            .str()?
            .into_iter()
            .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
            .collect()
    };

    values
        .into_iter()
        .map(|v| match v {
            Some(x) if x.abs() < TOLERANCE => Ok(0),
            Some(x) if (x - 1.0).abs() < TOLERANCE => Ok(1),
            _ => Err(EvalError::data(format!(
                "Target column '{}' must contain only 0 and 1",
                target
            ))),
        })
        .collect()
}

/// Share of positive labels
pub fn positive_rate(labels: &[u8]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    labels.iter().filter(|&&l| l == 1).count() as f64 / labels.len() as f64
}
