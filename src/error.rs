//! Error taxonomy for the evaluation harness.
//!
//! Every failure is fatal to the run. The variants only exist so that the
//! binary can report a specific message and exit code for each class of
//! failure.

use thiserror::Error;

/// Result alias used throughout the harness
pub type Result<T> = std::result::Result<T, EvalError>;

/// Exit code for an unparseable seed
pub const EXIT_INVALID_SEED: u8 = 2;
/// Exit code for an unparseable or out-of-range fold count
pub const EXIT_INVALID_FOLDS: u8 = 3;
/// Exit code for a dataset that does not match the feature schema
pub const EXIT_SCHEMA_MISMATCH: u8 = 4;
/// Exit code for a model that failed to fit or score
pub const EXIT_MODEL_FAILURE: u8 = 5;
/// Exit code for anything else
pub const EXIT_UNEXPECTED: u8 = 99;

/// Invalid run configuration, detected before any computation starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Value of chosen_seed should be int, got '{value}'")]
    InvalidSeed {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Value of n_cv_folds should be int, got '{value}'")]
    InvalidFoldCount {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("n_cv_folds must be at least 2, got {0}")]
    TooFewFolds(usize),

    #[error("n_cv_folds ({folds}) cannot exceed the number of rows ({rows})")]
    TooManyFolds { folds: usize, rows: usize },
}

/// Disagreement between the declared feature schema and the dataset
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Dataset column '{0}' is not assigned to any feature group")]
    Unassigned(String),

    #[error("Feature group '{group}' declares column '{column}' which is not in the dataset")]
    MissingColumn { group: String, column: String },

    #[error("Column '{column}' is declared in both '{first}' and '{second}'")]
    Duplicate {
        column: String,
        first: String,
        second: String,
    },

    #[error("Label column '{0}' must not be declared in a feature group")]
    LabelDeclared(String),
}

/// Top-level harness error
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Invalid data: {0}")]
    Data(String),

    #[error("Model '{model}' has not been fitted")]
    NotFitted { model: String },

    #[error("Model '{model}' failed on fold {fold}: {source}")]
    ModelFailure {
        model: String,
        fold: usize,
        #[source]
        source: Box<EvalError>,
    },

    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}

impl EvalError {
    /// Shorthand for a data error
    pub fn data(message: impl Into<String>) -> Self {
        EvalError::Data(message.into())
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            EvalError::Config(ConfigError::InvalidSeed { .. }) => EXIT_INVALID_SEED,
            EvalError::Config(_) => EXIT_INVALID_FOLDS,
            EvalError::Schema(_) => EXIT_SCHEMA_MISMATCH,
            EvalError::ModelFailure { .. } => EXIT_MODEL_FAILURE,
            _ => EXIT_UNEXPECTED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_have_distinct_exit_codes() {
        let seed = EvalError::from(ConfigError::InvalidSeed {
            value: "abc".to_string(),
            source: "abc".parse::<i64>().unwrap_err(),
        });
        let folds = EvalError::from(ConfigError::InvalidFoldCount {
            value: "x".to_string(),
            source: "x".parse::<i64>().unwrap_err(),
        });

        assert_eq!(seed.exit_code(), EXIT_INVALID_SEED);
        assert_eq!(folds.exit_code(), EXIT_INVALID_FOLDS);
        assert_ne!(seed.exit_code(), folds.exit_code());
    }

    #[test]
    fn test_model_failure_message_names_model_and_fold() {
        let err = EvalError::ModelFailure {
            model: "Decision Tree".to_string(),
            fold: 3,
            source: Box::new(EvalError::data("empty training set")),
        };

        let message = err.to_string();
        assert!(message.contains("Decision Tree"));
        assert!(message.contains("fold 3"));
        assert_eq!(err.exit_code(), EXIT_MODEL_FAILURE);
    }

    #[test]
    fn test_data_error_is_generic() {
        assert_eq!(EvalError::data("bad").exit_code(), EXIT_UNEXPECTED);
    }
}
