//! Immutable run configuration

use std::path::PathBuf;

/// Default number of cross-validation folds
pub const DEFAULT_FOLDS: usize = 5;
/// Default seed for folds and models
pub const DEFAULT_SEED: u64 = 1;
/// Default label column
pub const DEFAULT_TARGET: &str = "is_canceled";
/// Rows scanned to infer CSV column types
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

/// Everything one evaluation run needs, resolved once from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct EvalConfig {
    pub train_data: PathBuf,
    pub report: PathBuf,
    pub n_folds: usize,
    pub seed: u64,
    pub target: String,
    pub verbose: bool,
    /// Worker threads for the evaluation pool; `None` uses every core
    pub n_jobs: Option<usize>,
    /// CSV schema inference rows; 0 scans the whole file
    pub infer_schema_length: usize,
}

impl EvalConfig {
    pub fn new(train_data: impl Into<PathBuf>, report: impl Into<PathBuf>) -> Self {
        Self {
            train_data: train_data.into(),
            report: report.into(),
            n_folds: DEFAULT_FOLDS,
            seed: DEFAULT_SEED,
            target: DEFAULT_TARGET.to_string(),
            verbose: false,
            n_jobs: None,
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}
