//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::pipeline::config::{EvalConfig, DEFAULT_TARGET};

/// clfbench - Cross-validated comparison of classifiers on a labeled dataset
#[derive(Parser, Debug)]
#[command(name = "clfbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Training data file (CSV or Parquet) holding the features and the label
    pub train_data: PathBuf,

    /// Report output path (CSV, Parquet or JSON, determined by extension)
    pub report: PathBuf,

    /// Number of cross-validation folds (integer, at least 2)
    #[arg(long, default_value = "5", allow_hyphen_values = true)]
    pub n_cv_folds: String,

    /// Seed for fold assignment and every seeded model (integer)
    #[arg(long, default_value = "1", allow_hyphen_values = true)]
    pub chosen_seed: String,

    /// Print progress and the report table
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Label column name (binary 0/1)
    #[arg(short, long, default_value = DEFAULT_TARGET)]
    pub target: String,

    /// Worker threads for cross-validation. Default: all cores
    #[arg(long)]
    pub n_jobs: Option<usize>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for a full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl Cli {
    /// Parse the seed text. Negative seeds are reinterpreted as their
    /// two's-complement bit pattern.
    pub fn seed(&self) -> Result<u64, ConfigError> {
        let text = self.chosen_seed.trim();
        text.parse::<i64>()
            .map(|s| s as u64)
            .or_else(|_| text.parse::<u64>())
            .map_err(|source| ConfigError::InvalidSeed {
                value: self.chosen_seed.clone(),
                source,
            })
    }

    /// Parse the fold count text; values below 2 are rejected here, values
    /// above the row count once the data is loaded
    pub fn n_folds(&self) -> Result<usize, ConfigError> {
        let folds = self
            .n_cv_folds
            .trim()
            .parse::<usize>()
            .map_err(|source| ConfigError::InvalidFoldCount {
                value: self.n_cv_folds.clone(),
                source,
            })?;
        if folds < 2 {
            return Err(ConfigError::TooFewFolds(folds));
        }
        Ok(folds)
    }

    /// Resolve into the run configuration. The seed is checked first.
    pub fn into_config(self) -> Result<EvalConfig, ConfigError> {
        let seed = self.seed()?;
        let n_folds = self.n_folds()?;
        Ok(EvalConfig {
            train_data: self.train_data,
            report: self.report,
            n_folds,
            seed,
            target: self.target,
            verbose: self.verbose,
            n_jobs: self.n_jobs,
            infer_schema_length: self.infer_schema_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_seed_is_accepted() {
        let cli = Cli::parse_from(["clfbench", "a.csv", "b.csv", "--chosen-seed", "-1"]);
        assert_eq!(cli.seed().unwrap(), u64::MAX);
    }

    #[test]
    fn test_large_unsigned_seed() {
        let cli = Cli::parse_from(["clfbench", "a.csv", "b.csv", "--chosen-seed", "18446744073709551615"]);
        assert_eq!(cli.seed().unwrap(), u64::MAX);
    }
}
