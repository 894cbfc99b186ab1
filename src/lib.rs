//! clfbench: cross-validated classifier comparison
//!
//! Evaluates a fixed set of classifiers, plus a stratified random baseline,
//! on a labeled tabular dataset with seeded stratified k-fold
//! cross-validation, and reports the mean fold scores of every model.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use error::{ConfigError, EvalError, Result, SchemaError};
