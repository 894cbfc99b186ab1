//! Per-feature-type preprocessing: imputation, scaling and one-hot encoding

pub mod compose;
pub mod encode;
pub mod impute;

pub use compose::{compose, ColumnChain, ColumnTransformer, Encoder};
pub use encode::{Block, OneHotEncoder, Passthrough, StandardScaler};
pub use impute::{ImputeStrategy, SimpleImputer, MISSING_CATEGORY};
