//! Pipeline module - schema, preprocessing, models and cross-validation

pub mod config;
pub mod cross_validation;
pub mod estimator;
pub mod folds;
pub mod frame;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod preprocess;
pub mod schema;
pub mod target;

pub use config::{EvalConfig, DEFAULT_INFER_SCHEMA_LENGTH};
pub use cross_validation::{evaluate, evaluate_all, CvResult, CvSettings, ModelPipeline, Pipeline};
pub use estimator::{BoxedClassifier, Classifier, Estimator};
pub use folds::{sparse_class, FoldSplit, StratifiedKFold};
pub use frame::{Column, FeatureFrame};
pub use loader::{column_names, dataframe_to_frame, load_dataset, split_label};
pub use metrics::Metric;
pub use models::{ModelKind, ModelRegistry, ModelSpec};
pub use preprocess::{compose, ColumnTransformer};
pub use schema::{FeatureGroup, FeatureSchema};
pub use target::{extract_labels, positive_rate};
