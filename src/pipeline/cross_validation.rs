//! K-fold cross-validation of every registered model
//!
//! Units of work are `(model, fold)` pairs run on a rayon pool. Results are
//! collected in submission order and regrouped per model, so neither report
//! rows nor fold values depend on which worker finishes first.

use std::time::Instant;

use faer::Mat;
use indicatif::ProgressBar;
use rayon::prelude::*;

use super::estimator::{BoxedClassifier, Estimator};
use super::folds::{FoldSplit, StratifiedKFold};
use super::frame::FeatureFrame;
use super::metrics::Metric;
use super::models::{ModelRegistry, ModelSpec};
use super::preprocess::{compose, ColumnTransformer};
use super::schema::FeatureSchema;
use crate::error::{EvalError, Result};

/// Result column holding fit wall-clock seconds
pub const FIT_TIME: &str = "fit_time";
/// Result column holding scoring wall-clock seconds
pub const SCORE_TIME: &str = "score_time";
/// Prefix of held-out metric columns
pub const TEST_PREFIX: &str = "test_";
/// Prefix of training metric columns
pub const TRAIN_PREFIX: &str = "train_";

/// Cross-validation parameters shared by every model
#[derive(Debug, Clone)]
pub struct CvSettings {
    pub n_folds: usize,
    pub seed: u64,
    pub metrics: Vec<Metric>,
    /// Pool size; `None` uses every core
    pub n_jobs: Option<usize>,
}

impl CvSettings {
    pub fn new(n_folds: usize, seed: u64) -> Self {
        Self {
            n_folds,
            seed,
            metrics: Metric::DEFAULT.to_vec(),
            n_jobs: None,
        }
    }

    pub fn with_n_jobs(mut self, n_jobs: Option<usize>) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    /// Result column names in output order
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![FIT_TIME.to_string(), SCORE_TIME.to_string()];
        for metric in &self.metrics {
            names.push(format!("{}{}", TEST_PREFIX, metric.key()));
            names.push(format!("{}{}", TRAIN_PREFIX, metric.key()));
        }
        names
    }
}

/// Raw per-fold arrays for one model, every column in fold-index order
#[derive(Debug, Clone, PartialEq)]
pub struct CvResult {
    pub model: String,
    pub columns: Vec<(String, Vec<f64>)>,
}

impl CvResult {
    pub fn new(model: impl Into<String>, columns: Vec<(String, Vec<f64>)>) -> Self {
        Self {
            model: model.into(),
            columns,
        }
    }

    pub fn get(&self, key: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Number of folds recorded
    pub fn n_folds(&self) -> usize {
        self.columns.first().map(|(_, v)| v.len()).unwrap_or(0)
    }

    /// Columns except the wall-clock timings
    pub fn metric_columns(&self) -> impl Iterator<Item = &(String, Vec<f64>)> {
        self.columns
            .iter()
            .filter(|(name, _)| name != FIT_TIME && name != SCORE_TIME)
    }
}

/// Preprocessing bound in front of a classifier; fitted as one unit so the
/// transform only ever learns from the fold's training rows
pub struct Pipeline<T, C> {
    pub transform: T,
    pub model: C,
}

impl<T, C> Pipeline<T, C> {
    pub fn new(transform: T, model: C) -> Self {
        Self { transform, model }
    }
}

impl<T, C> Estimator<FeatureFrame> for Pipeline<T, C>
where
    T: Estimator<FeatureFrame, Out = Mat<f64>>,
    C: Estimator<Mat<f64>, Out = Vec<u8>>,
{
    type Out = Vec<u8>;

    fn fit(&mut self, input: &FeatureFrame, labels: &[u8]) -> Result<()> {
        let x = self.transform.fit_apply(input, labels)?;
        self.model.fit(&x, labels)
    }

    fn apply(&self, input: &FeatureFrame) -> Result<Vec<u8>> {
        let x = self.transform.apply(input)?;
        self.model.apply(&x)
    }
}

/// Full model pipeline as evaluated on each fold
pub type ModelPipeline = Pipeline<ColumnTransformer, BoxedClassifier>;

/// Scores of a single fold, metrics in settings order
#[derive(Debug, Clone)]
struct FoldScores {
    fit_time: f64,
    score_time: f64,
    test: Vec<f64>,
    train: Vec<f64>,
}

fn run_fold(
    spec: &ModelSpec,
    schema: &FeatureSchema,
    frame: &FeatureFrame,
    labels: &[u8],
    fold: &FoldSplit,
    metrics: &[Metric],
) -> Result<FoldScores> {
    let train_frame = frame.take(&fold.train);
    let test_frame = frame.take(&fold.test);
    let train_labels: Vec<u8> = fold.train.iter().map(|&i| labels[i]).collect();
    let test_labels: Vec<u8> = fold.test.iter().map(|&i| labels[i]).collect();

    let mut pipeline: ModelPipeline = Pipeline::new(compose(schema), spec.build());

    let start = Instant::now();
    pipeline.fit(&train_frame, &train_labels)?;
    let fit_time = start.elapsed().as_secs_f64();

    let start = Instant::now();
    let test_pred = pipeline.apply(&test_frame)?;
    let score_time = start.elapsed().as_secs_f64();

    let train_pred = pipeline.apply(&train_frame)?;

    Ok(FoldScores {
        fit_time,
        score_time,
        test: metrics.iter().map(|m| m.score(&test_labels, &test_pred)).collect(),
        train: metrics.iter().map(|m| m.score(&train_labels, &train_pred)).collect(),
    })
}

fn assemble(model: &str, folds: &[FoldScores], metrics: &[Metric]) -> CvResult {
    let mut columns = vec![
        (FIT_TIME.to_string(), folds.iter().map(|f| f.fit_time).collect()),
        (SCORE_TIME.to_string(), folds.iter().map(|f| f.score_time).collect()),
    ];
    for (m, metric) in metrics.iter().enumerate() {
        columns.push((
            format!("{}{}", TEST_PREFIX, metric.key()),
            folds.iter().map(|f| f.test[m]).collect(),
        ));
        columns.push((
            format!("{}{}", TRAIN_PREFIX, metric.key()),
            folds.iter().map(|f| f.train[m]).collect(),
        ));
    }
    CvResult::new(model, columns)
}

fn check_inputs(schema: &FeatureSchema, frame: &FeatureFrame, labels: &[u8]) -> Result<()> {
    if frame.height() != labels.len() {
        return Err(EvalError::data(format!(
            "Dataset has {} rows but {} labels",
            frame.height(),
            labels.len()
        )));
    }
    if let Some(bad) = labels.iter().find(|&&l| l > 1) {
        return Err(EvalError::data(format!("Labels must be 0 or 1, found {}", bad)));
    }
    for column in schema.modelled_columns() {
        frame.require(column)?;
    }
    Ok(())
}

/// Cross-validate one model
pub fn evaluate(
    spec: &ModelSpec,
    schema: &FeatureSchema,
    frame: &FeatureFrame,
    labels: &[u8],
    settings: &CvSettings,
) -> Result<CvResult> {
    let registry = ModelRegistry::empty().register(spec.clone());
    let mut results = evaluate_all(&registry, schema, frame, labels, settings, None)?;
    results
        .pop()
        .ok_or_else(|| EvalError::data("Cross-validation produced no result"))
}

/// Cross-validate every model in the registry, in registration order.
///
/// Any failing fit or score aborts the whole evaluation.
pub fn evaluate_all(
    registry: &ModelRegistry,
    schema: &FeatureSchema,
    frame: &FeatureFrame,
    labels: &[u8],
    settings: &CvSettings,
    progress: Option<&ProgressBar>,
) -> Result<Vec<CvResult>> {
    check_inputs(schema, frame, labels)?;

    let folds = StratifiedKFold::new(settings.n_folds)
        .with_seed(settings.seed)
        .split(labels)?;

    let units: Vec<(&ModelSpec, &FoldSplit)> = registry
        .specs()
        .iter()
        .flat_map(|spec| folds.iter().map(move |fold| (spec, fold)))
        .collect();

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = settings.n_jobs {
        builder = builder.num_threads(n);
    }
    let pool = builder
        .build()
        .map_err(|e| EvalError::data(format!("Failed to start worker pool: {}", e)))?;

    let scores: Vec<FoldScores> = pool.install(|| {
        units
            .par_iter()
            .map(|(spec, fold)| {
                let scores = run_fold(spec, schema, frame, labels, fold, &settings.metrics)
                    .map_err(|source| EvalError::ModelFailure {
                        model: spec.name.clone(),
                        fold: fold.fold_idx,
                        source: Box::new(source),
                    });
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                scores
            })
            .collect::<Result<Vec<_>>>()
    })?;

    Ok(registry
        .specs()
        .iter()
        .zip(scores.chunks(folds.len()))
        .map(|(spec, model_scores)| assemble(&spec.name, model_scores, &settings.metrics))
        .collect())
}
