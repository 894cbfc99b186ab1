//! Model registry - the ordered list of classifiers to benchmark
//!
//! Order matters: it fixes the row order of the final report, so the
//! registry is a plain `Vec` rather than a map.

pub mod dummy;
pub mod forest;
pub mod knn;
pub mod logistic;
pub mod svc;
pub mod tree;

pub use dummy::StratifiedDummy;
pub use forest::RandomForestClassifier;
pub use knn::KNeighborsClassifier;
pub use logistic::LogisticRegression;
pub use svc::SvcClassifier;
pub use tree::{DecisionTreeClassifier, MaxFeatures};

use crate::pipeline::estimator::BoxedClassifier;

/// Report name of the stratified random baseline
pub const BASELINE_NAME: &str = "Dummy Classifier";

/// Algorithm identity and hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub enum ModelKind {
    /// Random guesser following the training label distribution
    StratifiedDummy,
    DecisionTree { max_depth: Option<usize> },
    KNearestNeighbors { n_neighbors: usize },
    Svc { c: f64, max_iter: usize },
    LogisticRegression { c: f64, max_iter: usize },
    RandomForest {
        n_estimators: usize,
        max_depth: Option<usize>,
    },
}

/// A named, seeded model configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub name: String,
    pub kind: ModelKind,
    pub seed: u64,
    /// Worker hint for models with internal parallelism; `Some(1)` keeps
    /// them sequential, `None` uses the whole pool
    pub n_jobs: Option<usize>,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, kind: ModelKind, seed: u64) -> Self {
        Self {
            name: name.into(),
            kind,
            seed,
            n_jobs: None,
        }
    }

    pub fn with_n_jobs(mut self, n_jobs: Option<usize>) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    pub fn is_baseline(&self) -> bool {
        self.kind == ModelKind::StratifiedDummy
    }

    /// Fresh, unfitted model instance for this configuration
    pub fn build(&self) -> BoxedClassifier {
        let parallel = self.n_jobs != Some(1);
        match &self.kind {
            ModelKind::StratifiedDummy => Box::new(StratifiedDummy::new(self.seed)),
            ModelKind::DecisionTree { max_depth } => {
                Box::new(DecisionTreeClassifier::new(self.seed).with_max_depth(*max_depth))
            }
            ModelKind::KNearestNeighbors { n_neighbors } => {
                Box::new(KNeighborsClassifier::new(*n_neighbors).with_parallel(parallel))
            }
            ModelKind::Svc { c, max_iter } => Box::new(SvcClassifier::new(*c, *max_iter, self.seed)),
            ModelKind::LogisticRegression { c, max_iter } => {
                Box::new(LogisticRegression::new(*c, *max_iter))
            }
            ModelKind::RandomForest {
                n_estimators,
                max_depth,
            } => Box::new(
                RandomForestClassifier::new(*n_estimators, self.seed)
                    .with_max_depth(*max_depth)
                    .with_parallel(parallel),
            ),
        }
    }
}

/// Ordered collection of model specs, baseline first
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    specs: Vec<ModelSpec>,
}

impl ModelRegistry {
    pub fn empty() -> Self {
        Self { specs: Vec::new() }
    }

    /// Registry holding only the stratified baseline
    pub fn with_baseline(seed: u64) -> Self {
        Self::empty().register(ModelSpec::new(BASELINE_NAME, ModelKind::StratifiedDummy, seed))
    }

    /// Baseline followed by the five candidate classifiers
    pub fn standard(seed: u64) -> Self {
        Self::with_baseline(seed)
            .register(ModelSpec::new(
                "Decision Tree",
                ModelKind::DecisionTree { max_depth: None },
                seed,
            ))
            .register(ModelSpec::new(
                "k_Nearest_Neighbor",
                ModelKind::KNearestNeighbors { n_neighbors: 3 },
                seed,
            ))
            .register(ModelSpec::new(
                "SVC (RBF kernel)",
                ModelKind::Svc {
                    c: 1.0,
                    max_iter: 200,
                },
                seed,
            ))
            .register(ModelSpec::new(
                "Logistic Regression",
                ModelKind::LogisticRegression {
                    c: 1.0,
                    max_iter: 1000,
                },
                seed,
            ))
            .register(ModelSpec::new(
                "Random Forest",
                ModelKind::RandomForest {
                    n_estimators: 100,
                    max_depth: None,
                },
                seed,
            ))
    }

    /// Append a model after every model registered so far
    pub fn register(mut self, spec: ModelSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Apply one worker hint to every registered model
    pub fn with_n_jobs(mut self, n_jobs: Option<usize>) -> Self {
        for spec in &mut self.specs {
            spec.n_jobs = n_jobs;
        }
        self
    }

    pub fn specs(&self) -> &[ModelSpec] {
        &self.specs
    }

    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn spec(&self, name: &str) -> Option<&ModelSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Fresh, unfitted instance of the named model
    pub fn get(&self, name: &str) -> Option<BoxedClassifier> {
        self.spec(name).map(ModelSpec::build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::estimator::Estimator;
    use faer::Mat;

    #[test]
    fn test_standard_registry_order() {
        let registry = ModelRegistry::standard(1);
        assert_eq!(
            registry.names(),
            vec![
                "Dummy Classifier",
                "Decision Tree",
                "k_Nearest_Neighbor",
                "SVC (RBF kernel)",
                "Logistic Regression",
                "Random Forest",
            ]
        );
        assert!(registry.specs()[0].is_baseline());
        assert!(registry.specs().iter().all(|s| s.seed == 1));
    }

    #[test]
    fn test_get_returns_fresh_unfitted_model() {
        let registry = ModelRegistry::standard(1);
        let x = Mat::from_fn(4, 1, |i, _| i as f64);

        let mut first = registry.get("Decision Tree").unwrap();
        first.fit(&x, &[0, 0, 1, 1]).unwrap();

        let second = registry.get("Decision Tree").unwrap();
        assert!(second.apply(&x).is_err(), "new instance must not share fitted state");
    }

    #[test]
    fn test_get_unknown_model() {
        assert!(ModelRegistry::standard(1).get("Naive Bayes").is_none());
    }
}
