//! Random forest classifier

use faer::Mat;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::tree::{DecisionTreeClassifier, MaxFeatures};
use crate::error::{EvalError, Result};
use crate::pipeline::estimator::{check_training_set, Estimator};

/// Bagged ensemble of decision trees with per-split feature sampling.
///
/// Per-tree seeds are drawn sequentially from the forest seed before any
/// tree is grown, so the fitted forest does not depend on how the trees are
/// scheduled across threads.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    seed: u64,
    parallel: bool,
    trees: Vec<DecisionTreeClassifier>,
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            n_estimators,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed,
            parallel: true,
            trees: Vec::new(),
        }
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Grow trees on the rayon pool (default) or sequentially
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn grow_tree(&self, x: &Mat<f64>, labels: &[u8], tree_seed: u64) -> Result<DecisionTreeClassifier> {
        let n = labels.len();
        let rows: Vec<usize> = if self.bootstrap {
            let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);
            (0..n).map(|_| rng.gen_range(0..n)).collect()
        } else {
            (0..n).collect()
        };

        let mut tree = DecisionTreeClassifier::new(tree_seed)
            .with_max_depth(self.max_depth)
            .with_max_features(self.max_features);
        tree.fit_rows(x, labels, &rows)?;
        Ok(tree)
    }

    /// Mean class-1 probability across trees
    pub fn predict_proba(&self, x: &Mat<f64>) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(EvalError::NotFitted {
                model: "random forest".to_string(),
            });
        }

        let mut sums = vec![0.0; x.nrows()];
        for tree in &self.trees {
            for (sum, p) in sums.iter_mut().zip(tree.predict_proba(x)?) {
                *sum += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        Ok(sums.into_iter().map(|s| s / n_trees).collect())
    }
}

impl Estimator<Mat<f64>> for RandomForestClassifier {
    type Out = Vec<u8>;

    fn fit(&mut self, input: &Mat<f64>, labels: &[u8]) -> Result<()> {
        check_training_set(input, labels)?;
        if self.n_estimators == 0 {
            return Err(EvalError::data("Random forest needs at least one tree"));
        }

        let mut master = ChaCha8Rng::seed_from_u64(self.seed);
        let tree_seeds: Vec<u64> = (0..self.n_estimators).map(|_| master.next_u64()).collect();

        let trees = if self.parallel {
            tree_seeds
                .par_iter()
                .map(|&seed| self.grow_tree(input, labels, seed))
                .collect::<Result<Vec<_>>>()?
        } else {
            tree_seeds
                .iter()
                .map(|&seed| self.grow_tree(input, labels, seed))
                .collect::<Result<Vec<_>>>()?
        };

        self.trees = trees;
        Ok(())
    }

    fn apply(&self, input: &Mat<f64>) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(input)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }
}
