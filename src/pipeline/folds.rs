//! Seeded stratified k-fold splitting

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{ConfigError, Result};

/// Row indices of one train/held-out partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSplit {
    pub fold_idx: usize,
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified k-fold splitter.
///
/// Each class's rows are shuffled with a generator seeded once per split,
/// classes being visited in ascending label order, and dealt round-robin
/// across folds. The deal continues where the previous class stopped, so fold
/// sizes differ by at most one row.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    n_splits: usize,
    seed: u64,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Fold index assigned to every row
    pub fn assign(&self, labels: &[u8]) -> Result<Vec<usize>> {
        if self.n_splits < 2 {
            return Err(ConfigError::TooFewFolds(self.n_splits).into());
        }
        if self.n_splits > labels.len() {
            return Err(ConfigError::TooManyFolds {
                folds: self.n_splits,
                rows: labels.len(),
            }
            .into());
        }

        let mut classes: Vec<u8> = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut assignment = vec![0; labels.len()];
        let mut offset = 0;

        for class in classes {
            let mut rows: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, &l)| l == class)
                .map(|(i, _)| i)
                .collect();
            rows.shuffle(&mut rng);
            for row in rows {
                assignment[row] = offset % self.n_splits;
                offset += 1;
            }
        }

        Ok(assignment)
    }

    /// All folds in fold-index order; row indices ascend within each side
    pub fn split(&self, labels: &[u8]) -> Result<Vec<FoldSplit>> {
        let assignment = self.assign(labels)?;

        Ok((0..self.n_splits)
            .map(|fold_idx| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..labels.len()).partition(|&row| assignment[row] == fold_idx);
                FoldSplit {
                    fold_idx,
                    train,
                    test,
                }
            })
            .collect())
    }
}

/// The rarest class and its row count, when it has fewer rows than there
/// are folds. Some held-out folds then contain none of that class.
pub fn sparse_class(labels: &[u8], n_splits: usize) -> Option<(u8, usize)> {
    let positives = labels.iter().filter(|&&l| l == 1).count();
    let rarest = if positives <= labels.len() - positives {
        (1, positives)
    } else {
        (0, labels.len() - positives)
    };
    (rarest.1 < n_splits).then_some(rarest)
}
