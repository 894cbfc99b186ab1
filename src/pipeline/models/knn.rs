//! K-nearest neighbors classifier

use faer::Mat;
use rayon::prelude::*;

use crate::error::{EvalError, Result};
use crate::pipeline::estimator::{check_training_set, row, Estimator};

/// Majority vote among the `k` nearest training rows (Euclidean distance).
///
/// Distance ties are broken by training row order; a tied vote predicts 0.
#[derive(Debug, Clone)]
pub struct KNeighborsClassifier {
    pub n_neighbors: usize,
    parallel: bool,
    x_train: Vec<Vec<f64>>,
    y_train: Vec<u8>,
}

impl KNeighborsClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            parallel: true,
            x_train: Vec::new(),
            y_train: Vec::new(),
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn classify(&self, query: &[f64]) -> u8 {
        let mut distances: Vec<(f64, usize)> = self
            .x_train
            .iter()
            .enumerate()
            .map(|(idx, train)| (squared_euclidean(query, train), idx))
            .collect();

        let k = self.n_neighbors.min(distances.len());
        let by_distance =
            |a: &(f64, usize), b: &(f64, usize)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1));
        if k < distances.len() {
            distances.select_nth_unstable_by(k - 1, by_distance);
        }

        let positives = distances[..k]
            .iter()
            .filter(|(_, idx)| self.y_train[*idx] == 1)
            .count();
        u8::from(2 * positives > k)
    }
}

fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl Estimator<Mat<f64>> for KNeighborsClassifier {
    type Out = Vec<u8>;

    fn fit(&mut self, input: &Mat<f64>, labels: &[u8]) -> Result<()> {
        check_training_set(input, labels)?;
        if self.n_neighbors == 0 {
            return Err(EvalError::data("n_neighbors must be at least 1"));
        }

        self.x_train = (0..input.nrows()).map(|i| row(input, i)).collect();
        self.y_train = labels.to_vec();
        Ok(())
    }

    fn apply(&self, input: &Mat<f64>) -> Result<Vec<u8>> {
        if self.x_train.is_empty() {
            return Err(EvalError::NotFitted {
                model: "k-nearest neighbors".to_string(),
            });
        }
        if input.ncols() != self.x_train[0].len() {
            return Err(EvalError::data(format!(
                "k-nearest neighbors fitted on {} features, got {}",
                self.x_train[0].len(),
                input.ncols()
            )));
        }

        let predictions = if self.parallel {
            (0..input.nrows())
                .into_par_iter()
                .map(|i| self.classify(&row(input, i)))
                .collect()
        } else {
            (0..input.nrows())
                .map(|i| self.classify(&row(input, i)))
                .collect()
        };
        Ok(predictions)
    }
}
