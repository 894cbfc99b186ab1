//! Stratified random baseline

use faer::Mat;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{EvalError, Result};
use crate::pipeline::estimator::{check_training_set, Estimator};

/// Predicts labels drawn at random from the training label distribution.
///
/// Features are ignored. Every call to `apply` restarts the generator from
/// the same seed, so predictions depend only on the seed, the fitted class
/// priors and the number of rows.
#[derive(Debug, Clone)]
pub struct StratifiedDummy {
    seed: u64,
    /// `(label, probability)` for every label seen at fit time, ascending
    priors: Option<Vec<(u8, f64)>>,
}

impl StratifiedDummy {
    pub fn new(seed: u64) -> Self {
        Self { seed, priors: None }
    }

    pub fn priors(&self) -> Option<&[(u8, f64)]> {
        self.priors.as_deref()
    }
}

impl Estimator<Mat<f64>> for StratifiedDummy {
    type Out = Vec<u8>;

    fn fit(&mut self, input: &Mat<f64>, labels: &[u8]) -> Result<()> {
        check_training_set(input, labels)?;

        let n = labels.len() as f64;
        let positives = labels.iter().filter(|&&l| l == 1).count() as f64;
        let priors: Vec<(u8, f64)> = [(0u8, (n - positives) / n), (1u8, positives / n)]
            .into_iter()
            .filter(|(_, p)| *p > 0.0)
            .collect();

        self.priors = Some(priors);
        Ok(())
    }

    fn apply(&self, input: &Mat<f64>) -> Result<Vec<u8>> {
        let priors = self.priors.as_ref().ok_or_else(|| EvalError::NotFitted {
            model: "stratified dummy".to_string(),
        })?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let predictions = (0..input.nrows())
            .map(|_| {
                let draw: f64 = rng.gen();
                let mut cumulative = 0.0;
                for &(label, p) in priors {
                    cumulative += p;
                    if draw < cumulative {
                        return label;
                    }
                }
                // rounding left the draw just above the last bucket
                priors.last().map(|&(label, _)| label).unwrap_or(0)
            })
            .collect();

        Ok(predictions)
    }
}
