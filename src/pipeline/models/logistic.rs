//! L2-regularized logistic regression

use faer::Mat;

use crate::error::{EvalError, Result};
use crate::pipeline::estimator::{check_training_set, Estimator};

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Binary logistic regression fitted by full-batch gradient descent.
///
/// Minimizes the mean log-loss plus `||w||^2 / (2 * C * n)`, the per-sample
/// form of an inverse regularization strength `C`. The intercept is not
/// penalized.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    pub c: f64,
    pub max_iter: usize,
    pub learning_rate: f64,
    pub tol: f64,
    coefficients: Option<Vec<f64>>,
    intercept: f64,
}

impl LogisticRegression {
    pub fn new(c: f64, max_iter: usize) -> Self {
        Self {
            c,
            max_iter,
            learning_rate: 0.5,
            tol: 1e-6,
            coefficients: None,
            intercept: 0.0,
        }
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    fn linear(x: &Mat<f64>, w: &[f64], b: f64, i: usize) -> f64 {
        w.iter().enumerate().map(|(j, wj)| wj * x[(i, j)]).sum::<f64>() + b
    }

    /// Probability of class 1 for every row
    pub fn predict_proba(&self, x: &Mat<f64>) -> Result<Vec<f64>> {
        let w = self.coefficients.as_ref().ok_or_else(|| EvalError::NotFitted {
            model: "logistic regression".to_string(),
        })?;
        if x.ncols() != w.len() {
            return Err(EvalError::data(format!(
                "Logistic regression fitted on {} features, got {}",
                w.len(),
                x.ncols()
            )));
        }
        Ok((0..x.nrows())
            .map(|i| sigmoid(Self::linear(x, w, self.intercept, i)))
            .collect())
    }
}

impl Estimator<Mat<f64>> for LogisticRegression {
    type Out = Vec<u8>;

    fn fit(&mut self, input: &Mat<f64>, labels: &[u8]) -> Result<()> {
        check_training_set(input, labels)?;
        if self.c <= 0.0 {
            return Err(EvalError::data("Inverse regularization C must be positive"));
        }

        let n = input.nrows();
        let d = input.ncols();
        let n_f = n as f64;
        let alpha = 1.0 / (self.c * n_f);

        let mut w = vec![0.0; d];
        let mut b = 0.0;
        let mut grad_w = vec![0.0; d];

        for _ in 0..self.max_iter {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;

            for i in 0..n {
                let err = sigmoid(Self::linear(input, &w, b, i)) - f64::from(labels[i]);
                for (j, g) in grad_w.iter_mut().enumerate() {
                    *g += err * input[(i, j)];
                }
                grad_b += err;
            }

            for (g, wj) in grad_w.iter_mut().zip(&w) {
                *g = *g / n_f + alpha * wj;
            }
            grad_b /= n_f;

            let norm = (grad_w.iter().map(|g| g * g).sum::<f64>() + grad_b * grad_b).sqrt();
            if norm < self.tol {
                break;
            }

            for (wj, g) in w.iter_mut().zip(&grad_w) {
                *wj -= self.learning_rate * g;
            }
            b -= self.learning_rate * grad_b;
        }

        self.coefficients = Some(w);
        self.intercept = b;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learns_linear_boundary() {
        let x = Mat::from_fn(20, 1, |i, _| i as f64 / 10.0 - 1.0);
        let y: Vec<u8> = (0..20).map(|i| u8::from(i >= 10)).collect();

        let mut model = LogisticRegression::new(1.0, 1000);
        model.fit(&x, &y).unwrap();

        assert!(model.coefficients().unwrap()[0] > 0.0);
        let predictions = model.apply(&x).unwrap();
        let correct = predictions.iter().zip(&y).filter(|(p, t)| p == t).count();
        assert!(correct >= 18);
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let x = Mat::from_fn(4, 2, |i, j| (i + j) as f64);
        let mut model = LogisticRegression::new(1.0, 50);
        model.fit(&x, &[0, 0, 1, 1]).unwrap();
        assert!(model
            .predict_proba(&x)
            .unwrap()
            .iter()
            .all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_rejects_non_positive_c() {
        let x = Mat::from_fn(2, 1, |i, _| i as f64);
        let mut model = LogisticRegression::new(0.0, 10);
        assert!(model.fit(&x, &[0, 1]).is_err());
    }
}
