//! Uniform fit/apply interface shared by preprocessing steps and models

use faer::Mat;

use crate::error::Result;

/// A stage that learns parameters from training rows and then maps any rows.
///
/// Preprocessing steps ignore `labels`; classifiers use them. `apply` never
/// mutates the fitted state, so a fitted estimator can score the held-out
/// rows and re-score the training rows in any order.
pub trait Estimator<In: ?Sized> {
    type Out;

    fn fit(&mut self, input: &In, labels: &[u8]) -> Result<()>;

    fn apply(&self, input: &In) -> Result<Self::Out>;

    /// Convenience for `fit` followed by `apply` on the same rows
    fn fit_apply(&mut self, input: &In, labels: &[u8]) -> Result<Self::Out> {
        self.fit(input, labels)?;
        self.apply(input)
    }
}

/// A binary classifier over a dense feature matrix, predicting 0/1 labels
pub trait Classifier: Estimator<Mat<f64>, Out = Vec<u8>> + Send {}

impl<T> Classifier for T where T: Estimator<Mat<f64>, Out = Vec<u8>> + Send {}

/// Boxed classifier as handed out by the model registry
pub type BoxedClassifier = Box<dyn Classifier>;

impl<C: Classifier + ?Sized> Estimator<Mat<f64>> for Box<C> {
    type Out = Vec<u8>;

    fn fit(&mut self, input: &Mat<f64>, labels: &[u8]) -> Result<()> {
        (**self).fit(input, labels)
    }

    fn apply(&self, input: &Mat<f64>) -> Result<Vec<u8>> {
        (**self).apply(input)
    }
}

/// Copy of row `i` of a feature matrix
pub(crate) fn row(x: &Mat<f64>, i: usize) -> Vec<f64> {
    (0..x.ncols()).map(|j| x[(i, j)]).collect()
}

/// Check that a design matrix and its labels agree and are non-empty
pub(crate) fn check_training_set(x: &Mat<f64>, labels: &[u8]) -> Result<()> {
    if x.nrows() != labels.len() {
        return Err(crate::error::EvalError::data(format!(
            "Feature matrix has {} rows but {} labels were given",
            x.nrows(),
            labels.len()
        )));
    }
    if labels.is_empty() {
        return Err(crate::error::EvalError::data("Cannot fit on an empty training set"));
    }
    Ok(())
}
