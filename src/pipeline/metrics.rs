//! Classification metrics for the positive class

use std::fmt;

/// Scoring metric. Precision, recall and F1 treat label 1 as positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    F1,
    Precision,
    Recall,
    Accuracy,
}

impl Metric {
    /// Metrics reported for every model, in column order
    pub const DEFAULT: [Metric; 4] = [Metric::F1, Metric::Precision, Metric::Recall, Metric::Accuracy];

    /// Suffix used in result column names (`test_<key>`, `train_<key>`)
    pub fn key(&self) -> &'static str {
        match self {
            Metric::F1 => "f1",
            Metric::Precision => "precision",
            Metric::Recall => "recall",
            Metric::Accuracy => "accuracy",
        }
    }

    /// Score predictions against the true labels. An undefined ratio
    /// (zero denominator) scores 0.
    pub fn score(&self, y_true: &[u8], y_pred: &[u8]) -> f64 {
        let counts = Confusion::count(y_true, y_pred);
        match self {
            Metric::F1 => ratio(2 * counts.tp, 2 * counts.tp + counts.fp + counts.fn_),
            Metric::Precision => ratio(counts.tp, counts.tp + counts.fp),
            Metric::Recall => ratio(counts.tp, counts.tp + counts.fn_),
            Metric::Accuracy => ratio(counts.tp + counts.tn, counts.total()),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Confusion {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

impl Confusion {
    fn count(y_true: &[u8], y_pred: &[u8]) -> Self {
        y_true
            .iter()
            .zip(y_pred)
            .fold(Confusion::default(), |mut c, (&t, &p)| {
                match (t == 1, p == 1) {
                    (true, true) => c.tp += 1,
                    (false, true) => c.fp += 1,
                    (false, false) => c.tn += 1,
                    (true, false) => c.fn_ += 1,
                }
                c
            })
    }

    fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
