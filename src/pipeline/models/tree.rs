//! CART decision tree classifier (Gini impurity)

use faer::Mat;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{EvalError, Result};
use crate::pipeline::estimator::{check_training_set, Estimator};

/// Number of features examined at each split
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    All,
    Sqrt,
}

impl MaxFeatures {
    fn resolve(&self, n_features: usize) -> usize {
        match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => ((n_features as f64).sqrt() as usize).max(1),
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        /// Fraction of class 1 among the node's training rows
        proba: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Decision tree grown until leaves are pure or cannot be split further.
///
/// Candidate features are visited in a seeded random order and the first
/// best split wins, so ties between equally good features are broken by the
/// seed.
#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    seed: u64,
    root: Option<Node>,
    n_features: usize,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(positives: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let p = positives / total;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

impl DecisionTreeClassifier {
    pub fn new(seed: u64) -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            seed,
            root: None,
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Depth of the fitted tree (a single leaf has depth 0)
    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        self.root.as_ref().map(walk).unwrap_or(0)
    }

    /// Grow the tree on a subset of rows (duplicates allowed, as produced by
    /// bootstrap sampling)
    pub(crate) fn fit_rows(&mut self, x: &Mat<f64>, labels: &[u8], rows: &[usize]) -> Result<()> {
        if rows.is_empty() {
            return Err(EvalError::data("Cannot grow a tree on zero rows"));
        }
        self.n_features = x.ncols();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut rows = rows.to_vec();
        self.root = Some(self.grow(x, labels, &mut rows, 0, &mut rng));
        Ok(())
    }

    fn grow(
        &self,
        x: &Mat<f64>,
        labels: &[u8],
        rows: &mut [usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let total = rows.len() as f64;
        let positives = rows.iter().filter(|&&r| labels[r] == 1).count() as f64;
        let proba = positives / total;

        let should_stop = rows.len() < self.min_samples_split
            || rows.len() < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || positives == 0.0
            || positives == total;
        if should_stop {
            return Node::Leaf { proba };
        }

        let split = match self.best_split(x, labels, rows, rng) {
            Some(split) => split,
            None => return Node::Leaf { proba },
        };

        // Partition rows in place: left side first
        let mut boundary = 0;
        for i in 0..rows.len() {
            if x[(rows[i], split.feature)] <= split.threshold {
                rows.swap(i, boundary);
                boundary += 1;
            }
        }
        let (left_rows, right_rows) = rows.split_at_mut(boundary);

        let left = self.grow(x, labels, left_rows, depth + 1, rng);
        let right = self.grow(x, labels, right_rows, depth + 1, rng);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn best_split(
        &self,
        x: &Mat<f64>,
        labels: &[u8],
        rows: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..x.ncols()).collect();
        features.shuffle(rng);
        let k = self.max_features.resolve(features.len());

        let total = rows.len() as f64;
        let total_pos = rows.iter().filter(|&&r| labels[r] == 1).count() as f64;

        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0;
        let mut values: Vec<(f64, u8)> = Vec::with_capacity(rows.len());

        for &feature in &features {
            // Like CART implementations, keep looking past the budget until at
            // least one usable split has been seen
            if visited >= k && best.is_some() {
                break;
            }
            visited += 1;

            values.clear();
            values.extend(rows.iter().map(|&r| (x[(r, feature)], labels[r])));
            values.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_n = 0.0;
            let mut left_pos = 0.0;
            for i in 0..values.len() - 1 {
                left_n += 1.0;
                if values[i].1 == 1 {
                    left_pos += 1.0;
                }
                if values[i].0 == values[i + 1].0 {
                    continue;
                }
                let right_n = total - left_n;
                if (left_n as usize) < self.min_samples_leaf || (right_n as usize) < self.min_samples_leaf {
                    continue;
                }

                let impurity = (left_n * gini(left_pos, left_n)
                    + right_n * gini(total_pos - left_pos, right_n))
                    / total;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    let threshold = values[i].0 + (values[i + 1].0 - values[i].0) / 2.0;
                    // guard against midpoints that round onto the upper value
                    let threshold = if threshold >= values[i + 1].0 {
                        values[i].0
                    } else {
                        threshold
                    };
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }

        best
    }

    /// Probability of class 1 for every row
    pub fn predict_proba(&self, x: &Mat<f64>) -> Result<Vec<f64>> {
        let root = self.root.as_ref().ok_or_else(|| EvalError::NotFitted {
            model: "decision tree".to_string(),
        })?;
        if x.ncols() != self.n_features {
            return Err(EvalError::data(format!(
                "Decision tree fitted on {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }

        Ok((0..x.nrows())
            .map(|i| {
                let mut node = root;
                loop {
                    match node {
                        Node::Leaf { proba } => return *proba,
                        Node::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            node = if x[(i, *feature)] <= *threshold {
                                &**left
                            } else {
                                &**right
                            };
                        }
                    }
                }
            })
            .collect())
    }
}

impl Estimator<Mat<f64>> for DecisionTreeClassifier {
    type Out = Vec<u8>;

    fn fit(&mut self, input: &Mat<f64>, labels: &[u8]) -> Result<()> {
        check_training_set(input, labels)?;
        let rows: Vec<usize> = (0..labels.len()).collect();
        self.fit_rows(input, labels, &rows)
    }

    fn apply(&self, input: &Mat<f64>) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(input)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }
}
