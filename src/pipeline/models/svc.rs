//! Support vector classifier with an RBF kernel, trained by SMO

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use faer::Mat;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::{EvalError, Result};
use crate::pipeline::estimator::{check_training_set, row, Estimator};

/// Tolerance on the KKT conditions
const TOL: f64 = 1e-3;
/// Multipliers below this are not support vectors
const ALPHA_EPS: f64 = 1e-8;
/// Relative change below which a step is rejected
const STEP_EPS: f64 = 1e-5;
/// Memory budget for cached kernel rows
const CACHE_BYTES: usize = 256 << 20;

fn rbf(a: &[f64], b: &[f64], gamma: f64) -> f64 {
    let sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    (-gamma * sq).exp()
}

#[derive(Debug, Clone)]
enum Fitted {
    /// Training labels had a single class
    Constant(u8),
    Kernel {
        gamma: f64,
        bias: f64,
        /// `(alpha * y, support vector)`
        support: Vec<(f64, Vec<f64>)>,
    },
}

/// Binary C-SVC with `gamma = 1 / (n_features * var(X))`.
///
/// The second multiplier of each SMO step is the free multiplier with the
/// largest error gap, falling back to a seeded random pick, so training is
/// reproducible for a fixed seed.
#[derive(Debug, Clone)]
pub struct SvcClassifier {
    pub c: f64,
    pub max_iter: usize,
    seed: u64,
    fitted: Option<Fitted>,
}

impl SvcClassifier {
    pub fn new(c: f64, max_iter: usize, seed: u64) -> Self {
        Self {
            c,
            max_iter,
            seed,
            fitted: None,
        }
    }

    pub fn n_support_vectors(&self) -> usize {
        match &self.fitted {
            Some(Fitted::Kernel { support, .. }) => support.len(),
            _ => 0,
        }
    }

    /// Signed distance to the separating surface; positive means class 1
    pub fn decision_function(&self, x: &Mat<f64>) -> Result<Vec<f64>> {
        match &self.fitted {
            None => Err(EvalError::NotFitted {
                model: "SVC".to_string(),
            }),
            Some(Fitted::Constant(label)) => {
                let value = if *label == 1 { 1.0 } else { -1.0 };
                Ok(vec![value; x.nrows()])
            }
            Some(Fitted::Kernel {
                gamma,
                bias,
                support,
            }) => Ok((0..x.nrows())
                .map(|i| {
                    let query = row(x, i);
                    support
                        .iter()
                        .map(|(coef, sv)| coef * rbf(sv, &query, *gamma))
                        .sum::<f64>()
                        + bias
                })
                .collect()),
        }
    }
}

/// `1 / (n_features * var(X))`, or 1 for constant input
fn scale_gamma(rows: &[Vec<f64>]) -> f64 {
    let n_features = rows.first().map(|r| r.len()).unwrap_or(0);
    let count = (rows.len() * n_features) as f64;
    if count == 0.0 {
        return 1.0;
    }
    let mean = rows.iter().flatten().sum::<f64>() / count;
    let var = rows.iter().flatten().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    if var > 0.0 {
        1.0 / (n_features as f64 * var)
    } else {
        1.0
    }
}

/// Least recently used kernel rows, computed on demand
struct KernelCache<'a> {
    xs: &'a [Vec<f64>],
    gamma: f64,
    capacity: usize,
    rows: HashMap<usize, Arc<[f64]>>,
    order: VecDeque<usize>,
}

impl<'a> KernelCache<'a> {
    fn new(xs: &'a [Vec<f64>], gamma: f64, capacity: usize) -> Self {
        Self {
            xs,
            gamma,
            capacity: capacity.max(2),
            rows: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn row(&mut self, i: usize) -> Arc<[f64]> {
        if let Some(cached) = self.rows.get(&i) {
            let cached = Arc::clone(cached);
            if let Some(pos) = self.order.iter().position(|&k| k == i) {
                self.order.remove(pos);
            }
            self.order.push_back(i);
            return cached;
        }

        let query = &self.xs[i];
        let gamma = self.gamma;
        let computed: Arc<[f64]> = self
            .xs
            .par_iter()
            .map(|other| rbf(query, other, gamma))
            .collect::<Vec<f64>>()
            .into();

        if self.rows.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.rows.remove(&evicted);
            }
        }
        self.rows.insert(i, Arc::clone(&computed));
        self.order.push_back(i);
        computed
    }
}

/// SMO state. `errors[k]` is kept equal to `f(x_k) - y_k` after every step.
struct Smo<'a> {
    y: &'a [f64],
    c: f64,
    alphas: Vec<f64>,
    bias: f64,
    errors: Vec<f64>,
    cache: KernelCache<'a>,
    rng: ChaCha8Rng,
}

impl<'a> Smo<'a> {
    fn new(xs: &'a [Vec<f64>], y: &'a [f64], c: f64, gamma: f64, seed: u64) -> Self {
        let n = y.len();
        let capacity = CACHE_BYTES / (n.max(1) * std::mem::size_of::<f64>());
        Self {
            y,
            c,
            alphas: vec![0.0; n],
            bias: 0.0,
            // f is zero everywhere before the first step
            errors: y.iter().map(|v| -v).collect(),
            cache: KernelCache::new(xs, gamma, capacity),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn is_free(&self, k: usize) -> bool {
        self.alphas[k] > ALPHA_EPS && self.alphas[k] < self.c - ALPHA_EPS
    }

    /// Alternate full sweeps with sweeps over free multipliers until a full
    /// sweep changes nothing or `max_iter` sweeps have run
    fn run(&mut self, max_iter: usize) {
        let n = self.y.len();
        let mut examine_all = true;
        let mut sweeps = 0;
        while sweeps < max_iter {
            let mut changed = 0;
            for i in 0..n {
                if (examine_all || self.is_free(i)) && self.examine(i) {
                    changed += 1;
                }
            }
            sweeps += 1;

            if examine_all {
                if changed == 0 {
                    break;
                }
                examine_all = false;
            } else if changed == 0 {
                examine_all = true;
            }
        }
    }

    fn examine(&mut self, i: usize) -> bool {
        let r = self.y[i] * self.errors[i];
        let violates = (r < -TOL && self.alphas[i] < self.c) || (r > TOL && self.alphas[i] > 0.0);
        if !violates {
            return false;
        }

        if let Some(j) = self.second_choice(i) {
            if self.take_step(i, j) {
                return true;
            }
        }

        let n = self.y.len();
        let j = loop {
            let j = self.rng.gen_range(0..n);
            if j != i {
                break j;
            }
        };
        self.take_step(i, j)
    }

    /// Free multiplier maximizing `|E_i - E_j|`
    fn second_choice(&self, i: usize) -> Option<usize> {
        let e_i = self.errors[i];
        (0..self.y.len())
            .filter(|&k| k != i && self.is_free(k))
            .max_by(|&a, &b| {
                (e_i - self.errors[a])
                    .abs()
                    .total_cmp(&(e_i - self.errors[b]).abs())
                    .then(b.cmp(&a))
            })
    }

    fn take_step(&mut self, i: usize, j: usize) -> bool {
        let (y_i, y_j) = (self.y[i], self.y[j]);
        let (a_i_old, a_j_old) = (self.alphas[i], self.alphas[j]);
        let (e_i, e_j) = (self.errors[i], self.errors[j]);

        let (low, high) = if y_i != y_j {
            ((a_j_old - a_i_old).max(0.0), (self.c + a_j_old - a_i_old).min(self.c))
        } else {
            ((a_i_old + a_j_old - self.c).max(0.0), (a_i_old + a_j_old).min(self.c))
        };
        if (high - low).abs() < 1e-10 {
            return false;
        }

        let row_i = self.cache.row(i);
        let k_ij = row_i[j];
        // RBF has K(x, x) = 1
        let eta = 2.0 * k_ij - 2.0;
        if eta >= 0.0 {
            return false;
        }

        let a_j = (a_j_old - y_j * (e_i - e_j) / eta).clamp(low, high);
        if (a_j - a_j_old).abs() < STEP_EPS * (a_j + a_j_old + STEP_EPS) {
            return false;
        }
        let a_i = a_i_old + y_i * y_j * (a_j_old - a_j);

        let d_i = y_i * (a_i - a_i_old);
        let d_j = y_j * (a_j - a_j_old);
        let b1 = self.bias - e_i - d_i - d_j * k_ij;
        let b2 = self.bias - e_j - d_i * k_ij - d_j;
        let bias = if a_i > 0.0 && a_i < self.c {
            b1
        } else if a_j > 0.0 && a_j < self.c {
            b2
        } else {
            (b1 + b2) / 2.0
        };
        let d_b = bias - self.bias;

        let row_j = self.cache.row(j);
        self.errors
            .par_iter_mut()
            .zip(row_i.par_iter().zip(row_j.par_iter()))
            .for_each(|(e, (k_i, k_j))| *e += d_i * k_i + d_j * k_j + d_b);

        self.alphas[i] = a_i;
        self.alphas[j] = a_j;
        self.bias = bias;
        true
    }
}

impl Estimator<Mat<f64>> for SvcClassifier {
    type Out = Vec<u8>;

    fn fit(&mut self, input: &Mat<f64>, labels: &[u8]) -> Result<()> {
        check_training_set(input, labels)?;

        if labels.iter().all(|&l| l == labels[0]) {
            self.fitted = Some(Fitted::Constant(labels[0]));
            return Ok(());
        }

        let n = labels.len();
        let xs: Vec<Vec<f64>> = (0..n).map(|i| row(input, i)).collect();
        let y: Vec<f64> = labels.iter().map(|&l| if l == 1 { 1.0 } else { -1.0 }).collect();
        let gamma = scale_gamma(&xs);

        let mut smo = Smo::new(&xs, &y, self.c, gamma, self.seed);
        smo.run(self.max_iter);
        let (alphas, bias) = (smo.alphas, smo.bias);

        let support = alphas
            .iter()
            .enumerate()
            .filter(|(_, &a)| a > ALPHA_EPS)
            .map(|(k, &a)| (a * y[k], xs[k].clone()))
            .collect();

        self.fitted = Some(Fitted::Kernel {
            gamma,
            bias,
            support,
        });
        Ok(())
    }

    fn apply(&self, input: &Mat<f64>) -> Result<Vec<u8>> {
        Ok(self
            .decision_function(input)?
            .into_iter()
            .map(|d| u8::from(d > 0.0))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separates_two_clusters() {
        let points = [
            [0.0, 0.0],
            [0.2, 0.1],
            [0.1, 0.3],
            [3.0, 3.0],
            [3.2, 2.9],
            [2.9, 3.1],
        ];
        let x = Mat::from_fn(6, 2, |i, j| points[i][j]);
        let y = [0, 0, 0, 1, 1, 1];

        let mut svc = SvcClassifier::new(1.0, 200, 1);
        svc.fit(&x, &y).unwrap();
        assert_eq!(svc.apply(&x).unwrap(), y.to_vec());
        assert!(svc.n_support_vectors() > 0);
    }

    #[test]
    fn test_single_class_training_set() {
        let x = Mat::from_fn(3, 1, |i, _| i as f64);
        let mut svc = SvcClassifier::new(1.0, 10, 1);
        svc.fit(&x, &[0, 0, 0]).unwrap();
        assert_eq!(svc.apply(&x).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_error_cache_tracks_decision_function() {
        let xs: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let t = i as f64;
                vec![(t * 0.37).sin() + (i % 2) as f64, (t * 0.11).cos()]
            })
            .collect();
        let y: Vec<f64> = (0..40).map(|i| if i % 2 == 1 { 1.0 } else { -1.0 }).collect();
        let gamma = scale_gamma(&xs);

        // capacity 2 forces evictions during training
        let mut smo = Smo::new(&xs, &y, 1.0, gamma, 3);
        smo.cache = KernelCache::new(&xs, gamma, 2);
        smo.run(50);

        for k in 0..xs.len() {
            let f: f64 = (0..xs.len())
                .map(|m| smo.alphas[m] * y[m] * rbf(&xs[m], &xs[k], gamma))
                .sum::<f64>()
                + smo.bias;
            assert!((smo.errors[k] - (f - y[k])).abs() < 1e-6, "row {}", k);
        }
        assert!(smo.alphas.iter().any(|&a| a > ALPHA_EPS));
    }

    #[test]
    fn test_kernel_cache_evicts_least_recent() {
        let xs = vec![vec![0.0], vec![1.0], vec![2.0]];
        let mut cache = KernelCache::new(&xs, 1.0, 2);
        cache.row(0);
        cache.row(1);
        cache.row(0);
        cache.row(2);

        assert!(cache.rows.contains_key(&0));
        assert!(!cache.rows.contains_key(&1));
        assert!(cache.rows.contains_key(&2));
        assert_eq!(cache.row(2)[2], 1.0);
        assert!((cache.row(0)[1] - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_scale_gamma() {
        let rows = vec![vec![0.0, 2.0], vec![2.0, 0.0]];
        // mean 1, variance 1, two features
        assert!((scale_gamma(&rows) - 0.5).abs() < 1e-12);
    }
}
