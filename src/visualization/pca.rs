//! PCA - Principal Component Analysis
//!
//! Linear dimensionality reduction. Computes the top-k eigenvectors of the
//! covariance matrix using power iteration with deflation.

use crate::error::{EmbedError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// PCA configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaConfig {
    /// Number of output dimensions
    pub n_components: usize,
    /// Whether to center the data (subtract mean per feature)
    pub center: bool,
    /// Whether to scale to unit variance
    pub scale: bool,
    /// Random seed for power iteration initialization
    pub random_state: u64,
    /// Power iteration cap per component
    pub max_iter: usize,
    /// Convergence tolerance on the eigenvector
    pub tol: f64,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            n_components: 3,
            center: true,
            scale: false,
            random_state: 42,
            max_iter: 300,
            tol: 1e-10,
        }
    }
}

impl PcaConfig {
    pub fn with_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }
}

/// PCA result including the embedding and explained variance
#[derive(Debug, Clone)]
pub struct PcaResult {
    /// Projected data: n_samples x n_components. Components beyond the rank
    /// of the input are zero.
    pub embedding: Array2<f64>,
    /// Explained variance ratio for each extracted component
    pub explained_variance_ratio: Vec<f64>,
    /// Eigenvalues (raw variance per component)
    pub eigenvalues: Vec<f64>,
}

/// PCA dimensionality reduction
pub struct Pca {
    config: PcaConfig,
}

impl Pca {
    pub fn new(config: PcaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PcaConfig {
        &self.config
    }

    /// Run PCA on an n_samples x n_features matrix.
    pub fn fit_transform(&self, data: ArrayView2<f64>) -> Result<PcaResult> {
        let (n, d) = data.dim();
        if n < 2 {
            return Err(EmbedError::DataError(
                "PCA requires at least 2 samples".to_string(),
            ));
        }
        if d < 1 {
            return Err(EmbedError::DataError(
                "PCA requires at least 1 feature".to_string(),
            ));
        }

        let k = self.config.n_components.min(d).min(n);

        let centered = self.center_and_scale(data);

        let cov = centered.t().dot(&centered) / (n as f64 - 1.0).max(1.0);

        let (eigenvalues, components) = self.power_iteration(&cov, k);

        let full_variance = cov.diag().sum().max(1e-12);
        let explained_variance_ratio = eigenvalues
            .iter()
            .map(|&ev| (ev / full_variance).max(0.0))
            .collect();

        // components: d x k
        let projected = centered.dot(&components);
        let mut embedding = Array2::<f64>::zeros((n, self.config.n_components));
        embedding
            .slice_mut(ndarray::s![.., ..k])
            .assign(&projected);

        Ok(PcaResult {
            embedding,
            explained_variance_ratio,
            eigenvalues,
        })
    }

    /// Center data (subtract mean) and optionally scale to unit variance.
    fn center_and_scale(&self, data: ArrayView2<f64>) -> Array2<f64> {
        let mut out = data.to_owned();

        if self.config.center {
            if let Some(means) = data.mean_axis(Axis(0)) {
                out -= &means;
            }
        }

        if self.config.scale {
            let stds: Array1<f64> = data.std_axis(Axis(0), 1.0).mapv(|s| s.max(1e-12));
            out /= &stds;
        }

        out
    }

    /// Power iteration with deflation to extract the top-k eigenvectors.
    /// Returns eigenvalues and a d x k matrix of eigenvectors as columns.
    ///
    /// Iterates are kept orthogonal to the eigenvectors already found, so a
    /// numerically exhausted residual cannot re-emit an earlier direction.
    fn power_iteration(&self, cov: &Array2<f64>, k: usize) -> (Vec<f64>, Array2<f64>) {
        let d = cov.nrows();
        let mut work = cov.clone();
        let mut eigenvalues = Vec::with_capacity(k);
        let mut components = Array2::<f64>::zeros((d, k));
        let mut found: Vec<Array1<f64>> = Vec::with_capacity(k);

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_state);

        for c in 0..k {
            let mut v: Array1<f64> = (0..d).map(|_| rng.gen_range(-1.0..1.0)).collect();
            orthogonalize(&mut v, &found);
            let norm = v.dot(&v).sqrt().max(1e-12);
            v /= norm;

            let mut eigenvalue = 0.0f64;

            for _ in 0..self.config.max_iter {
                let mut w = work.dot(&v);
                orthogonalize(&mut w, &found);
                let new_eigenvalue = v.dot(&w);

                let w_norm = w.dot(&w).sqrt();
                if w_norm < 1e-12 {
                    // Remaining variance is exhausted
                    eigenvalue = 0.0;
                    break;
                }
                let new_v = w / w_norm;

                let diff = (&new_v - &v).mapv(|x| x * x).sum().sqrt();
                v = new_v;
                eigenvalue = new_eigenvalue;

                if diff < self.config.tol {
                    break;
                }
            }

            eigenvalue = eigenvalue.max(0.0);
            eigenvalues.push(eigenvalue);
            if eigenvalue > 0.0 {
                components.column_mut(c).assign(&v);

                // Deflate: A = A - eigenvalue * v * v^T
                for i in 0..d {
                    for j in 0..d {
                        work[[i, j]] -= eigenvalue * v[i] * v[j];
                    }
                }
                found.push(v);
            }
        }

        (eigenvalues, components)
    }
}

/// Remove from `v` its projection onto each (unit) vector in `basis`.
fn orthogonalize(v: &mut Array1<f64>, basis: &[Array1<f64>]) {
    for u in basis {
        let p = u.dot(&*v);
        v.scaled_add(-p, u);
    }
}
