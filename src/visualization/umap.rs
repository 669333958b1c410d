//! UMAP - Uniform Manifold Approximation and Projection
//!
//! Non-linear dimensionality reduction (McInnes et al., 2018):
//! - brute-force KNN graph under the euclidean metric
//! - fuzzy simplicial set with binary-search sigma
//! - SGD layout optimization with negative sampling
//!
//! The algorithm is compiled only with the `umap` feature; the configuration
//! types are always available so metadata and config files stay uniform.

use serde::{Deserialize, Serialize};

#[cfg(feature = "umap")]
pub use self::fit::Umap;

/// Distance used to build the neighbor graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Euclidean,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
        }
    }
}

/// UMAP configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UmapConfig {
    /// Number of nearest neighbors (controls local vs global structure)
    pub n_neighbors: usize,
    /// Minimum distance between points in the embedding
    pub min_dist: f64,
    /// Number of output dimensions
    pub n_components: usize,
    /// Distance metric in the input space
    pub metric: Metric,
    /// Optimization epochs; `None` picks 500 for small inputs, 200 otherwise
    pub n_epochs: Option<usize>,
    /// SGD learning rate
    pub learning_rate: f64,
    /// Number of negative samples per positive edge
    pub negative_sample_rate: usize,
    /// Spread of the embedding
    pub spread: f64,
    /// Random seed for reproducibility
    pub random_state: u64,
}

impl Default for UmapConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 30,
            min_dist: 0.8,
            n_components: 3,
            metric: Metric::Euclidean,
            n_epochs: None,
            learning_rate: 1.0,
            negative_sample_rate: 5,
            spread: 1.0,
            random_state: 42,
        }
    }
}

#[cfg(feature = "umap")]
mod fit {
    use super::{Metric, UmapConfig};
    use crate::error::{EmbedError, Result};
    use ndarray::{Array2, ArrayView1, ArrayView2};
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cmp::Ordering;
    use std::collections::{BinaryHeap, HashMap};

    /// A neighbor entry (max-heap by distance for eviction)
    #[derive(Clone)]
    struct Neighbor {
        index: usize,
        distance: f64,
    }

    impl PartialEq for Neighbor {
        fn eq(&self, other: &Self) -> bool {
            self.distance == other.distance
        }
    }

    impl Eq for Neighbor {}

    impl PartialOrd for Neighbor {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for Neighbor {
        fn cmp(&self, other: &Self) -> Ordering {
            self.distance.total_cmp(&other.distance)
        }
    }

    /// An edge in the fuzzy simplicial set
    struct Edge {
        i: usize,
        j: usize,
        weight: f64,
    }

    /// UMAP dimensionality reduction
    pub struct Umap {
        config: UmapConfig,
    }

    impl Umap {
        pub fn new(config: UmapConfig) -> Self {
            Self { config }
        }

        pub fn config(&self) -> &UmapConfig {
            &self.config
        }

        /// Run UMAP on dense data. Returns an n_samples x n_components embedding.
        pub fn fit_transform(&self, data: ArrayView2<f64>) -> Result<Array2<f64>> {
            let n = data.nrows();
            if n < 3 {
                return Err(EmbedError::DataError(
                    "UMAP requires at least 3 samples".to_string(),
                ));
            }
            if self.config.n_components == 0 {
                return Err(EmbedError::ComputationError(
                    "UMAP needs at least one output dimension".to_string(),
                ));
            }

            let k = self.config.n_neighbors.min(n - 1);

            let (knn_indices, knn_distances) = self.compute_knn(data, k);
            let edges = self.compute_fuzzy_set(&knn_indices, &knn_distances, k);
            Ok(self.optimize_layout(n, &edges))
        }

        /// Phase 1: exact k-nearest neighbors.
        fn compute_knn(&self, data: ArrayView2<f64>, k: usize) -> (Vec<Vec<usize>>, Vec<Vec<f64>>) {
            let n = data.nrows();
            let mut knn_indices = Vec::with_capacity(n);
            let mut knn_distances = Vec::with_capacity(n);

            for i in 0..n {
                let mut heap: BinaryHeap<Neighbor> = BinaryHeap::with_capacity(k + 1);
                let row_i = data.row(i);

                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dist = distance(self.config.metric, row_i, data.row(j));

                    if heap.len() < k {
                        heap.push(Neighbor { index: j, distance: dist });
                    } else if let Some(top) = heap.peek() {
                        if dist < top.distance {
                            heap.pop();
                            heap.push(Neighbor { index: j, distance: dist });
                        }
                    }
                }

                let neighbors = heap.into_sorted_vec();
                knn_indices.push(neighbors.iter().map(|nb| nb.index).collect());
                knn_distances.push(neighbors.iter().map(|nb| nb.distance).collect());
            }

            (knn_indices, knn_distances)
        }

        /// Phase 2: fuzzy simplicial set (edge weights).
        /// For each point find rho (nearest neighbor distance) and sigma
        /// (binary search so the membership sum hits log2(k)), then symmetrize
        /// with the probabilistic t-conorm.
        fn compute_fuzzy_set(
            &self,
            knn_indices: &[Vec<usize>],
            knn_distances: &[Vec<f64>],
            k: usize,
        ) -> Vec<Edge> {
            let n = knn_indices.len();
            let target = (k as f64).log2();

            let params: Vec<(f64, f64)> = knn_distances
                .iter()
                .map(|dists| {
                    let rho = dists.first().copied().unwrap_or(0.0).max(1e-12);

                    let mut lo = 1e-8_f64;
                    let mut hi = 1000.0_f64;
                    let mut sigma = 1.0;

                    for _ in 0..64 {
                        sigma = (lo + hi) / 2.0;
                        let sum: f64 = dists
                            .iter()
                            .map(|&d| (-(d - rho).max(0.0) / sigma).exp())
                            .sum();

                        if (sum - target).abs() < 1e-5 {
                            break;
                        }
                        if sum > target {
                            hi = sigma;
                        } else {
                            lo = sigma;
                        }
                    }

                    (rho, sigma)
                })
                .collect();

            let mut directed: HashMap<(usize, usize), f64> = HashMap::with_capacity(n * k);
            for i in 0..n {
                let (rho, sigma) = params[i];
                for (pos, (&j, &d)) in knn_indices[i].iter().zip(&knn_distances[i]).enumerate() {
                    let w = if pos == 0 {
                        1.0
                    } else {
                        (-(d - rho).max(0.0) / sigma.max(1e-12)).exp()
                    };
                    directed.insert((i, j), w);
                }
            }

            // w_sym(i,j) = w(i,j) + w(j,i) - w(i,j) * w(j,i)
            let mut symmetric: HashMap<(usize, usize), f64> = HashMap::with_capacity(directed.len());
            for (&(i, j), &w_ij) in &directed {
                let key = if i < j { (i, j) } else { (j, i) };
                let w_ji = directed.get(&(j, i)).copied().unwrap_or(0.0);
                let w_sym = w_ij + w_ji - w_ij * w_ji;
                symmetric
                    .entry(key)
                    .and_modify(|w| *w = w.max(w_sym))
                    .or_insert(w_sym);
            }

            // Sorted so the SGD visits edges in a reproducible order
            let mut edges: Vec<Edge> = symmetric
                .into_iter()
                .filter(|(_, w)| *w > 1e-8)
                .map(|((i, j), weight)| Edge { i, j, weight })
                .collect();
            edges.sort_by_key(|e| (e.i, e.j));
            edges
        }

        /// Phase 3: SGD layout optimization with negative sampling.
        fn optimize_layout(&self, n_samples: usize, edges: &[Edge]) -> Array2<f64> {
            let dim = self.config.n_components;
            let (a, b) = find_ab_params(self.config.spread, self.config.min_dist);

            let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_state);
            let mut embedding =
                Array2::from_shape_fn((n_samples, dim), |_| rng.gen_range(-10.0..10.0) * 0.01);

            let n_epochs = self
                .config
                .n_epochs
                .unwrap_or(if n_samples <= 10_000 { 500 } else { 200 });
            let neg_rate = self.config.negative_sample_rate;
            let max_weight = edges.iter().map(|e| e.weight).fold(0.0_f64, f64::max);

            let mut diff = vec![0.0f64; dim];

            for epoch in 0..n_epochs {
                let alpha = self.config.learning_rate * (1.0 - epoch as f64 / n_epochs as f64);
                if alpha < 1e-8 {
                    break;
                }

                for edge in edges {
                    // Heavier edges are sampled more often
                    let epochs_per_sample = if edge.weight > 0.0 {
                        max_weight / edge.weight
                    } else {
                        f64::INFINITY
                    };
                    if epoch as f64 % epochs_per_sample.max(1.0) >= 1.0 {
                        continue;
                    }

                    let (i, j) = (edge.i, edge.j);

                    // Attractive force
                    let dist_sq = row_diff(&embedding, i, j, &mut diff) + 1e-8;
                    let grad_coeff =
                        -2.0 * a * b * dist_sq.powf(b - 1.0) / (1.0 + a * dist_sq.powf(b));
                    for (d, &dy) in diff.iter().enumerate() {
                        let step = alpha * grad_coeff * dy;
                        embedding[[i, d]] += step;
                        embedding[[j, d]] -= step;
                    }

                    // Repulsive forces from random samples
                    for _ in 0..neg_rate {
                        let other = rng.gen_range(0..n_samples);
                        if other == i {
                            continue;
                        }
                        let dist_sq = row_diff(&embedding, i, other, &mut diff) + 1e-8;
                        let grad_coeff = 2.0 * b / ((0.001 + dist_sq) * (1.0 + a * dist_sq.powf(b)));
                        for (d, &dy) in diff.iter().enumerate() {
                            embedding[[i, d]] += alpha * grad_coeff * dy;
                        }
                    }

                    // Clip to prevent divergence
                    for d in 0..dim {
                        embedding[[i, d]] = embedding[[i, d]].clamp(-10.0, 10.0);
                        embedding[[j, d]] = embedding[[j, d]].clamp(-10.0, 10.0);
                    }
                }
            }

            embedding
        }
    }

    fn distance(metric: Metric, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match metric {
            Metric::Euclidean => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
        }
    }

    /// Write `row(i) - row(j)` into `out` and return its squared norm.
    fn row_diff(embedding: &Array2<f64>, i: usize, j: usize, out: &mut [f64]) -> f64 {
        let mut sq = 0.0;
        for (d, slot) in out.iter_mut().enumerate() {
            let v = embedding[[i, d]] - embedding[[j, d]];
            *slot = v;
            sq += v * v;
        }
        sq
    }

    /// Find a, b for the membership curve 1 / (1 + a * d^(2b)).
    fn find_ab_params(spread: f64, min_dist: f64) -> (f64, f64) {
        let mut b = 1.0;
        let mut a;

        if (spread - 1.0).abs() < 1e-6 {
            a = if min_dist > 0.0 {
                (2.0_f64.powf(2.0 * b) - 1.0) / min_dist.powf(2.0 * b)
            } else {
                1.0
            };
        } else {
            let mut lo = 0.1_f64;
            let mut hi = 5.0_f64;
            for _ in 0..64 {
                b = (lo + hi) / 2.0;
                a = (2.0_f64.powf(2.0 * b) - 1.0) / spread.powf(2.0 * b);
                let val = 1.0 / (1.0 + a * min_dist.powf(2.0 * b));
                if val > 0.99 {
                    hi = b;
                } else {
                    lo = b;
                }
            }
            a = (2.0_f64.powf(2.0 * b) - 1.0) / spread.powf(2.0 * b);
        }

        (a.max(1e-8), b.max(0.1))
    }

}
