//! 3-D embedding engine
//!
//! Dispatches a scaled matrix to UMAP or PCA and rescales every output axis
//! to a common standard deviation, so questions and methods share one
//! visual scale.

use super::method::Method;
use super::pca::{Pca, PcaConfig};
use super::umap::{Metric, UmapConfig};
use crate::error::{EmbedError, Result};
use ndarray::{Array2, ArrayView2};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Output dimensionality of every embedding
pub const N_COMPONENTS: usize = 3;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Standard deviation every output axis is rescaled to
    pub target_std: f64,
    /// Noise sd of the fabricated third axis when a question has 2 columns
    pub two_feature_noise_sd: f64,
    /// Noise sd of the two fabricated axes when a question has 1 column
    pub one_feature_noise_sd: f64,
    pub pca: PcaConfig,
    pub umap: UmapConfig,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            target_std: 30.0,
            two_feature_noise_sd: 0.5,
            one_feature_noise_sd: 0.8,
            pca: PcaConfig::default(),
            umap: UmapConfig::default(),
        }
    }
}

/// Algorithm description written into each output file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method")]
pub enum MethodMeta {
    #[serde(rename = "UMAP")]
    Umap {
        n_components: usize,
        n_neighbors: usize,
        min_dist: f64,
        metric: Metric,
        random_state: u64,
    },
    #[serde(rename = "PCA_fallback")]
    Pca {
        n_components: usize,
        random_state: u64,
    },
}

/// n_samples x 3 coordinates and how they were produced
#[derive(Debug, Clone)]
pub struct Embedding {
    pub coords: Array2<f64>,
    pub meta: MethodMeta,
}

/// Produces 3-D coordinates from a scaled matrix
#[derive(Debug, Clone, Default)]
pub struct Embedder {
    config: EmbedConfig,
}

impl Embedder {
    pub fn new(config: EmbedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    /// Embed `data` with `method`. `rng` supplies fabricated PCA axes.
    pub fn embed<R: Rng + ?Sized>(
        &self,
        data: ArrayView2<f64>,
        method: Method,
        rng: &mut R,
    ) -> Result<Embedding> {
        let (mut coords, meta) = match method {
            Method::Umap => self.umap(data)?,
            Method::Pca => self.pca(data, rng)?,
        };
        rescale_axes(&mut coords, self.config.target_std);
        Ok(Embedding { coords, meta })
    }

    #[cfg(feature = "umap")]
    fn umap(&self, data: ArrayView2<f64>) -> Result<(Array2<f64>, MethodMeta)> {
        use super::umap::Umap;

        let config = UmapConfig {
            n_components: N_COMPONENTS,
            ..self.config.umap.clone()
        };
        let coords = Umap::new(config.clone()).fit_transform(data)?;
        let meta = MethodMeta::Umap {
            n_components: config.n_components,
            n_neighbors: config.n_neighbors,
            min_dist: config.min_dist,
            metric: config.metric,
            random_state: config.random_state,
        };
        Ok((coords, meta))
    }

    #[cfg(not(feature = "umap"))]
    fn umap(&self, _data: ArrayView2<f64>) -> Result<(Array2<f64>, MethodMeta)> {
        Err(EmbedError::UmapUnavailable)
    }

    /// PCA with graceful degradation for narrow questions:
    /// - 3+ columns: three principal components
    /// - 2 columns: two components plus a noise axis
    /// - 1 column: the column itself plus two noise axes
    fn pca<R: Rng + ?Sized>(
        &self,
        data: ArrayView2<f64>,
        rng: &mut R,
    ) -> Result<(Array2<f64>, MethodMeta)> {
        let (n, d) = data.dim();
        let random_state = self.config.pca.random_state;

        let coords = match d {
            0 | 1 => {
                let normal = normal(self.config.one_feature_noise_sd)?;
                let mut coords = Array2::<f64>::zeros((n, N_COMPONENTS));
                if d == 1 {
                    coords.column_mut(0).assign(&data.column(0));
                }
                for i in 0..n {
                    for c in 1..N_COMPONENTS {
                        coords[[i, c]] = normal.sample(rng);
                    }
                }
                coords
            }
            2 => {
                let config = self.config.pca.clone().with_components(2);
                let projected = Pca::new(config).fit_transform(data)?.embedding;
                let normal = normal(self.config.two_feature_noise_sd)?;
                let mut coords = Array2::<f64>::zeros((n, N_COMPONENTS));
                coords.slice_mut(ndarray::s![.., ..2]).assign(&projected);
                for i in 0..n {
                    coords[[i, 2]] = normal.sample(rng);
                }
                coords
            }
            _ => {
                let config = self.config.pca.clone().with_components(N_COMPONENTS);
                Pca::new(config).fit_transform(data)?.embedding
            }
        };

        let meta = MethodMeta::Pca {
            n_components: N_COMPONENTS,
            random_state,
        };
        Ok((coords, meta))
    }
}

fn normal(sd: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, sd).map_err(|e| EmbedError::ComputationError(e.to_string()))
}

/// Rescale each column to `target_std`: `c / (std(c) + 1e-9) * target_std`.
/// Columns are not re-centered.
pub fn rescale_axes(coords: &mut Array2<f64>, target_std: f64) {
    if coords.nrows() == 0 {
        return;
    }
    for mut column in coords.columns_mut() {
        let factor = target_std / (column.std(0.0) + 1e-9);
        column.mapv_inplace(|v| v * factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn column_std(coords: &Array2<f64>, c: usize) -> f64 {
        coords.column(c).std(0.0)
    }

    fn sample_matrix(n: usize, d: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, d), |(i, j)| ((i * 7 + j * 3) % 11) as f64 / 5.0 - 1.0)
    }

    #[test]
    fn test_rescale_axes_hits_target_std() {
        let mut coords = array![[1.0, 0.0, 5.0], [2.0, 0.0, 6.0], [3.0, 0.0, 9.0]];
        rescale_axes(&mut coords, 30.0);
        assert!((column_std(&coords, 0) - 30.0).abs() < 1e-6);
        assert!((column_std(&coords, 2) - 30.0).abs() < 1e-6);
        // A constant zero axis stays zero
        assert!(coords.column(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_pca_three_or_more_features() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let data = sample_matrix(12, 5);
        let emb = Embedder::default().embed(data.view(), Method::Pca, &mut rng).unwrap();

        assert_eq!(emb.coords.dim(), (12, 3));
        assert_eq!(
            emb.meta,
            MethodMeta::Pca { n_components: 3, random_state: 42 }
        );
        for c in 0..3 {
            assert!((column_std(&emb.coords, c) - 30.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_pca_two_features_adds_noise_axis() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let data = sample_matrix(10, 2);
        let emb = Embedder::default().embed(data.view(), Method::Pca, &mut rng).unwrap();

        assert_eq!(emb.coords.dim(), (10, 3));
        let z = emb.coords.column(2);
        assert!(z.iter().any(|&v| (v - z[0]).abs() > 1e-9), "z should vary");
    }

    #[test]
    fn test_pca_single_feature_keeps_column() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let data = array![[-1.0], [0.0], [1.0], [0.5]];
        let emb = Embedder::default().embed(data.view(), Method::Pca, &mut rng).unwrap();

        // x is the real column up to the positive rescale factor
        let x = emb.coords.column(0);
        assert!(x[0] < x[3] && x[3] < x[2]);
        assert!((x[1]).abs() < 1e-9);
    }

    #[test]
    fn test_pca_consumes_shared_rng() {
        let data = sample_matrix(6, 2);
        let embedder = Embedder::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let first = embedder.embed(data.view(), Method::Pca, &mut rng).unwrap();
        let second = embedder.embed(data.view(), Method::Pca, &mut rng).unwrap();
        assert_ne!(first.coords.column(2), second.coords.column(2));
    }

    #[test]
    fn test_method_meta_json() {
        let meta = MethodMeta::Pca { n_components: 3, random_state: 42 };
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"method":"PCA_fallback","n_components":3,"random_state":42}"#);

        let meta = MethodMeta::Umap {
            n_components: 3,
            n_neighbors: 30,
            min_dist: 0.8,
            metric: Metric::Euclidean,
            random_state: 42,
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(
            json,
            r#"{"method":"UMAP","n_components":3,"n_neighbors":30,"min_dist":0.8,"metric":"euclidean","random_state":42}"#
        );
    }

    #[cfg(feature = "umap")]
    #[test]
    fn test_umap_embedding_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let data = sample_matrix(15, 4);
        let emb = Embedder::default().embed(data.view(), Method::Umap, &mut rng).unwrap();
        assert_eq!(emb.coords.dim(), (15, 3));
        assert!(emb.coords.iter().all(|v| v.is_finite()));
        assert!(matches!(emb.meta, MethodMeta::Umap { n_neighbors: 30, .. }));
    }

    #[cfg(not(feature = "umap"))]
    #[test]
    fn test_umap_unavailable() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let data = sample_matrix(15, 4);
        let result = Embedder::default().embed(data.view(), Method::Umap, &mut rng);
        assert!(matches!(result, Err(EmbedError::UmapUnavailable)));
    }
}
