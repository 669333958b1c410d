//! Per-question preprocessing
//!
//! Turns a question's raw response columns into the matrix fed to the
//! embedding engine:
//! - numeric coercion happens upstream in the loader
//! - missing values are filled from a [`FillPolicy`]
//! - each column is scaled to [-1, 1] independently
//! - Gaussian jitter is added so identical answer vectors do not collapse

mod config;
mod imputer;
mod scaler;

pub use config::{PreprocessingConfig, DEFAULT_NOISE_SD};
pub use imputer::{FillPolicy, LAST_RESORT_FILL};
pub use scaler::{MinMaxScaler, ScalerParams, DEFAULT_EPSILON, SCALED_TO_LABEL};

use crate::error::{EmbedError, Result};
use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// A question's responses after imputation, scaling and jitter.
#[derive(Debug, Clone)]
pub struct ScaledMatrix {
    /// n_samples x n_features
    pub data: Array2<f64>,
    /// Fill value applied to each column, in column order
    pub fill_values: Vec<f64>,
}

impl ScaledMatrix {
    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }
}

/// Imputes and scales the response columns of one question at a time.
#[derive(Debug, Clone, Default)]
pub struct QuestionPreprocessor {
    config: PreprocessingConfig,
}

impl QuestionPreprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Impute and scale without jitter. Every value lies in [-1, 1].
    pub fn scale(&self, base: &str, columns: &[Vec<Option<f64>>]) -> Result<ScaledMatrix> {
        let n_samples = columns.first().map_or(0, Vec::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_samples) {
            return Err(EmbedError::DataError(format!(
                "question {} has ragged columns ({} vs {} rows)",
                base,
                bad.len(),
                n_samples
            )));
        }

        let scaler = MinMaxScaler::new(self.config.epsilon);
        let mut data = Array2::<f64>::zeros((n_samples, columns.len()));
        let mut fill_values = Vec::with_capacity(columns.len());

        for (j, column) in columns.iter().enumerate() {
            let fill = self.config.fill_policy.resolve(base, column);
            let filled: Vec<f64> = column.iter().map(|v| v.unwrap_or(fill)).collect();
            let scaled = scaler.fit_transform(&filled);

            for (i, v) in scaled.into_iter().enumerate() {
                data[[i, j]] = v;
            }
            fill_values.push(fill);
        }

        Ok(ScaledMatrix { data, fill_values })
    }

    /// Impute, scale and add jitter drawn row-major from `rng`.
    pub fn scale_with_jitter<R: Rng + ?Sized>(
        &self,
        base: &str,
        columns: &[Vec<Option<f64>>],
        rng: &mut R,
    ) -> Result<ScaledMatrix> {
        let mut matrix = self.scale(base, columns)?;
        if self.config.noise_sd > 0.0 {
            let normal = Normal::new(0.0, self.config.noise_sd)
                .map_err(|e| EmbedError::ComputationError(e.to_string()))?;
            matrix.data.iter_mut().for_each(|v| *v += normal.sample(rng));
        }
        Ok(matrix)
    }
}
