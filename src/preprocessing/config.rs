//! Preprocessing configuration

use super::imputer::FillPolicy;
use super::scaler::DEFAULT_EPSILON;
use serde::{Deserialize, Serialize};

/// Standard deviation of the jitter added after scaling
pub const DEFAULT_NOISE_SD: f64 = 0.05;

/// Configuration for per-question imputation and scaling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Fill values keyed by base question id
    pub fill_policy: FillPolicy,

    /// Standard deviation of the Gaussian jitter added to every scaled value
    pub noise_sd: f64,

    /// Column ranges below this are flattened to 0
    pub epsilon: f64,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            fill_policy: FillPolicy::survey(),
            noise_sd: DEFAULT_NOISE_SD,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl PreprocessingConfig {
    pub fn with_fill_policy(mut self, policy: FillPolicy) -> Self {
        self.fill_policy = policy;
        self
    }

    pub fn with_noise_sd(mut self, noise_sd: f64) -> Self {
        self.noise_sd = noise_sd;
        self
    }
}
