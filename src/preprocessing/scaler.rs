//! Symmetric min-max scaling to [-1, 1]

use serde::{Deserialize, Serialize};

/// Ranges narrower than this are treated as constant columns
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Label written into output metadata describing the scaling convention
pub const SCALED_TO_LABEL: &str = "[-1,1] per column";

/// Fitted parameters of one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// Midpoint of the observed range
    pub mid: f64,
    /// Half of the observed range; `None` for a flattened column
    pub half: Option<f64>,
}

/// Per-column scaler mapping `[min, max]` onto `[-1, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    epsilon: f64,
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

impl MinMaxScaler {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Compute midpoint and half-range of a filled column.
    pub fn fit(&self, values: &[f64]) -> ScalerParams {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if values.is_empty() || max - min < self.epsilon {
            return ScalerParams { mid: 0.0, half: None };
        }

        ScalerParams {
            mid: (max + min) / 2.0,
            half: Some((max - min) / 2.0),
        }
    }

    pub fn transform(&self, values: &[f64], params: &ScalerParams) -> Vec<f64> {
        match params.half {
            Some(half) => values
                .iter()
                .map(|&v| ((v - params.mid) / half).clamp(-1.0, 1.0))
                .collect(),
            None => vec![0.0; values.len()],
        }
    }

    pub fn fit_transform(&self, values: &[f64]) -> Vec<f64> {
        let params = self.fit(values);
        self.transform(values, &params)
    }
}
