//! Missing value imputation keyed by question id

use crate::utils::stats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fill value used when neither the policy nor the column provides one
pub const LAST_RESORT_FILL: f64 = 0.0;

/// Per-question fill values with an optional default.
///
/// Lookup order for a column of question `base`: explicit entry for `base`,
/// then `default`, then the column median, then [`LAST_RESORT_FILL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillPolicy {
    values: HashMap<String, f64>,
    default: Option<f64>,
}

impl Default for FillPolicy {
    fn default() -> Self {
        Self::survey()
    }
}

impl FillPolicy {
    /// Policy with no explicit values: every column falls back to its median.
    pub fn median_only() -> Self {
        Self {
            values: HashMap::new(),
            default: None,
        }
    }

    /// Neutral answers of the candidate survey: Q25 (preference ranking) → 5,
    /// Q1/Q24 → 0, everything else → 3.
    pub fn survey() -> Self {
        Self::median_only()
            .with_value("Q25", 5.0)
            .with_value("Q1", 0.0)
            .with_value("Q24", 0.0)
            .with_default(Some(3.0))
    }

    pub fn with_value(mut self, base: &str, value: f64) -> Self {
        self.values.insert(base.to_string(), value);
        self
    }

    pub fn with_default(mut self, default: Option<f64>) -> Self {
        self.default = default;
        self
    }

    /// Explicit fill value for a question, if the policy defines one.
    pub fn explicit_value(&self, base: &str) -> Option<f64> {
        self.values.get(base).copied().or(self.default)
    }

    /// Resolve the fill value for one column of `base`.
    pub fn resolve(&self, base: &str, column: &[Option<f64>]) -> f64 {
        self.explicit_value(base)
            .or_else(|| stats::median(column))
            .unwrap_or(LAST_RESORT_FILL)
    }

    /// Replace missing values in `column` and return the filled values.
    pub fn fill(&self, base: &str, column: &[Option<f64>]) -> Vec<f64> {
        let fill = self.resolve(base, column);
        column.iter().map(|v| v.unwrap_or(fill)).collect()
    }
}
