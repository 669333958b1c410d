//! Run configuration

use crate::preprocessing::PreprocessingConfig;
use crate::visualization::EmbedConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a single run needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw candidate responses
    pub candidates: PathBuf,
    /// Question-to-column mapping
    pub mapping: PathBuf,
    /// Output directory (created if missing)
    pub outdir: PathBuf,
    /// `auto` or a comma-separated subset of `umap,pca`
    pub methods: String,

    /// Respondent name column
    pub name_col: String,
    /// Respondent party column
    pub party_col: String,
    /// Respondent group column
    pub group_col: String,

    /// Seed of the RNG shared by all jitter and fabricated axes
    pub seed: u64,

    pub preprocessing: PreprocessingConfig,
    pub embedding: EmbedConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            candidates: PathBuf::from("_all_candidates.csv"),
            mapping: PathBuf::from("question_mapping.csv"),
            outdir: PathBuf::from("out"),
            methods: "auto".to_string(),
            name_col: "氏名".to_string(),
            party_col: "政党".to_string(),
            group_col: "グループ".to_string(),
            seed: 42,
            preprocessing: PreprocessingConfig::default(),
            embedding: EmbedConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_inputs(mut self, candidates: impl Into<PathBuf>, mapping: impl Into<PathBuf>) -> Self {
        self.candidates = candidates.into();
        self.mapping = mapping.into();
        self
    }

    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = outdir.into();
        self
    }

    pub fn with_methods(mut self, methods: impl Into<String>) -> Self {
        self.methods = methods.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
