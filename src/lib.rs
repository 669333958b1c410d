//! survey-embed - 3D maps of candidate survey answers
//!
//! Reads a table of candidate responses and a question mapping, and for each
//! question places every respondent in 3D space so that similar answers sit
//! close together.
//!
//! # Modules
//!
//! ## Inputs
//! - [`utils`] - CSV loading and small statistics helpers
//! - [`mapping`] - Question grouping, ordering and option labels
//!
//! ## Processing
//! - [`preprocessing`] - Missing-value fill, [-1,1] scaling, jitter
//! - [`visualization`] - PCA and UMAP engines, method selection
//!
//! ## Outputs
//! - [`export`] - Per-question embedding files and the manifest
//!
//! ## Orchestration
//! - [`config`] - Run configuration
//! - [`pipeline`] - End-to-end run
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

pub mod config;
pub mod mapping;
pub mod preprocessing;
pub mod visualization;
pub mod export;
pub mod pipeline;
pub mod utils;

// CLI
pub mod cli;

pub use error::{EmbedError, Result};

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::{EmbedError, Result};
    pub use crate::export::{Manifest, QuestionEntry, MANIFEST_FILE};
    pub use crate::mapping::{QuestionMapping, QuestionMeta};
    pub use crate::pipeline::{EmbeddingPipeline, RunSummary};
    pub use crate::preprocessing::{FillPolicy, PreprocessingConfig, QuestionPreprocessor};
    pub use crate::visualization::{Capabilities, EmbedConfig, Embedder, Method, MethodRequest};
}
