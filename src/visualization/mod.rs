//! Visualization module: dimensionality reduction to 3-D coordinates.

pub mod embed;
pub mod method;
pub mod pca;
pub mod umap;

pub use embed::{rescale_axes, EmbedConfig, Embedder, Embedding, MethodMeta, N_COMPONENTS};
pub use method::{Capabilities, Method, MethodRequest};
pub use pca::{Pca, PcaConfig, PcaResult};
#[cfg(feature = "umap")]
pub use umap::Umap;
pub use umap::{Metric, UmapConfig};
