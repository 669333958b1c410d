//! Embedding method selection
//!
//! `--methods` is parsed into a [`MethodRequest`] and resolved once, at
//! startup, against the [`Capabilities`] of the running build.

use crate::error::{EmbedError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A concrete dimensionality-reduction algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Umap,
    Pca,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Umap => "umap",
            Method::Pca => "pca",
        }
    }

    /// Output file name for one question, e.g. `embed_pca_Q7.json`
    pub fn file_name(&self, base: &str) -> String {
        format!("embed_{}_{}.json", self.as_str(), base)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "umap" => Ok(Method::Umap),
            "pca" => Ok(Method::Pca),
            other => Err(EmbedError::ConfigError(format!("Unknown method: {}", other))),
        }
    }
}

/// What the user asked for on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodRequest {
    /// Pick UMAP when available, otherwise PCA
    Auto,
    /// Exactly these methods, in first-seen order
    Explicit(Vec<Method>),
}

impl FromStr for MethodRequest {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        if s.is_empty() || s == "auto" {
            return Ok(MethodRequest::Auto);
        }

        let mut methods = Vec::new();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let method: Method = token.parse()?;
            if !methods.contains(&method) {
                methods.push(method);
            }
        }

        if methods.is_empty() {
            return Err(EmbedError::ConfigError("No methods specified".to_string()));
        }
        Ok(MethodRequest::Explicit(methods))
    }
}

/// Optional components compiled into this build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub umap: bool,
}

impl Capabilities {
    /// Inspect the running build. Call once per run.
    pub fn probe() -> Self {
        Self {
            umap: cfg!(feature = "umap"),
        }
    }

    pub fn supports(&self, method: Method) -> bool {
        match method {
            Method::Umap => self.umap,
            Method::Pca => true,
        }
    }
}

impl MethodRequest {
    /// Turn the request into the concrete methods to run.
    ///
    /// An explicit UMAP request fails when UMAP is unavailable; only `Auto`
    /// may fall back to PCA.
    pub fn resolve(&self, capabilities: &Capabilities) -> Result<Vec<Method>> {
        match self {
            MethodRequest::Auto => {
                if capabilities.umap {
                    Ok(vec![Method::Umap])
                } else {
                    Ok(vec![Method::Pca])
                }
            }
            MethodRequest::Explicit(methods) => {
                if methods.iter().any(|&m| !capabilities.supports(m)) {
                    return Err(EmbedError::UmapUnavailable);
                }
                Ok(methods.clone())
            }
        }
    }
}
