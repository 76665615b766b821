//! Resolver configuration, loadable from JSON.
use crate::validation::DiagnosticCode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Helper rendered for dot products; `{dimension}` is substituted.
    pub dot_helper: String,
    /// Helper rendered for cross products.
    pub cross_helper: String,
    /// Diagnostic codes the stock sink should not emit.
    pub suppressed_diagnostics: Vec<DiagnosticCode>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            dot_helper: "PureScalarMaths.Dot{dimension}".to_string(),
            cross_helper: "PureVector3Maths.Cross".to_string(),
            suppressed_diagnostics: Vec::new(),
        }
    }
}

impl ResolverConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn dot_helper_for(&self, dimension: u32) -> String {
        self.dot_helper.replace("{dimension}", &dimension.to_string())
    }
}
