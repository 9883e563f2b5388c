use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::model::{DEFAULT_INNER_RADIUS, DEFAULT_OUTER_RADIUS};

/// Construction options for a [`CoefficientModel`](crate::CoefficientModel).
///
/// At least one of `filename` or `degree` must be set for construction to
/// succeed. A missing `knots` table selects the published 21-knot default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub filename: Option<PathBuf>,
    pub degree: Option<usize>,
    pub knots: Option<Vec<f64>>,
    /// km
    pub inner_radius: f64,
    /// km
    pub outer_radius: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            filename: None,
            degree: None,
            knots: None,
            inner_radius: DEFAULT_INNER_RADIUS,
            outer_radius: DEFAULT_OUTER_RADIUS,
        }
    }
}

impl ModelConfig {
    /// Load options from a JSON document.
    ///
    /// A relative `filename` is resolved against the config file's directory.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: ModelConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;

        if let (Some(file), Some(dir)) = (&config.filename, path.parent()) {
            if file.is_relative() {
                config.filename = Some(dir.join(file));
            }
        }
        Ok(config)
    }
}
