// config.rs — JSON configuration for all processing paths.
//
// Every field has a default, so a file only needs the values it changes:
//
//   { "tracking": { "max_corners": 50 }, "edges": { "aperture": 3 } }

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canny::EdgeConfig;
use crate::error::Result;
use crate::tracking::TrackerConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub tracking: TrackerConfig,
    pub edges: EdgeConfig,
}

impl ProcessingConfig {
    /// Parse and validate a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ProcessingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        debug!(path = %path.display(), "loaded processing config");
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.tracking.validate()?;
        self.edges.validate()
    }
}
