//! Configuration file support.
//!
//! A configuration file is a JSON object with optional `chapters`,
//! `paragraphs` and `export` sections. Missing keys take their defaults;
//! unknown keys are rejected.
//!
//! ```json
//! {
//!   "chapters": { "error_mode": "strict", "heading": { "gate_font_size": 13.0 } },
//!   "paragraphs": { "grouping_threshold": 25.0 }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chapters::ChapterConfig;
use crate::error::{Error, Result};
use crate::export::ExportConfig;
use crate::paragraphs::ParagraphConfig;

/// All pipeline options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub chapters: ChapterConfig,
    pub paragraphs: ParagraphConfig,
    pub export: ExportConfig,
}

impl Config {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Serialize the configuration as pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
