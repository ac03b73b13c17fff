use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::TranslationUnit;

/// On-disk encoding of a translation unit, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFormat {
    Json,
    Yaml,
}

impl UnitFormat {
    /// `.yaml`/`.yml` select YAML; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => UnitFormat::Yaml,
            _ => UnitFormat::Json,
        }
    }
}

/// Parse a translation unit from a string in the given format.
pub fn parse_translation_unit(body: &str, format: UnitFormat) -> Result<TranslationUnit> {
    let unit = match format {
        UnitFormat::Json => {
            serde_json::from_str(body).context("Failed to parse translation unit JSON")?
        }
        UnitFormat::Yaml => {
            serde_yaml::from_str(body).context("Failed to parse translation unit YAML")?
        }
    };
    Ok(unit)
}

/// Load a translation unit from disk.
pub fn load_translation_unit(path: &Path) -> Result<TranslationUnit> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read translation unit at {}", path.display()))?;
    parse_translation_unit(&body, UnitFormat::from_path(path))
        .with_context(|| format!("Invalid translation unit: {}", path.display()))
}
