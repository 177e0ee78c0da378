//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the kontakt pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KontaktConfig {
    /// Contact assembly and acceptance settings.
    pub extraction: ExtractionConfig,

    /// Signature location settings.
    pub signature: SignatureConfig,

    /// Phone normalization settings.
    pub phones: PhoneConfig,

    /// Resource (lexicon) locations.
    pub resources: ResourceConfig,
}

/// Contact assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum confidence score for a contact to be kept.
    pub min_confidence: f64,

    /// Enable INN checksum validation.
    pub validate_inn: bool,

    /// Hours added to `%d.%m.%Y %H:%M` message dates (0 leaves them as is).
    pub date_offset_hours: i64,

    /// Bodies longer than this are truncated before scanning.
    pub max_body_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            validate_inn: false,
            date_offset_hours: 0,
            max_body_chars: 15_000,
        }
    }
}

/// Signature locator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    /// Marker lines longer than this are prose, not salutations.
    pub max_marker_line_chars: usize,

    /// Lines taken after a marker.
    pub window_lines: usize,

    /// Lines taken from the end of the body when no marker is found.
    pub fallback_lines: usize,

    /// Minimum filtered length of a marker window.
    pub min_block_chars: usize,

    /// Minimum filtered length of the tail fallback block.
    pub min_fallback_chars: usize,

    /// Minimum length of the deep-cleaned whole-body block.
    pub min_body_chars: usize,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            max_marker_line_chars: 80,
            window_lines: 20,
            fallback_lines: 15,
            min_block_chars: 15,
            min_fallback_chars: 20,
            min_body_chars: 30,
        }
    }
}

/// Phone normalizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneConfig {
    /// Characters scanned before a number for extension keywords.
    pub context_before: usize,

    /// Characters scanned after a number for extension keywords.
    pub context_after: usize,

    /// Synthesize `(48)`-style sibling numbers.
    pub synthesize_variants: bool,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            context_before: 30,
            context_after: 50,
            synthesize_variants: true,
        }
    }
}

/// Resource file locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Directory with override resource files. Missing files fall back to
    /// the embedded defaults.
    pub dir: Option<PathBuf>,
}

impl KontaktConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: KontaktConfig =
            serde_json::from_str(r#"{"extraction": {"date_offset_hours": 4}}"#).unwrap();
        assert_eq!(config.extraction.date_offset_hours, 4);
        assert_eq!(config.extraction.min_confidence, 0.5);
        assert_eq!(config.signature.window_lines, 20);
        assert_eq!(config.phones.context_after, 50);
        assert!(config.resources.dir.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = KontaktConfig::default();
        config.extraction.validate_inn = true;
        config.save(&path).unwrap();

        let loaded = KontaktConfig::from_file(&path).unwrap();
        assert!(loaded.extraction.validate_inn);
        assert_eq!(loaded.signature.fallback_lines, 15);
    }

    #[test]
    fn test_invalid_json_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = KontaktConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
