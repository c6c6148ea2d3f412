//! Supported model catalog
//!
//! Models are grouped by prompt language. The same model may appear under
//! several languages.

use crate::error::{ConvertError, ConvertResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LANGUAGE: &str = "English";

/// Source model to convert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// HuggingFace id of the PyTorch checkpoint (e.g. "Qwen/Qwen3-8B")
    pub model_id: String,
    /// Model ships custom modeling code the converter must execute
    #[serde(default)]
    pub remote_code: bool,
}

impl ModelSpec {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            remote_code: false,
        }
    }

    pub fn with_remote_code(mut self, remote_code: bool) -> Self {
        self.remote_code = remote_code;
        self
    }

    pub fn short_name(&self) -> &str {
        short_name(&self.model_id)
    }

    pub fn validate(&self) -> ConvertResult<()> {
        validate_model_id(&self.model_id)
    }
}

/// Last path segment of a model id ("Qwen/Qwen3-8B" -> "Qwen3-8B")
pub fn short_name(model_id: &str) -> &str {
    model_id.rsplit('/').next().unwrap_or(model_id)
}

/// Reject ids whose short name cannot be an artifact folder
///
/// The short name becomes `<output_root>/<short-name>`, so it must be a single
/// normal path component: not empty, not `.` or `..`, and no backslash.
pub fn validate_model_id(model_id: &str) -> ConvertResult<()> {
    let name = short_name(model_id);
    if name.trim().is_empty() || name == "." || name == ".." || name.contains('\\') {
        return Err(ConvertError::InvalidModelId(model_id.to_string()));
    }
    Ok(())
}

/// Extra catalog entry read from config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub language: String,
    pub model_id: String,
    #[serde(default)]
    pub remote_code: bool,
}

/// Language-grouped list of supported models, insertion ordered
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    languages: Vec<(String, Vec<ModelSpec>)>,
}

impl ModelCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for language in ["English", "Chinese"] {
            for model_id in ["Qwen/Qwen3-8B", "Qwen/Qwen3-4B"] {
                catalog.add(language, ModelSpec::new(model_id));
            }
        }
        catalog
    }

    /// Add a model, replacing an existing entry with the same id in that language
    pub fn add(&mut self, language: &str, spec: ModelSpec) {
        let idx = match self.languages.iter().position(|(l, _)| l == language) {
            Some(idx) => idx,
            None => {
                self.languages.push((language.to_string(), Vec::new()));
                self.languages.len() - 1
            }
        };
        let models = &mut self.languages[idx].1;

        match models.iter_mut().find(|m| m.model_id == spec.model_id) {
            Some(existing) => *existing = spec,
            None => models.push(spec),
        }
    }

    pub fn extend(&mut self, entries: &[CatalogEntry]) {
        for entry in entries {
            self.add(
                &entry.language,
                ModelSpec::new(entry.model_id.clone()).with_remote_code(entry.remote_code),
            );
        }
    }

    pub fn languages(&self) -> Vec<&str> {
        self.languages.iter().map(|(l, _)| l.as_str()).collect()
    }

    /// Models for a language (case-insensitive), empty if unknown
    pub fn models(&self, language: &str) -> &[ModelSpec] {
        self.languages
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(language))
            .map(|(_, m)| m.as_slice())
            .unwrap_or(&[])
    }

    /// First spec with this id in any language
    pub fn find(&self, model_id: &str) -> Option<&ModelSpec> {
        self.languages
            .iter()
            .flat_map(|(_, models)| models.iter())
            .find(|m| m.model_id == model_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("Qwen/Qwen3-8B"), "Qwen3-8B");
        assert_eq!(short_name("plain-model"), "plain-model");
        assert_eq!(short_name("a/b/c"), "c");
    }

    #[test]
    fn test_validate_model_id() {
        assert!(validate_model_id("Qwen/Qwen3-8B").is_ok());
        assert!(validate_model_id("local-model").is_ok());
        assert!(validate_model_id("org/v1.5").is_ok());

        for bad in ["", "org/", "org/..", "org/.", "..", " ", "org/a\\..", "org/ "] {
            let err = validate_model_id(bad).unwrap_err();
            assert!(matches!(err, ConvertError::InvalidModelId(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = ModelCatalog::builtin();
        assert_eq!(catalog.languages(), vec!["English", "Chinese"]);
        assert_eq!(catalog.models(DEFAULT_LANGUAGE).len(), 2);
        assert_eq!(catalog.models("chinese")[0].model_id, "Qwen/Qwen3-8B");
        assert!(catalog.models("Klingon").is_empty());
        assert!(catalog.find("Qwen/Qwen3-4B").is_some());
        assert!(catalog.find("Qwen/Qwen3-0.6B").is_none());
    }

    #[test]
    fn test_extend_adds_and_replaces() {
        let mut catalog = ModelCatalog::builtin();
        catalog.extend(&[
            CatalogEntry {
                language: "English".to_string(),
                model_id: "Qwen/Qwen3-8B".to_string(),
                remote_code: true,
            },
            CatalogEntry {
                language: "Japanese".to_string(),
                model_id: "org/jp-model".to_string(),
                remote_code: false,
            },
        ]);

        assert_eq!(catalog.models("English").len(), 2);
        assert!(catalog.models("English")[0].remote_code);
        assert_eq!(catalog.languages(), vec!["English", "Chinese", "Japanese"]);
        assert_eq!(catalog.find("org/jp-model").unwrap().short_name(), "jp-model");
    }
}
