//! Configuration structures and loading logic

use crate::catalog::{CatalogEntry, ModelCatalog, validate_model_id};
use crate::command::DEFAULT_CONVERTER;
use crate::compression::CompressionProfiles;
use crate::planner::DEFAULT_HUB_ORG;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Converter configuration
///
/// ```toml
/// output_root = "/data/ov-models"
/// converter_binary = "optimum-cli"
/// hub_org = "OpenVINO"
///
/// [compression.default]
/// sym = false
/// group_size = 128
/// ratio = 0.8
///
/// [compression.models."Qwen/Qwen3-8B"]
/// sym = true
/// group_size = 64
/// ratio = 1.0
/// awq = true
/// scale_estimation = true
///
/// [[models]]
/// language = "English"
/// model_id = "microsoft/Phi-4-mini-instruct"
/// remote_code = true
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Artifacts are written to `<output_root>/<model-short-name>/<precision subdir>`
    pub output_root: PathBuf,
    pub converter_binary: String,
    /// Hub organization publishing preconverted artifacts
    pub hub_org: String,
    /// HF cache used for hub downloads, defaults to the standard HF cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_cache_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_token: Option<String>,
    /// Added to the built-in model catalog
    pub models: Vec<CatalogEntry>,
    pub compression: CompressionProfiles,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            converter_binary: DEFAULT_CONVERTER.to_string(),
            hub_org: DEFAULT_HUB_ORG.to_string(),
            hub_cache_dir: None,
            hub_token: None,
            models: Vec::new(),
            compression: CompressionProfiles::default(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(root) = std::env::var("OV_CONVERT_OUTPUT_ROOT") {
            config.output_root = PathBuf::from(root);
        }
        if let Ok(binary) = std::env::var("OV_CONVERT_BINARY") {
            config.converter_binary = binary;
        }
        if let Ok(org) = std::env::var("OV_CONVERT_HUB_ORG") {
            config.hub_org = org;
        }
        if let Ok(token) = std::env::var("HF_TOKEN")
            && !token.is_empty()
        {
            config.hub_token = Some(token);
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.converter_binary.trim().is_empty() {
            anyhow::bail!("converter_binary cannot be empty");
        }

        if self.hub_org.is_empty() {
            anyhow::bail!("hub_org cannot be empty");
        }
        if self.hub_org.contains('/') || self.hub_org.contains('\\') {
            anyhow::bail!(
                "hub_org '{}' cannot contain path separators",
                self.hub_org
            );
        }

        self.compression
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid compression config: {}", e))?;

        for entry in &self.models {
            if entry.language.is_empty() {
                anyhow::bail!("Model '{}' has an empty language", entry.model_id);
            }
            validate_model_id(&entry.model_id)?;
        }

        Ok(())
    }

    /// Built-in catalog extended with configured models
    pub fn catalog(&self) -> ModelCatalog {
        let mut catalog = ModelCatalog::builtin();
        catalog.extend(&self.models);
        catalog
    }
}

fn default_output_root() -> PathBuf {
    PathBuf::from(".")
}
