//! Weight compression profiles
//!
//! Profiles are looked up by model id with an explicit `default` fallback.
//! INT4-NPU ignores the table and always uses the symmetric channel-wise
//! profile the NPU plugin requires.

use crate::precision::Precision;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quantization parameters passed to the converter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionOptions {
    pub sym: bool,
    /// -1 disables grouping (per-channel)
    pub group_size: i64,
    /// Share of layers compressed to 4 bits, 0..=1
    pub ratio: f64,
    #[serde(default)]
    pub awq: bool,
    #[serde(default)]
    pub scale_estimation: bool,
    #[serde(default)]
    pub all_layers: bool,
}

impl CompressionOptions {
    pub fn new(sym: bool, group_size: i64, ratio: f64) -> Self {
        Self {
            sym,
            group_size,
            ratio,
            awq: false,
            scale_estimation: false,
            all_layers: false,
        }
    }

    /// Asymmetric, group size 128, 80% of layers in 4 bits
    pub fn default_profile() -> Self {
        Self::new(false, 128, 0.8)
    }

    /// Symmetric, per-channel, all layers in 4 bits
    pub fn npu_profile() -> Self {
        Self::new(true, -1, 1.0)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.ratio) {
            return Err(format!("ratio must be within [0, 1] (got {})", self.ratio));
        }
        if self.group_size == 0 || self.group_size < -1 {
            return Err(format!(
                "group_size must be positive or -1 (got {})",
                self.group_size
            ));
        }
        Ok(())
    }
}

/// Per-model compression profiles with a mandatory default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionProfiles {
    #[serde(default = "CompressionOptions::default_profile")]
    pub default: CompressionOptions,
    #[serde(default)]
    pub models: BTreeMap<String, CompressionOptions>,
}

impl Default for CompressionProfiles {
    fn default() -> Self {
        Self {
            default: CompressionOptions::default_profile(),
            models: BTreeMap::new(),
        }
    }
}

impl CompressionProfiles {
    pub fn with_model(mut self, model_id: impl Into<String>, options: CompressionOptions) -> Self {
        self.models.insert(model_id.into(), options);
        self
    }

    /// Profile registered for `model_id`, or the default
    pub fn lookup(&self, model_id: &str) -> &CompressionOptions {
        self.models.get(model_id).unwrap_or(&self.default)
    }

    /// Options to pass for a conversion, `None` for non-INT4 precisions
    pub fn for_precision(&self, model_id: &str, precision: Precision) -> Option<CompressionOptions> {
        if !precision.is_int4() {
            return None;
        }
        if precision.targets_npu() {
            return Some(CompressionOptions::npu_profile());
        }
        Some(self.lookup(model_id).clone())
    }

    pub fn validate(&self) -> Result<(), String> {
        self.default
            .validate()
            .map_err(|e| format!("default profile: {e}"))?;
        for (model_id, options) in &self.models {
            options
                .validate()
                .map_err(|e| format!("profile '{model_id}': {e}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom() -> CompressionOptions {
        CompressionOptions {
            sym: true,
            group_size: 64,
            ratio: 0.6,
            awq: false,
            scale_estimation: true,
            all_layers: false,
        }
    }

    #[test]
    fn test_lookup_falls_back_to_default() {
        let profiles = CompressionProfiles::default().with_model("Qwen/Qwen3-8B", custom());
        assert_eq!(profiles.lookup("Qwen/Qwen3-8B"), &custom());
        assert_eq!(
            profiles.lookup("Qwen/Qwen3-4B"),
            &CompressionOptions::default_profile()
        );
    }

    #[test]
    fn test_non_int4_has_no_options() {
        let profiles = CompressionProfiles::default();
        assert!(profiles.for_precision("m", Precision::Fp16).is_none());
        assert!(profiles.for_precision("m", Precision::Int8).is_none());
    }

    #[test]
    fn test_npu_overrides_model_profile() {
        let profiles = CompressionProfiles::default().with_model("org/m", custom());
        assert_eq!(
            profiles.for_precision("org/m", Precision::Int4Npu),
            Some(CompressionOptions::npu_profile())
        );
        assert_eq!(
            profiles.for_precision("org/m", Precision::Int4Awq),
            Some(custom())
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(CompressionOptions::new(false, 128, 1.5).validate().is_err());
        assert!(CompressionOptions::new(false, 0, 0.5).validate().is_err());
        assert!(CompressionOptions::new(false, -2, 0.5).validate().is_err());
        assert!(CompressionOptions::npu_profile().validate().is_ok());
    }

    #[test]
    fn test_toml_optional_flags_default_false() {
        let parsed: CompressionOptions =
            toml::from_str("sym = true\ngroup_size = 32\nratio = 1.0\n").unwrap();
        assert!(!parsed.awq);
        assert!(!parsed.scale_estimation);
        assert!(!parsed.all_layers);
    }
}
