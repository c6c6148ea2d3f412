//! Conversion planner and artifact cache
//!
//! An artifact directory is `<output_root>/<short-name>/<precision subdir>`
//! and counts as converted as soon as it contains `openvino_model.xml`. No
//! checksum or version check is done, and nothing here ever deletes an
//! artifact.
//!
//! Calls for the same target directory are not coordinated. A second caller
//! racing a running conversion can see a partially written directory.

use crate::catalog::{ModelSpec, short_name, validate_model_id};
use crate::command::{ConverterCommand, DEFAULT_CONVERTER};
use crate::compression::CompressionProfiles;
use crate::config::ConverterConfig;
use crate::error::{ConvertError, ConvertResult};
use crate::hub::ArtifactHub;
use crate::precision::Precision;
use crate::runner::ProcessRunner;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Marker file whose presence means "conversion done"
pub const MODEL_MARKER: &str = "openvino_model.xml";
/// Weights file used for size comparison
pub const MODEL_WEIGHTS: &str = "openvino_model.bin";
pub const DEFAULT_HUB_ORG: &str = "OpenVINO";

/// How an artifact came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactOrigin {
    Cached,
    Downloaded,
    Converted,
}

/// A converted model on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionArtifact {
    pub dir: PathBuf,
    pub precision: Precision,
    pub origin: ArtifactOrigin,
}

/// What `ensure_converted` would do, without doing it
#[derive(Debug, Clone, Serialize)]
pub struct ConversionPlan {
    pub target_dir: PathBuf,
    pub cached: bool,
    pub preconverted_repo: String,
    pub command: String,
}

/// Artifact directory for a model/precision pair under `output_root`
pub fn artifact_dir(output_root: &Path, model_id: &str, precision: Precision) -> PathBuf {
    output_root.join(short_name(model_id)).join(precision.subdir())
}

/// Whether `dir` holds a finished conversion
pub fn is_converted(dir: &Path) -> bool {
    dir.join(MODEL_MARKER).exists()
}

/// Hub repo id of a preconverted artifact
///
/// e.g. ("OpenVINO", "Qwen/Qwen3-8B", INT4-AWQ) -> "OpenVINO/Qwen3-8B-int4-awq-ov"
pub fn preconverted_repo_id(hub_org: &str, source_model_id: &str, precision: Precision) -> String {
    format!(
        "{}/{}-{}-ov",
        hub_org,
        short_name(source_model_id),
        precision.as_str().to_lowercase()
    )
}

/// Decides between cache hit, hub download and local conversion
pub struct ConversionPlanner {
    output_root: PathBuf,
    converter_binary: String,
    hub_org: String,
    profiles: CompressionProfiles,
    runner: Arc<dyn ProcessRunner>,
    hub: Arc<dyn ArtifactHub>,
}

impl ConversionPlanner {
    pub fn new(
        output_root: impl Into<PathBuf>,
        runner: Arc<dyn ProcessRunner>,
        hub: Arc<dyn ArtifactHub>,
    ) -> Self {
        Self {
            output_root: output_root.into(),
            converter_binary: DEFAULT_CONVERTER.to_string(),
            hub_org: DEFAULT_HUB_ORG.to_string(),
            profiles: CompressionProfiles::default(),
            runner,
            hub,
        }
    }

    pub fn from_config(
        config: &ConverterConfig,
        runner: Arc<dyn ProcessRunner>,
        hub: Arc<dyn ArtifactHub>,
    ) -> Self {
        Self::new(config.output_root.clone(), runner, hub)
            .with_converter_binary(config.converter_binary.clone())
            .with_hub_org(config.hub_org.clone())
            .with_profiles(config.compression.clone())
    }

    pub fn with_converter_binary(mut self, binary: impl Into<String>) -> Self {
        self.converter_binary = binary.into();
        self
    }

    pub fn with_hub_org(mut self, hub_org: impl Into<String>) -> Self {
        self.hub_org = hub_org.into();
        self
    }

    pub fn with_profiles(mut self, profiles: CompressionProfiles) -> Self {
        self.profiles = profiles;
        self
    }

    /// Local converter command for a model/precision pair
    pub fn converter_command(
        &self,
        model_id: &str,
        model_spec: &ModelSpec,
        precision: Precision,
    ) -> ConverterCommand {
        let target_dir = artifact_dir(&self.output_root, model_id, precision);
        let options = self.profiles.for_precision(model_id, precision);

        ConverterCommand::build(
            &model_spec.model_id,
            precision.weight_format(),
            &target_dir,
            options.as_ref(),
            precision.uses_awq(),
            model_spec.remote_code,
        )
        .with_program(self.converter_binary.clone())
    }

    /// Describe the conversion without touching the hub or the converter
    pub fn plan(
        &self,
        model_id: &str,
        model_spec: &ModelSpec,
        precision: Precision,
    ) -> ConvertResult<ConversionPlan> {
        validate_model_id(model_id)?;
        model_spec.validate()?;

        let target_dir = artifact_dir(&self.output_root, model_id, precision);
        Ok(ConversionPlan {
            cached: is_converted(&target_dir),
            preconverted_repo: preconverted_repo_id(&self.hub_org, &model_spec.model_id, precision),
            command: self
                .converter_command(model_id, model_spec, precision)
                .to_string(),
            target_dir,
        })
    }

    /// Make sure the artifact for `model_id` at `precision` exists on disk
    ///
    /// Both ids must have a usable short name, otherwise
    /// [`ConvertError::InvalidModelId`] is returned before any I/O.
    /// Order of preference: existing artifact, preconverted hub artifact (only
    /// when `use_preconverted`), local converter run. A converter exit other
    /// than 0 is returned as [`ConvertError::ConverterFailed`]; whatever it
    /// wrote is left in place.
    pub async fn ensure_converted(
        &self,
        model_id: &str,
        model_spec: &ModelSpec,
        precision: Precision,
        use_preconverted: bool,
    ) -> ConvertResult<ConversionArtifact> {
        validate_model_id(model_id)?;
        model_spec.validate()?;

        let target_dir = artifact_dir(&self.output_root, model_id, precision);

        if is_converted(&target_dir) {
            tracing::info!(
                model_id = %model_id,
                precision = %precision,
                dir = ?target_dir,
                "Model already converted"
            );
            return Ok(ConversionArtifact {
                dir: target_dir,
                precision,
                origin: ArtifactOrigin::Cached,
            });
        }

        if use_preconverted {
            let repo_id = preconverted_repo_id(&self.hub_org, &model_spec.model_id, precision);
            let exists = match self.hub.repo_exists(&repo_id).await {
                Ok(exists) => exists,
                Err(e) => {
                    tracing::warn!(
                        repo_id = %repo_id,
                        error = %e,
                        "Hub check failed, falling back to local conversion"
                    );
                    false
                }
            };

            if exists {
                tracing::info!(
                    model_id = %model_id,
                    precision = %precision,
                    repo_id = %repo_id,
                    "Found preconverted model, downloading"
                );
                self.hub.snapshot_download(&repo_id, &target_dir).await?;
                tracing::info!(dir = ?target_dir, "Preconverted model downloaded");
                return Ok(ConversionArtifact {
                    dir: target_dir,
                    precision,
                    origin: ArtifactOrigin::Downloaded,
                });
            }

            tracing::info!(repo_id = %repo_id, "No preconverted model on hub");
        }

        let command = self.converter_command(model_id, model_spec, precision);
        tracing::info!(
            model_id = %model_id,
            precision = %precision,
            command = %command,
            "Starting conversion"
        );

        let output = self.runner.run(&command.argv()).await?;
        if !output.success() {
            tracing::error!(
                model_id = %model_id,
                precision = %precision,
                exit_code = ?output.exit_code,
                "Conversion failed"
            );
            return Err(ConvertError::ConverterFailed {
                code: output.exit_code,
                stderr: output.stderr,
            });
        }

        tracing::info!(
            model_id = %model_id,
            precision = %precision,
            dir = ?target_dir,
            "Model converted"
        );

        Ok(ConversionArtifact {
            dir: target_dir,
            precision,
            origin: ArtifactOrigin::Converted,
        })
    }
}
