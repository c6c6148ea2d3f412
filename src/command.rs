//! Converter command construction
//!
//! Builds the `optimum-cli export openvino` invocation. Token order is fixed
//! and the output directory is always the last positional argument.

use crate::compression::CompressionOptions;
use std::fmt;
use std::path::Path;

pub const DEFAULT_CONVERTER: &str = "optimum-cli";
pub const EXPORT_TASK: &str = "text-generation-with-past";
pub const AWQ_DATASET: &str = "wikitext2";
pub const AWQ_NUM_SAMPLES: u32 = 128;

/// A fully resolved converter invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterCommand {
    program: String,
    args: Vec<String>,
}

impl ConverterCommand {
    /// Build the export command for one model/precision pair
    pub fn build(
        model_id: &str,
        weight_format: &str,
        output_dir: &Path,
        compression_options: Option<&CompressionOptions>,
        enable_awq: bool,
        trust_remote_code: bool,
    ) -> Self {
        let mut args: Vec<String> = [
            "export",
            "openvino",
            "--model",
            model_id,
            "--task",
            EXPORT_TASK,
            "--weight-format",
            weight_format,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if let Some(options) = compression_options {
            args.push("--group-size".to_string());
            args.push(options.group_size.to_string());
            args.push("--ratio".to_string());
            args.push(format_ratio(options.ratio));
            if options.sym {
                args.push("--sym".to_string());
            }
            if enable_awq || options.awq {
                args.push("--awq".to_string());
                args.push("--dataset".to_string());
                args.push(AWQ_DATASET.to_string());
                args.push("--num-samples".to_string());
                args.push(AWQ_NUM_SAMPLES.to_string());
                if options.scale_estimation {
                    args.push("--scale-estimation".to_string());
                }
            }
            if options.all_layers {
                args.push("--all-layers".to_string());
            }
        }

        if trust_remote_code {
            args.push("--trust-remote-code".to_string());
        }

        args.push(output_dir.to_string_lossy().into_owned());

        Self {
            program: DEFAULT_CONVERTER.to_string(),
            args,
        }
    }

    /// Replace the converter binary (e.g. a venv-local `optimum-cli`)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Program followed by its arguments
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for ConverterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Format the converter command line as a single string
pub fn format_command(
    model_id: &str,
    weight_format: &str,
    output_dir: impl AsRef<Path>,
    compression_options: Option<&CompressionOptions>,
    enable_awq: bool,
    trust_remote_code: bool,
) -> String {
    ConverterCommand::build(
        model_id,
        weight_format,
        output_dir.as_ref(),
        compression_options,
        enable_awq,
        trust_remote_code,
    )
    .to_string()
}

/// Integral ratios keep one decimal (`1.0`), others print shortest form (`0.8`)
fn format_ratio(ratio: f64) -> String {
    if ratio.fract() == 0.0 {
        format!("{ratio:.1}")
    } else {
        ratio.to_string()
    }
}
