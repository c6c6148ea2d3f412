//! ov-convert - OpenVINO model conversion planner
//!
//! Prepares OpenVINO IR artifacts of HuggingFace language models at a chosen
//! weight precision, reusing existing artifacts, downloading preconverted ones
//! from the hub, or running `optimum-cli` locally.

pub mod catalog;
pub mod command;
pub mod compression;
pub mod config;
pub mod error;
pub mod hub;
pub mod planner;
pub mod precision;
pub mod report;
pub mod runner;

pub use catalog::{ModelCatalog, ModelSpec};
pub use command::{ConverterCommand, format_command};
pub use compression::{CompressionOptions, CompressionProfiles};
pub use config::ConverterConfig;
pub use error::{ConvertError, ConvertResult};
pub use hub::{ArtifactHub, HfHub};
pub use planner::{ArtifactOrigin, ConversionArtifact, ConversionPlan, ConversionPlanner};
pub use precision::Precision;
pub use report::{SizeReport, report_sizes};
pub use runner::{ProcessOutput, ProcessRunner, SystemProcessRunner};
