//! Error types for conversion planning

use std::path::PathBuf;

/// Errors raised while planning, downloading or converting an artifact
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Precision string outside the supported set
    #[error("unsupported precision '{0}' (expected one of FP16, INT8, INT4, INT4-AWQ, INT4-NPU)")]
    UnsupportedPrecision(String),

    /// Model id that does not map to a folder under the output root
    #[error("invalid model id '{0}' (expected owner/name)")]
    InvalidModelId(String),

    #[error("{context} ({}): {source}", .path.display())]
    Io {
        context: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Converter binary could not be started at all
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Converter ran and exited non-zero
    #[error("converter exited with {}: {stderr}", exit_label(.code))]
    ConverterFailed { code: Option<i32>, stderr: String },

    #[error("hub error for '{repo_id}': {message}")]
    Hub { repo_id: String, message: String },
}

impl ConvertError {
    pub fn io(context: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            context: context.into(),
            path: path.into(),
            source,
        }
    }

    pub fn hub(repo_id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ConvertError::Hub {
            repo_id: repo_id.into(),
            message: message.to_string(),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {c}"),
        None => "signal".to_string(),
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_failed_message() {
        let err = ConvertError::ConverterFailed {
            code: Some(2),
            stderr: "bad flag".to_string(),
        };
        assert_eq!(err.to_string(), "converter exited with code 2: bad flag");

        let err = ConvertError::ConverterFailed {
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_invalid_model_id_message() {
        let err = ConvertError::InvalidModelId("org/..".to_string());
        assert!(err.to_string().contains("'org/..'"));
    }

    #[test]
    fn test_unsupported_precision_message() {
        let err = ConvertError::UnsupportedPrecision("INT3".to_string());
        assert!(err.to_string().contains("INT3"));
    }
}
