//! Target precisions and their on-disk naming

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Weight precision a model is converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Precision {
    Fp16,
    Int8,
    Int4,
    Int4Awq,
    Int4Npu,
}

impl Precision {
    /// All supported precisions, FP16 baseline first
    pub const ALL: [Precision; 5] = [
        Precision::Fp16,
        Precision::Int8,
        Precision::Int4,
        Precision::Int4Awq,
        Precision::Int4Npu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Fp16 => "FP16",
            Precision::Int8 => "INT8",
            Precision::Int4 => "INT4",
            Precision::Int4Awq => "INT4-AWQ",
            Precision::Int4Npu => "INT4-NPU",
        }
    }

    /// Converter `--weight-format` value: lowercase prefix before any `-`
    pub fn weight_format(&self) -> &'static str {
        match self {
            Precision::Fp16 => "fp16",
            Precision::Int8 => "int8",
            Precision::Int4 | Precision::Int4Awq | Precision::Int4Npu => "int4",
        }
    }

    /// Artifact subdirectory name
    ///
    /// `FP16` for the baseline, `<PRECISION>_compressed_weights` otherwise.
    pub fn subdir(&self) -> String {
        match self {
            Precision::Fp16 => self.as_str().to_string(),
            _ => format!("{}_compressed_weights", self.as_str()),
        }
    }

    pub fn is_int4(&self) -> bool {
        matches!(
            self,
            Precision::Int4 | Precision::Int4Awq | Precision::Int4Npu
        )
    }

    pub fn uses_awq(&self) -> bool {
        matches!(self, Precision::Int4Awq)
    }

    pub fn targets_npu(&self) -> bool {
        matches!(self, Precision::Int4Npu)
    }

    /// Precisions offered for an inference device
    ///
    /// NPU only runs the symmetric channel-wise INT4 profile or FP16.
    pub fn for_device(device: &str) -> Vec<Precision> {
        if device.eq_ignore_ascii_case("NPU") {
            vec![Precision::Int4Npu, Precision::Fp16]
        } else {
            vec![
                Precision::Int4,
                Precision::Int4Awq,
                Precision::Int4Npu,
                Precision::Int8,
                Precision::Fp16,
            ]
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Precision::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConvertError::UnsupportedPrecision(s.to_string()))
    }
}

impl TryFrom<String> for Precision {
    type Error = ConvertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Precision> for String {
    fn from(p: Precision) -> Self {
        p.as_str().to_string()
    }
}
