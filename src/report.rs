//! Artifact size and compression-rate reporting

use crate::planner::MODEL_WEIGHTS;
use crate::precision::Precision;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

const MIB: f64 = 1024.0 * 1024.0;

/// Weights size of one sibling artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrecisionSize {
    pub precision: Precision,
    pub weights_path: PathBuf,
    pub bytes: u64,
    /// `fp16_bytes / bytes`, only when both artifacts exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,
}

/// Sizes of every existing precision next to a given artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SizeReport {
    pub entries: Vec<PrecisionSize>,
}

impl SizeReport {
    pub fn get(&self, precision: Precision) -> Option<&PrecisionSize> {
        self.entries.iter().find(|e| e.precision == precision)
    }

    pub fn fp16_bytes(&self) -> Option<u64> {
        self.get(Precision::Fp16).map(|e| e.bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            let mb = entry.bytes as f64 / MIB;
            if entry.precision == Precision::Fp16 {
                writeln!(f, "Size of FP16 model is {mb:.2} MB")?;
            } else {
                writeln!(
                    f,
                    "Size of model with {} compressed weights is {mb:.2} MB",
                    entry.precision
                )?;
            }
            if let Some(ratio) = entry.compression_ratio {
                writeln!(f, "Compression rate for {} model: {ratio:.3}", entry.precision)?;
            }
        }
        Ok(())
    }
}

fn weights_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
}

/// Collect weight sizes for all precisions that sit next to `model_dir`
///
/// `model_dir` can be any one artifact directory; siblings are found in its
/// parent by their fixed subdirectory names. Missing siblings are skipped.
pub fn report_sizes(model_dir: &Path) -> SizeReport {
    let parent = model_dir.parent().unwrap_or(model_dir);
    let fp16_bytes = weights_size(&parent.join(Precision::Fp16.subdir()).join(MODEL_WEIGHTS));

    let entries = Precision::ALL
        .into_iter()
        .filter_map(|precision| {
            let weights_path = parent.join(precision.subdir()).join(MODEL_WEIGHTS);
            let bytes = weights_size(&weights_path)?;
            let compression_ratio = match (precision, fp16_bytes) {
                (Precision::Fp16, _) => None,
                (_, Some(fp16)) if bytes > 0 => Some(fp16 as f64 / bytes as f64),
                _ => None,
            };
            Some(PrecisionSize {
                precision,
                weights_path,
                bytes,
                compression_ratio,
            })
        })
        .collect();

    let report = SizeReport { entries };
    tracing::debug!(dir = ?parent, found = report.entries.len(), "Collected artifact sizes");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_weights(root: &Path, precision: Precision, len: u64) {
        let dir = root.join(precision.subdir());
        std::fs::create_dir_all(&dir).unwrap();
        let file = std::fs::File::create(dir.join(MODEL_WEIGHTS)).unwrap();
        file.set_len(len).unwrap();
    }

    #[test]
    fn test_ratio_against_fp16() {
        let root = TempDir::new().unwrap();
        write_weights(root.path(), Precision::Fp16, 200 * 1024 * 1024);
        write_weights(root.path(), Precision::Int8, 50 * 1024 * 1024);

        let report = report_sizes(&root.path().join(Precision::Int8.subdir()));
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.fp16_bytes(), Some(200 * 1024 * 1024));
        assert_eq!(report.get(Precision::Int8).unwrap().compression_ratio, Some(4.0));
        assert_eq!(report.get(Precision::Fp16).unwrap().compression_ratio, None);
    }

    #[test]
    fn test_no_ratio_without_fp16() {
        let root = TempDir::new().unwrap();
        write_weights(root.path(), Precision::Int4, 1000);
        write_weights(root.path(), Precision::Int4Npu, 900);

        let report = report_sizes(&root.path().join("FP16"));
        assert_eq!(report.entries.len(), 2);
        assert!(report.entries.iter().all(|e| e.compression_ratio.is_none()));
        assert_eq!(report.fp16_bytes(), None);
    }

    #[test]
    fn test_missing_siblings_skipped() {
        let root = TempDir::new().unwrap();
        let report = report_sizes(&root.path().join("INT4_compressed_weights"));
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "");
    }

    #[test]
    fn test_display_matches_text_report() {
        let root = TempDir::new().unwrap();
        write_weights(root.path(), Precision::Fp16, 4 * 1024 * 1024);
        write_weights(root.path(), Precision::Int4Awq, 1024 * 1024);

        let text = report_sizes(&root.path().join("FP16")).to_string();
        assert_eq!(
            text,
            "Size of FP16 model is 4.00 MB\n\
             Size of model with INT4-AWQ compressed weights is 1.00 MB\n\
             Compression rate for INT4-AWQ model: 4.000\n"
        );
    }

    #[test]
    fn test_json_shape() {
        let root = TempDir::new().unwrap();
        write_weights(root.path(), Precision::Fp16, 10);
        let json = serde_json::to_value(report_sizes(&root.path().join("FP16"))).unwrap();
        assert_eq!(json["entries"][0]["precision"], "FP16");
        assert_eq!(json["entries"][0]["bytes"], 10);
        assert!(json["entries"][0].get("compression_ratio").is_none());
    }
}
