//! Remote artifact hub for preconverted models
//!
//! The planner only needs two operations: "does this repo exist" and
//! "copy its snapshot into a local directory". The production implementation
//! talks to the HuggingFace Hub through the native hf-hub crate. Files land in
//! the standard HF cache first and are then copied into the artifact directory:
//!
//! ```text
//! ~/.cache/huggingface/hub/models--OpenVINO--Qwen3-8B-int4-ov/snapshots/{rev}/...
//!     -> ./Qwen3-8B/INT4_compressed_weights/...
//! ```

use crate::error::{ConvertError, ConvertResult};
use crate::planner::MODEL_MARKER;
use async_trait::async_trait;
use hf_hub::api::tokio::{Api, ApiBuilder};
use std::path::{Path, PathBuf};

#[async_trait]
pub trait ArtifactHub: Send + Sync {
    /// Whether the repo exists and is readable
    async fn repo_exists(&self, repo_id: &str) -> ConvertResult<bool>;

    /// Download every file of the repo into `local_dir`, keeping relative paths
    async fn snapshot_download(&self, repo_id: &str, local_dir: &Path) -> ConvertResult<()>;
}

/// Get the HuggingFace cache directory
///
/// Checks in order:
/// 1. `$HF_HOME/hub`
/// 2. `$XDG_CACHE_HOME/huggingface/hub`
/// 3. `~/.cache/huggingface/hub`
pub fn default_cache_dir() -> PathBuf {
    if let Ok(hf_home) = std::env::var("HF_HOME") {
        return PathBuf::from(hf_home).join("hub");
    }

    if let Ok(xdg_cache) = std::env::var("XDG_CACHE_HOME") {
        return PathBuf::from(xdg_cache).join("huggingface/hub");
    }

    dirs::home_dir()
        .map(|h| h.join(".cache/huggingface/hub"))
        .unwrap_or_else(|| PathBuf::from("/tmp/huggingface/hub"))
}

/// Repo files in download order, with the model marker moved last
///
/// The marker alone makes a directory count as converted, so it must not land
/// before the rest of the snapshot.
fn download_order<'a>(files: &[&'a str]) -> Vec<&'a str> {
    let (mut ordered, markers): (Vec<&str>, Vec<&str>) =
        files.iter().partition(|f| **f != MODEL_MARKER);
    ordered.extend(markers);
    ordered
}

/// Copy one cached repo file to `local_dir/<rfilename>`, creating subdirectories
async fn place_file(cached: &Path, local_dir: &Path, rfilename: &str) -> ConvertResult<PathBuf> {
    let dest = local_dir.join(rfilename);
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ConvertError::io("creating artifact subdirectory", parent, e))?;
    }
    tokio::fs::copy(cached, &dest)
        .await
        .map_err(|e| ConvertError::io("copying downloaded file", &dest, e))?;
    Ok(dest)
}

/// HuggingFace Hub backed artifact source
pub struct HfHub {
    api: Api,
}

impl HfHub {
    /// Build a client using `cache_dir` (or the default HF cache) and an optional token
    pub fn new(cache_dir: Option<PathBuf>, token: Option<String>) -> ConvertResult<Self> {
        let cache_dir = cache_dir.unwrap_or_else(default_cache_dir);
        tracing::debug!(cache_dir = ?cache_dir, "Creating HF API client");

        let api = ApiBuilder::new()
            .with_cache_dir(cache_dir)
            .with_token(token)
            .build()
            .map_err(|e| ConvertError::hub("<client>", format!("failed to create HF API client: {e}")))?;

        Ok(Self { api })
    }
}

#[async_trait]
impl ArtifactHub for HfHub {
    async fn repo_exists(&self, repo_id: &str) -> ConvertResult<bool> {
        match self.api.model(repo_id.to_string()).info().await {
            Ok(_) => Ok(true),
            Err(e) => {
                // hf-hub does not separate 404 from transport errors; both mean
                // "not available" here.
                tracing::debug!(repo_id = %repo_id, error = %e, "Repo info lookup failed");
                Ok(false)
            }
        }
    }

    async fn snapshot_download(&self, repo_id: &str, local_dir: &Path) -> ConvertResult<()> {
        tracing::info!(repo_id = %repo_id, local_dir = ?local_dir, "Starting snapshot download via hf-hub");

        let repo = self.api.model(repo_id.to_string());
        let info = repo
            .info()
            .await
            .map_err(|e| ConvertError::hub(repo_id, format!("failed to list files: {e}")))?;

        tokio::fs::create_dir_all(local_dir)
            .await
            .map_err(|e| ConvertError::io("creating artifact directory", local_dir, e))?;

        let files: Vec<&str> = info.siblings.iter().map(|s| s.rfilename.as_str()).collect();
        for file in download_order(&files) {
            tracing::debug!(repo_id = %repo_id, file = %file, "Downloading file");

            let cached = repo
                .get(file)
                .await
                .map_err(|e| ConvertError::hub(repo_id, format!("failed to download {file}: {e}")))?;

            place_file(&cached, local_dir, file).await?;
        }

        tracing::info!(
            repo_id = %repo_id,
            file_count = info.siblings.len(),
            "Snapshot download complete"
        );

        Ok(())
    }
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_with_cache_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let hub = HfHub::new(Some(temp_dir.path().to_path_buf()), None);
        assert!(hub.is_ok());
    }

    #[test]
    fn test_default_cache_dir_shape() {
        let dir = default_cache_dir();
        assert!(dir.ends_with("hub"));
    }

    #[test]
    fn test_download_order_puts_marker_last() {
        let files = [
            "README.md",
            "openvino_model.xml",
            "openvino_model.bin",
            "tokenizer/openvino_tokenizer.xml",
        ];
        assert_eq!(
            download_order(&files),
            vec![
                "README.md",
                "openvino_model.bin",
                "tokenizer/openvino_tokenizer.xml",
                "openvino_model.xml",
            ]
        );
        assert_eq!(download_order(&["config.json"]), vec!["config.json"]);
    }

    #[tokio::test]
    async fn test_place_file_keeps_relative_paths() {
        let cache = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let cached = cache.path().join("blob");
        std::fs::write(&cached, "weights").unwrap();

        let local_dir = target.path().join("Qwen3-8B/INT4_compressed_weights");
        let dest = place_file(&cached, &local_dir, "tokenizer/openvino_tokenizer.bin")
            .await
            .unwrap();

        assert_eq!(dest, local_dir.join("tokenizer/openvino_tokenizer.bin"));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "weights");
        assert!(cached.exists());
    }

    #[tokio::test]
    async fn test_place_file_missing_source_is_io_error() {
        let target = tempfile::tempdir().unwrap();
        let err = place_file(
            &target.path().join("missing"),
            target.path(),
            "openvino_model.bin",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
        assert!(!target.path().join("openvino_model.bin").exists());
    }

    #[tokio::test]
    #[ignore = "requires network access and downloads a full model"]
    async fn test_snapshot_download_small_model() {
        let cache = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let hub = HfHub::new(Some(cache.path().to_path_buf()), None).unwrap();
        let local_dir = target.path().join("Qwen3-0.6B/INT4_compressed_weights");

        hub.snapshot_download("OpenVINO/Qwen3-0.6B-int4-ov", &local_dir)
            .await
            .unwrap();
        assert!(local_dir.join("openvino_model.xml").exists());
        assert!(local_dir.join("openvino_model.bin").exists());
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_preconverted_repo_exists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let hub = HfHub::new(Some(temp_dir.path().to_path_buf()), None).unwrap();
        assert!(hub.repo_exists("OpenVINO/Qwen3-8B-int4-ov").await.unwrap());
        assert!(
            !hub.repo_exists("OpenVINO/definitely-missing-model-int4-ov")
                .await
                .unwrap()
        );
    }
}
