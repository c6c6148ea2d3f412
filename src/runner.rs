//! Process runner abstraction for the external converter

use crate::error::{ConvertError, ConvertResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Outcome of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a command to completion
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `argv[0]` with the remaining arguments and wait for it to exit
    async fn run(&self, argv: &[String]) -> ConvertResult<ProcessOutput>;
}

/// Production runner using tokio::process
///
/// Stdout and stderr are captured. The converter prints progress bars to
/// stderr; they are replayed at debug level once the process exits.
#[derive(Debug, Default, Clone)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, argv: &[String]) -> ConvertResult<ProcessOutput> {
        let Some((program, args)) = argv.split_first() else {
            return Err(ConvertError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv"),
            });
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(program = %program, args = ?args, "Spawning process");

        let output = cmd.output().await.map_err(|source| ConvertError::Spawn {
            program: program.clone(),
            source,
        })?;

        let result = ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        for line in result.stderr.lines().filter(|l| !l.trim().is_empty()) {
            tracing::debug!(program = %program, "{}", line);
        }

        tracing::info!(
            program = %program,
            exit_code = ?result.exit_code,
            "Process exited"
        );

        Ok(result)
    }
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_argv_is_spawn_error() {
        let runner = SystemProcessRunner::new();
        let err = runner.run(&[]).await.unwrap_err();
        assert!(matches!(err, ConvertError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let runner = SystemProcessRunner::new();
        let argv = vec!["ov-convert-definitely-not-a-binary".to_string()];
        let err = runner.run(&argv).await.unwrap_err();
        assert!(matches!(err, ConvertError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_exit_code_and_output() {
        let runner = SystemProcessRunner::new();
        let argv: Vec<String> = ["sh", "-c", "echo out; echo err >&2; exit 3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let output = runner.run(&argv).await.unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }
}
