//! Inference collaborator boundary.
//!
//! The [`Inference`] trait decouples skill execution from the model backend
//! (currently `codex exec`). Tests use scripted implementations that return
//! predetermined payloads without spawning processes.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::io::config::InferenceConfig;
use crate::io::process::run_command_with_timeout;

/// Parameters for one inference call.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub prompt: String,
    /// JSON Schema the structured result must conform to.
    pub output_schema: Arc<Value>,
    /// Maximum time to wait for the backend.
    pub timeout: Duration,
}

/// Abstraction over inference backends.
///
/// Implementations block until a result or a failure is available; the run
/// loop never issues the next decision before this returns.
pub trait Inference {
    fn invoke(&self, request: &InferenceRequest) -> Result<Value>;
}

impl<T: Inference + ?Sized> Inference for &T {
    fn invoke(&self, request: &InferenceRequest) -> Result<Value> {
        (**self).invoke(request)
    }
}

impl<T: Inference + ?Sized> Inference for Box<T> {
    fn invoke(&self, request: &InferenceRequest) -> Result<Value> {
        (**self).invoke(request)
    }
}

/// Backend that spawns `codex exec` with an output schema.
#[derive(Debug, Clone)]
pub struct CodexInference {
    command: Vec<String>,
    workdir: PathBuf,
    output_limit_bytes: usize,
}

impl CodexInference {
    pub fn new(config: &InferenceConfig, workdir: impl Into<PathBuf>) -> Self {
        Self {
            command: config.command.clone(),
            workdir: workdir.into(),
            output_limit_bytes: config.output_limit_bytes,
        }
    }
}

impl Inference for CodexInference {
    #[instrument(skip_all, fields(timeout_secs = request.timeout.as_secs()))]
    fn invoke(&self, request: &InferenceRequest) -> Result<Value> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("inference command is empty"))?;

        let scratch = tempfile::tempdir().context("create inference scratch dir")?;
        let schema_path = scratch.path().join("output.schema.json");
        let output_path = scratch.path().join("output.json");
        let schema = serde_json::to_string_pretty(request.output_schema.as_ref())
            .context("serialize output schema")?;
        fs::write(&schema_path, schema)
            .with_context(|| format!("write output schema {}", schema_path.display()))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .arg("--output-schema")
            .arg(&schema_path)
            .arg("--output-last-message")
            .arg(&output_path)
            .arg("-")
            .current_dir(&self.workdir);

        info!(program = %program, workdir = %self.workdir.display(), "starting inference");
        let output = run_command_with_timeout(
            cmd,
            Some(request.prompt.as_bytes()),
            request.timeout,
            self.output_limit_bytes,
        )
        .with_context(|| format!("run {program}"))?;

        if output.timed_out {
            warn!(timeout_secs = request.timeout.as_secs(), "inference timed out");
            bail!("{program} timed out after {:?}", request.timeout);
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "inference failed");
            bail!(
                "{program} failed with status {:?}: {}",
                output.status.code(),
                output.stderr_tail()
            );
        }

        let contents = fs::read_to_string(&output_path)
            .with_context(|| format!("read inference output {}", output_path.display()))?;
        let value: Value = serde_json::from_str(contents.trim())
            .with_context(|| format!("parse inference output {}", output_path.display()))?;
        debug!("inference completed successfully");
        Ok(value)
    }
}
