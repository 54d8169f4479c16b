//! Agent configuration stored as TOML.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::retry::RetryPolicy;

/// Agent configuration (TOML).
///
/// Missing fields default to the values below, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum loop iterations before the run stops with a warning.
    pub step_limit: u32,

    pub inference: InferenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InferenceConfig {
    /// Backend command; the output schema, output path and `-` are appended.
    pub command: Vec<String>,

    /// Per-call wall-clock budget in seconds.
    pub timeout_secs: u64,

    /// Attempts per skill call, including the first.
    pub max_attempts: u32,

    pub initial_backoff_ms: u64,

    pub max_backoff_ms: u64,

    /// Truncate captured backend stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            command: ["codex", "exec", "--sandbox", "read-only", "--skip-git-repo-check"]
                .iter()
                .map(|part| part.to_string())
                .collect(),
            timeout_secs: 5 * 60,
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            output_limit_bytes: 100_000,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            step_limit: 100,
            inference: InferenceConfig::default(),
        }
    }
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.step_limit == 0 {
            return Err(anyhow!("step_limit must be > 0"));
        }
        let inference = &self.inference;
        if inference.command.is_empty() || inference.command[0].trim().is_empty() {
            return Err(anyhow!("inference.command must be a non-empty array"));
        }
        if inference.timeout_secs == 0 {
            return Err(anyhow!("inference.timeout_secs must be > 0"));
        }
        if inference.max_attempts == 0 {
            return Err(anyhow!("inference.max_attempts must be > 0"));
        }
        if inference.initial_backoff_ms > inference.max_backoff_ms {
            return Err(anyhow!(
                "inference.initial_backoff_ms must not exceed inference.max_backoff_ms"
            ));
        }
        if inference.output_limit_bytes == 0 {
            return Err(anyhow!("inference.output_limit_bytes must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AgentConfig::default()`.
pub fn load_config(path: &Path) -> Result<AgentConfig> {
    if !path.exists() {
        let cfg = AgentConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AgentConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &AgentConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, buf)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, AgentConfig::default());
        assert_eq!(cfg.step_limit, 100);
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("agent.toml");
        let cfg = AgentConfig {
            step_limit: 7,
            ..AgentConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        assert_eq!(load_config(&path).expect("load"), cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("agent.toml");
        fs::write(&path, "step_limit = 5\n\n[inference]\ntimeout_secs = 30\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.step_limit, 5);
        assert_eq!(cfg.inference.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.inference.max_attempts, 3);
    }

    #[test]
    fn zero_step_limit_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("agent.toml");
        fs::write(&path, "step_limit = 0\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("step_limit must be > 0"));
    }

    #[test]
    fn retry_policy_mirrors_inference_settings() {
        let policy = InferenceConfig::default().retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_backoff, Duration::from_millis(500));
        assert_eq!(policy.max_backoff, Duration::from_secs(8));
    }
}
