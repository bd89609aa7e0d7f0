//! Extractor configuration — gateway and pipeline tuning.
//!
//! Loaded from a JSON file when present, otherwise defaults. A missing or
//! corrupted file never fails construction; the defaults are usable as-is
//! except for the API key, which the gateway reports at call time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Settings for the chat-completion model boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Streaming delivery (incremental deltas) vs a single response body.
    #[serde(default = "default_true")]
    pub stream: bool,
    /// Minimum interval between call starts, enforced under the timing gate.
    #[serde(default = "default_min_call_interval_ms")]
    pub min_call_interval_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Linear backoff base: sleep `base * attempt` after a failed attempt.
    #[serde(default = "default_backoff_base_ms")]
    pub retry_backoff_base_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            stream: true,
            min_call_interval_ms: constants::MIN_CALL_INTERVAL_MS,
            max_retries: constants::MAX_RETRIES,
            retry_backoff_base_ms: constants::RETRY_BACKOFF_BASE_MS,
            timeout_secs: constants::HTTP_TIMEOUT_SECS,
        }
    }
}

/// Settings for the extraction pipeline itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
    /// Politeness delay between chunks, independent of the rate limiter.
    #[serde(default = "default_inter_chunk_delay_ms")]
    pub inter_chunk_delay_ms: u64,
    #[serde(default = "default_ocr_language")]
    pub ocr_language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: constants::DEFAULT_MAX_CHUNK_SIZE,
            inter_chunk_delay_ms: constants::INTER_CHUNK_DELAY_MS,
            ocr_language: constants::DEFAULT_OCR_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl ExtractorConfig {
    /// Load from a JSON file. Absent or unreadable file yields defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Corrupt config, using defaults");
                Self::default()
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable config, using defaults");
                Self::default()
            }
        }
    }
}

fn default_base_url() -> String {
    "https://api-inference.modelscope.cn/v1".to_string()
}

fn default_model() -> String {
    "Qwen/Qwen2.5-Coder-32B-Instruct".to_string()
}

fn default_true() -> bool {
    true
}

fn default_min_call_interval_ms() -> u64 {
    constants::MIN_CALL_INTERVAL_MS
}

fn default_max_retries() -> u32 {
    constants::MAX_RETRIES
}

fn default_backoff_base_ms() -> u64 {
    constants::RETRY_BACKOFF_BASE_MS
}

fn default_timeout_secs() -> u64 {
    constants::HTTP_TIMEOUT_SECS
}

fn default_max_chunk_size() -> usize {
    constants::DEFAULT_MAX_CHUNK_SIZE
}

fn default_inter_chunk_delay_ms() -> u64 {
    constants::INTER_CHUNK_DELAY_MS
}

fn default_ocr_language() -> String {
    constants::DEFAULT_OCR_LANGUAGE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_absent() {
        let cfg = ExtractorConfig::load(Path::new("/nonexistent/config.json"));
        assert_eq!(cfg.gateway.max_retries, 3);
        assert_eq!(cfg.gateway.min_call_interval_ms, 2_000);
        assert_eq!(cfg.pipeline.max_chunk_size, 800);
        assert!(cfg.gateway.stream);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"gateway":{"api_key":"sk-test","stream":false}}"#).unwrap();

        let cfg = ExtractorConfig::load(&path);
        assert_eq!(cfg.gateway.api_key, "sk-test");
        assert!(!cfg.gateway.stream);
        assert_eq!(cfg.gateway.max_retries, 3, "Missing fields should default");
        assert_eq!(cfg.pipeline.max_chunk_size, 800);
    }

    #[test]
    fn test_corrupt_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let cfg = ExtractorConfig::load(&path);
        assert_eq!(cfg.gateway.max_retries, 3);
    }
}
