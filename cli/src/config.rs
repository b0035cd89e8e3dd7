//! CLI configuration with TOML file support.

use std::path::{Path, PathBuf};

use idproof_flow::{ChallengePolicy, FlowConfig};
use idproof_types::{NetworkId, DEFAULT_CHALLENGE_PREFIX};
use idproof_utils::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for the `idproof` binary.
///
/// Loaded from a TOML file via [`IdproofConfig::from_toml_file`]; CLI flags
/// and `IDPROOF_*` environment variables override individual fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdproofConfig {
    /// Text placed before the timestamp in the challenge.
    #[serde(default = "default_challenge_prefix")]
    pub challenge_prefix: String,

    /// Whether reset keeps or reissues the challenge.
    #[serde(default)]
    pub challenge_policy: ChallengePolicy,

    /// Network name the local wallet reports.
    #[serde(default = "default_network_name")]
    pub network_name: String,

    /// Chain id the local wallet reports.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Hex key file for the local wallet. A throwaway key is used when absent.
    #[serde(default)]
    pub key_file: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_challenge_prefix() -> String {
    DEFAULT_CHALLENGE_PREFIX.to_string()
}

fn default_network_name() -> String {
    NetworkId::mainnet().name
}

fn default_chain_id() -> u64 {
    NetworkId::mainnet().chain_id
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl IdproofConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn network(&self) -> NetworkId {
        NetworkId::new(self.network_name.clone(), self.chain_id)
    }

    pub fn flow_config(&self) -> FlowConfig {
        FlowConfig {
            challenge_prefix: self.challenge_prefix.clone(),
            challenge_policy: self.challenge_policy,
        }
    }
}

impl Default for IdproofConfig {
    fn default() -> Self {
        Self {
            challenge_prefix: default_challenge_prefix(),
            challenge_policy: ChallengePolicy::default(),
            network_name: default_network_name(),
            chain_id: default_chain_id(),
            key_file: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
