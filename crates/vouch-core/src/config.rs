//! Client configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a Vouch issuer or verifier process.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VouchConfig {
    /// Ledger collaborator settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Root-of-trust settings.
    #[serde(default)]
    pub trust: TrustConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Endpoint of the ledger node or gateway.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Address of the issuer contract claims are recorded in.
    #[serde(default)]
    pub contract_address: Option<String>,
    /// Gas limit applied to writes that do not set one.
    #[serde(default)]
    pub default_gas: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrustConfig {
    /// Script hash of the root-of-trust registry consulted by verifiers.
    #[serde(default)]
    pub root_of_trust: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8545".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            contract_address: None,
            default_gas: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl VouchConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields
    /// or a missing file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: VouchConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}
