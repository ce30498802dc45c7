//! Configuration module for the token launcher
//!
//! Loads the launch configuration from a TOML file, applies environment
//! overrides, and validates everything that can be checked before touching
//! the network. The result is an immutable [`LaunchConfig`] passed into the
//! pipeline by value.

use crate::tx_builder::{metadata, scale_supply, LaunchError};
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use std::path::Path;

/// Environment variable overriding `network.rpc_url`
pub const ENV_RPC_URL: &str = "TOKEN_LAUNCH_RPC_URL";
/// Environment variable overriding `payer.keypair_path`
pub const ENV_KEYPAIR: &str = "TOKEN_LAUNCH_KEYPAIR";

/// Main launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// RPC endpoint configuration
    pub network: NetworkConfig,

    /// Payer key material
    pub payer: PayerConfig,

    /// Token to issue
    pub token: TokenParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,

    /// Commitment used for the rent query and confirmation
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,
}

/// Where the payer keypair comes from. Exactly one field must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayerConfig {
    /// Path to a keypair file (JSON byte array or raw 64 bytes)
    #[serde(default)]
    pub keypair_path: Option<String>,

    /// Inline 64-byte secret key
    #[serde(default)]
    pub secret_key: Option<Vec<u8>>,
}

/// Parameters of the token to issue. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenParameters {
    /// Decimal precision of the mint
    pub decimals: u8,

    /// Initial supply in whole tokens, before scaling by `decimals`
    pub supply: u64,

    /// Display name (at most 32 bytes)
    pub name: String,

    /// Ticker symbol (at most 10 bytes)
    pub symbol: String,

    /// Off-chain metadata JSON location (at most 200 bytes)
    pub uri: String,

    /// Compute unit price in micro-lamports
    #[serde(default)]
    pub priority_fee: u64,
}

fn default_commitment() -> String { "confirmed".to_string() }
fn default_rpc_timeout() -> u64 { 60 }

impl TokenParameters {
    /// Check the parameters against the metadata program's limits and make
    /// sure the scaled supply fits.
    pub fn validate(&self) -> Result<(), LaunchError> {
        check_text("name", &self.name, metadata::MAX_NAME_LENGTH)?;
        check_text("symbol", &self.symbol, metadata::MAX_SYMBOL_LENGTH)?;

        if self.uri.len() > metadata::MAX_URI_LENGTH {
            return Err(LaunchError::config(format!(
                "token.uri is {} bytes, limit is {}",
                self.uri.len(),
                metadata::MAX_URI_LENGTH
            )));
        }

        scale_supply(self.supply, self.decimals)?;
        Ok(())
    }

    /// Supply in base units, `supply × 10^decimals`
    pub fn raw_supply(&self) -> Result<u64, LaunchError> {
        scale_supply(self.supply, self.decimals)
    }
}

fn check_text(field: &str, value: &str, limit: usize) -> Result<(), LaunchError> {
    if value.trim().is_empty() {
        return Err(LaunchError::config(format!("token.{} must not be empty", field)));
    }
    if value.len() > limit {
        return Err(LaunchError::config(format!(
            "token.{} is {} bytes, limit is {}",
            field,
            value.len(),
            limit
        )));
    }
    Ok(())
}

impl NetworkConfig {
    pub fn commitment_config(&self) -> Result<CommitmentConfig, LaunchError> {
        match self.commitment.as_str() {
            "processed" => Ok(CommitmentConfig::processed()),
            "confirmed" => Ok(CommitmentConfig::confirmed()),
            "finalized" => Ok(CommitmentConfig::finalized()),
            other => Err(LaunchError::config(format!(
                "unknown commitment '{}', expected processed, confirmed or finalized",
                other
            ))),
        }
    }
}

impl LaunchConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, LaunchError> {
        toml::from_str(content).map_err(|e| LaunchError::config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LaunchError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LaunchError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration with `.env` and environment variable overrides,
    /// then validate it.
    pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Self, LaunchError> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_file(path)?;
        config.apply_overrides(
            std::env::var(ENV_RPC_URL).ok(),
            std::env::var(ENV_KEYPAIR).ok(),
        );
        config.validate()?;
        Ok(config)
    }

    /// Replace the RPC URL and keypair path when an override is present.
    ///
    /// A keypair path override also clears any inline secret key.
    pub fn apply_overrides(&mut self, rpc_url: Option<String>, keypair_path: Option<String>) {
        if let Some(url) = rpc_url.filter(|u| !u.is_empty()) {
            self.network.rpc_url = url;
        }
        if let Some(path) = keypair_path.filter(|p| !p.is_empty()) {
            self.payer.keypair_path = Some(path);
            self.payer.secret_key = None;
        }
    }

    /// Validate everything that can be checked without the network
    pub fn validate(&self) -> Result<(), LaunchError> {
        if self.network.rpc_url.trim().is_empty() {
            return Err(LaunchError::config("network.rpc_url must not be empty"));
        }
        self.network.commitment_config()?;

        match (&self.payer.keypair_path, &self.payer.secret_key) {
            (Some(_), Some(_)) => {
                return Err(LaunchError::config(
                    "set only one of payer.keypair_path and payer.secret_key",
                ))
            }
            (None, None) => {
                return Err(LaunchError::config(
                    "payer.keypair_path or payer.secret_key is required",
                ))
            }
            _ => {}
        }

        self.token.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[network]
rpc_url = "https://api.devnet.solana.com"

[payer]
keypair_path = "/tmp/payer.json"

[token]
decimals = 9
supply = 1000000
name = "Test"
symbol = "TST"
uri = "https://example.com/metadata.json"
priority_fee = 1000
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = LaunchConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.network.commitment, "confirmed");
        assert_eq!(config.network.timeout_secs, 60);
        assert_eq!(config.token.decimals, 9);
        assert_eq!(config.token.supply, 1_000_000);
        assert_eq!(config.token.priority_fee, 1000);
        assert_eq!(config.token.raw_supply().unwrap(), 1_000_000_000_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_supply_is_configuration_error() {
        let content = SAMPLE.replace("supply = 1000000", "supply = -5");
        assert!(matches!(
            LaunchConfig::from_toml_str(&content),
            Err(LaunchError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_field_is_configuration_error() {
        let content = SAMPLE.replace("symbol = \"TST\"\n", "");
        assert!(matches!(
            LaunchConfig::from_toml_str(&content),
            Err(LaunchError::Configuration(_))
        ));
    }

    #[test]
    fn test_name_too_long_rejected() {
        let mut config = LaunchConfig::from_toml_str(SAMPLE).unwrap();
        config.token.name = "x".repeat(33);
        assert!(matches!(config.validate(), Err(LaunchError::Configuration(_))));

        config.token.name = "x".repeat(32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_symbol_and_long_uri_rejected() {
        let mut config = LaunchConfig::from_toml_str(SAMPLE).unwrap();
        config.token.symbol = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = LaunchConfig::from_toml_str(SAMPLE).unwrap();
        config.token.uri = "u".repeat(201);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overflowing_supply_rejected() {
        let mut config = LaunchConfig::from_toml_str(SAMPLE).unwrap();
        config.token.supply = u64::MAX / 10;
        assert!(matches!(
            config.validate(),
            Err(LaunchError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn test_payer_source_must_be_unique() {
        let mut config = LaunchConfig::from_toml_str(SAMPLE).unwrap();
        config.payer.secret_key = Some(vec![1; 64]);
        assert!(config.validate().is_err());

        config.payer.keypair_path = None;
        assert!(config.validate().is_ok());

        config.payer.secret_key = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_commitment_rejected() {
        let mut config = LaunchConfig::from_toml_str(SAMPLE).unwrap();
        config.network.commitment = "eventually".to_string();
        assert!(config.validate().is_err());

        config.network.commitment = "finalized".to_string();
        assert_eq!(
            config.network.commitment_config().unwrap(),
            CommitmentConfig::finalized()
        );
    }

    #[test]
    fn test_overrides() {
        let mut config = LaunchConfig::from_toml_str(SAMPLE).unwrap();
        config.payer.keypair_path = None;
        config.payer.secret_key = Some(vec![1; 64]);

        config.apply_overrides(Some(String::new()), None);
        assert_eq!(config.network.rpc_url, "https://api.devnet.solana.com");

        config.apply_overrides(
            Some("http://localhost:8899".to_string()),
            Some("/keys/payer.json".to_string()),
        );
        assert_eq!(config.network.rpc_url, "http://localhost:8899");
        assert_eq!(config.payer.keypair_path.as_deref(), Some("/keys/payer.json"));
        assert!(config.payer.secret_key.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = LaunchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.token.symbol, "TST");

        assert!(matches!(
            LaunchConfig::from_file("/nonexistent/launch.toml"),
            Err(LaunchError::Configuration(_))
        ));
    }
}
