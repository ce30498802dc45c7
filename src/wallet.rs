//! Payer keypair loading and keypair generation

use crate::config::PayerConfig;
use crate::tx_builder::LaunchError;
use solana_sdk::signature::{Keypair, Signer};
use std::path::Path;

/// Build a keypair from 64 secret-key bytes, rejecting the all-zero key.
pub fn keypair_from_bytes(bytes: &[u8]) -> Result<Keypair, LaunchError> {
    if bytes.len() != 64 {
        return Err(LaunchError::config(format!(
            "Invalid keypair length: expected 64 bytes, got {}",
            bytes.len()
        )));
    }
    if bytes.iter().all(|&b| b == 0) {
        return Err(LaunchError::config("Invalid keypair: all-zero key rejected"));
    }
    Keypair::try_from(bytes).map_err(|e| LaunchError::config(format!("Invalid keypair bytes: {}", e)))
}

/// Load a keypair file, either raw 64 bytes or a JSON byte array.
pub fn keypair_from_file(path: impl AsRef<Path>) -> Result<Keypair, LaunchError> {
    let path = path.as_ref();
    let keypair_bytes = std::fs::read(path).map_err(|e| {
        LaunchError::config(format!("Failed to read keypair file {}: {}", path.display(), e))
    })?;

    if keypair_bytes.len() == 64 {
        return keypair_from_bytes(&keypair_bytes);
    }

    let json: Vec<u8> = serde_json::from_slice(&keypair_bytes)
        .map_err(|e| LaunchError::config(format!("Failed to parse keypair JSON: {}", e)))?;
    keypair_from_bytes(&json)
}

/// Load the payer from whichever source the configuration names.
pub fn load_payer(config: &PayerConfig) -> Result<Keypair, LaunchError> {
    match (&config.keypair_path, &config.secret_key) {
        (Some(path), None) => keypair_from_file(expand_home(path)),
        (None, Some(bytes)) => keypair_from_bytes(bytes),
        _ => Err(LaunchError::config(
            "exactly one of payer.keypair_path and payer.secret_key must be set",
        )),
    }
}

fn expand_home(path: &str) -> std::path::PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => Path::new(&home).join(rest),
        _ => Path::new(path).to_path_buf(),
    }
}

/// A freshly generated keypair in printable form
#[derive(Debug)]
pub struct GeneratedKeypair {
    pub keypair: Keypair,
}

impl GeneratedKeypair {
    pub fn generate() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    /// Base58 public key
    pub fn public_key(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    /// Secret key as a JSON byte array, the format keypair files use
    pub fn secret_key_json(&self) -> Result<String, LaunchError> {
        serde_json::to_string(&self.keypair.to_bytes().to_vec())
            .map_err(|e| LaunchError::config(format!("Failed to encode keypair: {}", e)))
    }

    /// Write the keypair file, refusing to overwrite an existing one.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), LaunchError> {
        let path = path.as_ref();
        if path.exists() {
            return Err(LaunchError::config(format!(
                "refusing to overwrite existing file {}",
                path.display()
            )));
        }
        let json = self.secret_key_json()?;
        std::fs::write(path, json).map_err(|e| {
            LaunchError::config(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_all_zero_and_short_keys() {
        assert!(keypair_from_bytes(&[0u8; 64]).is_err());
        assert!(keypair_from_bytes(&[1u8; 32]).is_err());
    }

    #[test]
    fn test_inline_secret_key_round_trips_pubkey() {
        let original = Keypair::new();
        let config = PayerConfig {
            keypair_path: None,
            secret_key: Some(original.to_bytes().to_vec()),
        };
        let loaded = load_payer(&config).unwrap();
        assert_eq!(loaded.pubkey(), original.pubkey());
    }

    #[test]
    fn test_generated_keypair_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");

        let generated = GeneratedKeypair::generate();
        generated.write_to(&path).unwrap();

        let loaded = keypair_from_file(&path).unwrap();
        assert_eq!(loaded.pubkey().to_string(), generated.public_key());

        // Second write must not clobber the file
        assert!(generated.write_to(&path).is_err());
    }

    #[test]
    fn test_secret_key_json_is_a_loadable_keypair() {
        let generated = GeneratedKeypair::generate();
        let json = generated.secret_key_json().unwrap();

        let bytes: Vec<u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(bytes.len(), 64);
        assert_eq!(
            keypair_from_bytes(&bytes).unwrap().pubkey().to_string(),
            generated.public_key()
        );
    }

    #[test]
    fn test_raw_64_byte_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.key");
        let original = Keypair::new();
        std::fs::write(&path, original.to_bytes()).unwrap();

        assert_eq!(keypair_from_file(&path).unwrap().pubkey(), original.pubkey());
    }

    #[test]
    fn test_load_payer_requires_single_source() {
        assert!(load_payer(&PayerConfig::default()).is_err());
    }
}
