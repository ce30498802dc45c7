//! Structured logging for launch runs

use crate::tx_builder::LaunchError;
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use uuid::Uuid;

/// Structured logger for one launch run
///
/// Every event carries the run's correlation id so the lines of one run can
/// be picked out of a shared log.
#[derive(Debug, Clone)]
pub struct LaunchLogger {
    correlation_id: String,
}

impl LaunchLogger {
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_correlation_id(correlation_id: String) -> Self {
        Self { correlation_id }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn log_run_started(&self, payer: &Pubkey, mint: &Pubkey, symbol: &str) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            payer = %payer,
            mint = %mint,
            symbol = %symbol,
            "Starting token launch"
        );
    }

    pub fn log_rent_fetched(&self, lamports: u64) {
        tracing::debug!(
            correlation_id = %self.correlation_id,
            lamports = %lamports,
            "Fetched rent-exemption minimum for mint account"
        );
    }

    pub fn log_addresses_derived(&self, holding: &Pubkey, metadata: &Pubkey) {
        tracing::debug!(
            correlation_id = %self.correlation_id,
            holding = %holding,
            metadata = %metadata,
            "Derived launch addresses"
        );
    }

    pub fn log_transaction_assembled(&self, instruction_count: usize, raw_supply: u64) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            instructions = %instruction_count,
            raw_supply = %raw_supply,
            "Launch transaction assembled"
        );
    }

    pub fn log_confirmed(&self, mint: &Pubkey, signature: &Signature, latency_ms: u64) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            mint = %mint,
            signature = %signature,
            latency_ms = %latency_ms,
            "Launch transaction confirmed"
        );
    }

    pub fn log_failure(&self, error: &LaunchError, latency_ms: u64) {
        tracing::error!(
            correlation_id = %self.correlation_id,
            category = %error.category(),
            instruction_index = ?error.instruction_index(),
            retryable = %error.is_retryable(),
            error = %error,
            latency_ms = %latency_ms,
            "Launch failed"
        );
    }
}

impl Default for LaunchLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_ids_are_unique() {
        assert_ne!(
            LaunchLogger::new().correlation_id(),
            LaunchLogger::new().correlation_id()
        );
        assert_eq!(
            LaunchLogger::with_correlation_id("run-1".to_string()).correlation_id(),
            "run-1"
        );
    }
}
