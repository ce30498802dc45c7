//! Network access for the launch pipeline
//!
//! [`LaunchRpc`] is the only boundary between the pipeline and the ledger.
//! The production implementation wraps the nonblocking `RpcClient`; tests use
//! an in-memory ledger.

use crate::tx_builder::LaunchError;
use async_trait::async_trait;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_request::{RpcError, RpcResponseErrorData},
};
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, signature::Signature,
    transaction::Transaction, transaction::TransactionError,
};
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait LaunchRpc: Send + Sync {
    /// Minimum balance an account of `data_len` bytes needs to be rent exempt
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, LaunchError>;

    async fn latest_blockhash(&self) -> Result<Hash, LaunchError>;

    /// Send once and block until the network reports a terminal status.
    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, LaunchError>;
}

/// `LaunchRpc` over a Solana JSON-RPC endpoint
pub struct SolanaRpc {
    client: RpcClient,
}

impl SolanaRpc {
    pub fn new(url: String, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url, commitment),
        }
    }

    pub fn with_timeout(url: String, commitment: CommitmentConfig, timeout: Duration) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(url, timeout, commitment),
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

#[async_trait]
impl LaunchRpc for SolanaRpc {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, LaunchError> {
        self.client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await
            .map_err(classify_client_error)
    }

    async fn latest_blockhash(&self) -> Result<Hash, LaunchError> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(classify_client_error)
    }

    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, LaunchError> {
        debug!(signature = %tx.signatures[0], "sending launch transaction");
        self.client
            .send_and_confirm_transaction(tx)
            .await
            .map_err(classify_client_error)
    }
}

/// Position of the failing instruction, when the network names one
pub fn failing_instruction_index(err: &TransactionError) -> Option<usize> {
    match err {
        TransactionError::InstructionError(index, _) => Some(*index as usize),
        _ => None,
    }
}

/// Map an RPC client error onto the launch error taxonomy.
///
/// - preflight rejection → `Simulation`
/// - transaction confirmed as failed → `Execution`
/// - transport problems and confirmation timeouts → `Network`
pub fn classify_client_error(err: ClientError) -> LaunchError {
    let tx_error = err.get_transaction_error();

    match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            data: RpcResponseErrorData::SendTransactionPreflightFailure(_),
            message,
            ..
        }) => LaunchError::Simulation {
            index: tx_error.as_ref().and_then(failing_instruction_index),
            reason: tx_error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| message.clone()),
        },
        ClientErrorKind::TransactionError(e) => LaunchError::Execution {
            index: failing_instruction_index(e),
            reason: e.to_string(),
        },
        ClientErrorKind::Io(e) => LaunchError::Network(e.to_string()),
        ClientErrorKind::Reqwest(e) => LaunchError::Network(e.to_string()),
        // Raised by send_and_confirm when the signature is never observed
        ClientErrorKind::RpcError(RpcError::ForUser(msg)) => LaunchError::Network(msg.clone()),
        _ => LaunchError::Rpc(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_client::rpc_response::RpcSimulateTransactionResult;
    use solana_sdk::instruction::InstructionError;

    fn preflight_failure(err: serde_json::Value) -> ClientError {
        let simulation: RpcSimulateTransactionResult = serde_json::from_value(serde_json::json!({
            "err": err,
            "logs": ["Program log: Error: account already in use"],
        }))
        .unwrap();
        ClientError::from(RpcError::RpcResponseError {
            code: -32002,
            message: "Transaction simulation failed".to_string(),
            data: RpcResponseErrorData::SendTransactionPreflightFailure(simulation),
        })
    }

    #[test]
    fn test_classify_preflight_rejection_with_failing_instruction() {
        let err = preflight_failure(serde_json::json!({
            "InstructionError": [3, "AccountAlreadyInitialized"]
        }));
        match classify_client_error(err) {
            LaunchError::Simulation { index, reason } => {
                assert_eq!(index, Some(3));
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_classify_preflight_rejection_without_error_detail() {
        let classified = classify_client_error(preflight_failure(serde_json::Value::Null));
        match &classified {
            LaunchError::Simulation { index, reason } => {
                assert_eq!(*index, None);
                assert_eq!(reason, "Transaction simulation failed");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!classified.is_retryable());
    }

    #[test]
    fn test_failing_instruction_index() {
        let err = TransactionError::InstructionError(3, InstructionError::AccountAlreadyInitialized);
        assert_eq!(failing_instruction_index(&err), Some(3));
        assert_eq!(
            failing_instruction_index(&TransactionError::InsufficientFundsForFee),
            None
        );
    }

    #[test]
    fn test_classify_execution_failure() {
        let err = ClientError::from(TransactionError::InstructionError(
            5,
            InstructionError::Custom(0),
        ));
        match classify_client_error(err) {
            LaunchError::Execution { index, .. } => assert_eq!(index, Some(5)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_classify_confirmation_timeout_as_network() {
        let err = ClientError::from(RpcError::ForUser(
            "unable to confirm transaction".to_string(),
        ));
        let classified = classify_client_error(err);
        assert!(matches!(classified, LaunchError::Network(_)));
        assert!(classified.is_retryable());
    }

    #[test]
    fn test_classify_io_as_network() {
        let err = ClientError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert!(matches!(classify_client_error(err), LaunchError::Network(_)));
    }
}
