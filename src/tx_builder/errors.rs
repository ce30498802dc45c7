//! Error types for the token launch pipeline
//!
//! Every stage of the pipeline reports failures through [`LaunchError`]:
//! - Configuration and validation problems detected before any network call
//! - Address derivation and instruction construction
//! - Assembly-time ordering checks
//! - Signing, simulation, network transport and on-ledger execution
//!
//! No error is recovered locally. The whole run aborts and the error is
//! surfaced to the operator.

use thiserror::Error;

/// Error type for all launch pipeline operations
#[derive(Error, Debug)]
pub enum LaunchError {
    /// Malformed or missing launch parameters
    ///
    /// Always detected before the first network round-trip.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No bump in the searched range produced an off-curve address
    #[error("Address derivation failed (program={program}): {reason}")]
    AddressDerivation {
        /// Program that would own the derived address
        program: String,
        /// Detailed reason for the failure
        reason: String,
    },

    /// `supply × 10^decimals` does not fit the on-ledger amount type
    #[error("Scaled supply overflows u64 (supply={supply}, decimals={decimals})")]
    AmountOverflow {
        /// Unscaled supply
        supply: u64,
        /// Decimal precision
        decimals: u8,
    },

    /// Failed to build an instruction for a specific program
    #[error("Instruction build error (program={program}): {reason}")]
    InstructionBuild {
        /// The program ID that failed to build an instruction
        program: String,
        /// Detailed reason for the failure
        reason: String,
    },

    /// The assembled instruction list violates the launch ordering
    #[error("Invalid instruction order: {0}")]
    InvalidInstructionOrder(String),

    /// Failed to sign the transaction
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The network rejected the transaction before execution
    ///
    /// `index` is the position of the failing instruction when the network
    /// reports one.
    #[error("Simulation failed{}: {reason}", fmt_index(.index))]
    Simulation {
        /// Failing instruction position, if known
        index: Option<usize>,
        /// Network-provided reason
        reason: String,
    },

    /// Connectivity or confirmation timeout talking to the network
    #[error("Network error: {0}")]
    Network(String),

    /// The transaction landed but failed during execution
    #[error("Execution failed{}: {reason}", fmt_index(.index))]
    Execution {
        /// Failing instruction position, if known
        index: Option<usize>,
        /// Network-provided reason
        reason: String,
    },

    /// Any other RPC client error
    #[error("RPC error: {0}")]
    Rpc(String),
}

fn fmt_index(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" at instruction {}", i),
        None => String::new(),
    }
}

impl LaunchError {
    /// Check whether re-running the launch could succeed
    ///
    /// The pipeline itself never retries. This only informs the operator.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config",
            Self::AddressDerivation { .. } => "derivation",
            Self::AmountOverflow { .. } => "amount",
            Self::InstructionBuild { .. } => "instruction",
            Self::InvalidInstructionOrder(_) => "validation",
            Self::Signing(_) => "signing",
            Self::Simulation { .. } => "simulation",
            Self::Network(_) => "network",
            Self::Execution { .. } => "execution",
            Self::Rpc(_) => "rpc",
        }
    }

    /// Instruction position reported by the network, if any
    pub fn instruction_index(&self) -> Option<usize> {
        match self {
            Self::Simulation { index, .. } | Self::Execution { index, .. } => *index,
            _ => None,
        }
    }
}

// Convenience constructors
impl LaunchError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Configuration(reason.into())
    }

    pub fn instruction_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstructionBuild {
            program: program.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidInstructionOrder(reason.into())
    }

    pub fn simulation_failed(index: Option<usize>, reason: impl Into<String>) -> Self {
        Self::Simulation {
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LaunchError::Configuration("supply missing".to_string());
        assert_eq!(err.to_string(), "Configuration error: supply missing");

        let err = LaunchError::InstructionBuild {
            program: "spl_token".to_string(),
            reason: "invalid accounts".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Instruction build error (program=spl_token): invalid accounts"
        );

        let err = LaunchError::AmountOverflow {
            supply: u64::MAX,
            decimals: 9,
        };
        assert!(err.to_string().contains("decimals=9"));
    }

    #[test]
    fn test_simulation_display_with_and_without_index() {
        let err = LaunchError::simulation_failed(Some(3), "account already in use");
        assert_eq!(
            err.to_string(),
            "Simulation failed at instruction 3: account already in use"
        );

        let err = LaunchError::simulation_failed(None, "insufficient funds");
        assert_eq!(err.to_string(), "Simulation failed: insufficient funds");
    }

    #[test]
    fn test_error_retryability() {
        assert!(LaunchError::Network("timeout".to_string()).is_retryable());

        assert!(!LaunchError::Configuration("test".to_string()).is_retryable());
        assert!(!LaunchError::simulation_failed(Some(1), "test").is_retryable());
        assert!(!LaunchError::Signing("test".to_string()).is_retryable());
        assert!(!LaunchError::Rpc("test".to_string()).is_retryable());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(LaunchError::config("x").category(), "config");
        assert_eq!(LaunchError::invalid_order("x").category(), "validation");
        assert_eq!(
            LaunchError::Execution {
                index: None,
                reason: "x".to_string()
            }
            .category(),
            "execution"
        );
    }

    #[test]
    fn test_instruction_index() {
        assert_eq!(
            LaunchError::simulation_failed(Some(4), "x").instruction_index(),
            Some(4)
        );
        assert_eq!(LaunchError::Network("x".to_string()).instruction_index(), None);
    }
}
