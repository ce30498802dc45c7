//! Token Launcher Library
//!
//! Issues a new fungible SPL token in one atomic transaction: allocate and
//! initialize the mint, create the payer's holding account, mint the initial
//! supply, attach Token Metadata, and permanently revoke the mint authority.

pub mod config;
pub mod launcher;
pub mod rpc;
pub mod structured_logging;
pub mod test_utils;
pub mod tx_builder;
pub mod wallet;

// Re-export commonly used types
pub use config::{LaunchConfig, TokenParameters};
pub use launcher::{launch_token, launch_token_with_mint};
pub use rpc::{LaunchRpc, SolanaRpc};
pub use tx_builder::{LaunchError, LaunchReceipt};
pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
