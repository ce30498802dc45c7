//! Per-run launch context
//!
//! Holds the public identities of the run (payer and freshly generated
//! mint) together with the two addresses derived from them. Computed once at
//! the start of a run and never cached across runs.

use crate::tx_builder::addresses::{self, DerivedAddress};
use crate::tx_builder::errors::LaunchError;
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchContext {
    /// Funds and authorizes every step, and holds the initial supply
    pub payer: Pubkey,

    /// The new token's permanent identity
    pub mint: Pubkey,

    /// Payer's associated token account for `mint`
    pub holding: DerivedAddress,

    /// Metadata record for `mint`
    pub metadata: DerivedAddress,
}

impl LaunchContext {
    /// Derive the holding and metadata addresses for `(payer, mint)`.
    pub fn derive(payer: Pubkey, mint: Pubkey) -> Result<Self, LaunchError> {
        if payer == mint {
            return Err(LaunchError::config("payer and mint must be distinct keys"));
        }

        Ok(Self {
            payer,
            mint,
            holding: addresses::holding_account(&payer, &mint)?,
            metadata: addresses::metadata_account(&mint)?,
        })
    }
}
