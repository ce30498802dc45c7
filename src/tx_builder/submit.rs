//! Signing and submission of the assembled launch
//!
//! The submitter is the pipeline's only suspension point besides the rent
//! query: fetch a blockhash, sign with every required key, send once and wait
//! for a terminal status. There is no retry.

use crate::rpc::LaunchRpc;
use crate::tx_builder::errors::LaunchError;
use crate::tx_builder::output::AssembledLaunch;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use tracing::{debug, info};

/// Result of a confirmed launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchReceipt {
    /// Confirmation signature of the launch transaction
    pub signature: Signature,
    /// The new token's address
    pub mint: Pubkey,
}

pub struct Submitter<'a, R: LaunchRpc + ?Sized> {
    rpc: &'a R,
}

impl<'a, R: LaunchRpc + ?Sized> Submitter<'a, R> {
    pub fn new(rpc: &'a R) -> Self {
        Self { rpc }
    }

    /// Sign `assembled` with `payer` and `mint`, send it and wait for confirmation.
    ///
    /// Takes ownership of the mint keypair; its private half is dropped once
    /// the transaction is signed.
    pub async fn submit(
        &self,
        assembled: &AssembledLaunch,
        payer: &Keypair,
        mint: Keypair,
    ) -> Result<LaunchReceipt, LaunchError> {
        let mint_pubkey = mint.pubkey();
        let required = assembled.required_signers();
        for key in [payer.pubkey(), mint_pubkey] {
            if !required.contains(&key) {
                return Err(LaunchError::Signing(format!(
                    "{} is not a required signer of the launch transaction",
                    key
                )));
            }
        }

        let blockhash = self.rpc.latest_blockhash().await?;
        debug!(%blockhash, "fetched blockhash");

        let tx = assembled.sign(&[payer, &mint], blockhash)?;
        drop(mint);

        info!(
            mint = %mint_pubkey,
            signature = %tx.signatures[0],
            instructions = assembled.instructions().len(),
            "submitting launch transaction"
        );
        let signature = self.rpc.send_and_confirm(&tx).await?;

        Ok(LaunchReceipt {
            signature,
            mint: mint_pubkey,
        })
    }
}
