//! Launch pipeline entry point
//!
//! One run: generate the mint keypair, query the rent-exemption minimum,
//! derive addresses, build and assemble the seven instructions, then sign,
//! send and wait for confirmation. Single pass, no retry.
//!
//! If the process dies after submission but before a confirmation is seen,
//! the outcome is unknown; nothing here re-queries the ledger for the mint.

use crate::config::TokenParameters;
use crate::rpc::LaunchRpc;
use crate::structured_logging::LaunchLogger;
use crate::tx_builder::{
    assemble_launch, build_launch_instructions, instructions::MINT_ACCOUNT_LEN, LaunchContext,
    LaunchError, LaunchReceipt, Submitter,
};
use solana_sdk::signature::{Keypair, Signer};
use std::time::Instant;

/// Issue a new token with a freshly generated mint keypair.
pub async fn launch_token<R: LaunchRpc + ?Sized>(
    rpc: &R,
    payer: &Keypair,
    params: &TokenParameters,
) -> Result<LaunchReceipt, LaunchError> {
    launch_token_with_mint(rpc, payer, Keypair::new(), params, &LaunchLogger::new()).await
}

/// Issue a new token using `mint` as its identity.
///
/// Parameters are validated before any network call.
pub async fn launch_token_with_mint<R: LaunchRpc + ?Sized>(
    rpc: &R,
    payer: &Keypair,
    mint: Keypair,
    params: &TokenParameters,
    logger: &LaunchLogger,
) -> Result<LaunchReceipt, LaunchError> {
    let started = Instant::now();
    let result = run(rpc, payer, mint, params, logger).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    match &result {
        Ok(receipt) => logger.log_confirmed(&receipt.mint, &receipt.signature, latency_ms),
        Err(e) => logger.log_failure(e, latency_ms),
    }
    result
}

async fn run<R: LaunchRpc + ?Sized>(
    rpc: &R,
    payer: &Keypair,
    mint: Keypair,
    params: &TokenParameters,
    logger: &LaunchLogger,
) -> Result<LaunchReceipt, LaunchError> {
    params.validate()?;
    let ctx = LaunchContext::derive(payer.pubkey(), mint.pubkey())?;
    logger.log_run_started(&ctx.payer, &ctx.mint, &params.symbol);
    logger.log_addresses_derived(&ctx.holding.address, &ctx.metadata.address);

    let rent_lamports = rpc.minimum_balance_for_rent_exemption(MINT_ACCOUNT_LEN).await?;
    logger.log_rent_fetched(rent_lamports);

    let instructions = build_launch_instructions(&ctx, params, rent_lamports)?;
    let assembled = assemble_launch(params.priority_fee, instructions, &ctx.payer, &ctx.mint)?;
    logger.log_transaction_assembled(assembled.instructions().len(), params.raw_supply()?);

    Submitter::new(rpc).submit(&assembled, payer, mint).await
}
