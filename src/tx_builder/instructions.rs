//! Launch instruction constructors
//!
//! Six pure constructors, one per ledger step, in the order the launch
//! executes them:
//! 1. allocate the mint account (system program)
//! 2. initialize the mint (SPL Token)
//! 3. create the payer's holding account (associated token account program)
//! 4. mint the scaled supply (SPL Token)
//! 5. attach metadata (Token Metadata)
//! 6. revoke the mint authority (SPL Token)
//!
//! Same inputs always produce identical instruction bytes.

use crate::config::TokenParameters;
use crate::tx_builder::context::LaunchContext;
use crate::tx_builder::errors::LaunchError;
use crate::tx_builder::metadata::{self, TokenMetadata};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_instruction};
use spl_token::{
    instruction::AuthorityType,
    solana_program::program_pack::Pack,
    state::Mint,
};

/// Size of the SPL Token mint record
pub const MINT_ACCOUNT_LEN: usize = Mint::LEN;

/// Compute `supply × 10^decimals` exactly.
///
/// The product is formed in `u128` with checked arithmetic and must fit the
/// `u64` amount the token program stores.
pub fn scale_supply(supply: u64, decimals: u8) -> Result<u64, LaunchError> {
    let overflow = || LaunchError::AmountOverflow { supply, decimals };

    let factor = 10u128.checked_pow(decimals as u32).ok_or_else(overflow)?;
    let raw = (supply as u128).checked_mul(factor).ok_or_else(overflow)?;
    u64::try_from(raw).map_err(|_| overflow())
}

pub fn allocate_mint_account(payer: &Pubkey, mint: &Pubkey, lamports: u64) -> Instruction {
    system_instruction::create_account(
        payer,
        mint,
        lamports,
        MINT_ACCOUNT_LEN as u64,
        &spl_token::id(),
    )
}

/// Initialize the mint with `authority` as mint authority and no freeze authority.
pub fn initialize_mint(
    mint: &Pubkey,
    authority: &Pubkey,
    decimals: u8,
) -> Result<Instruction, LaunchError> {
    spl_token::instruction::initialize_mint(&spl_token::id(), mint, authority, None, decimals)
        .map_err(|e| LaunchError::instruction_failed("spl_token::initialize_mint", e.to_string()))
}

/// Create `owner`'s associated token account for `mint`.
///
/// Not idempotent: execution fails if the account already exists.
pub fn create_holding_account(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    spl_associated_token_account::instruction::create_associated_token_account(
        payer,
        owner,
        mint,
        &spl_token::id(),
    )
}

pub fn mint_supply(
    mint: &Pubkey,
    holding: &Pubkey,
    authority: &Pubkey,
    raw_amount: u64,
) -> Result<Instruction, LaunchError> {
    spl_token::instruction::mint_to(&spl_token::id(), mint, holding, authority, &[], raw_amount)
        .map_err(|e| LaunchError::instruction_failed("spl_token::mint_to", e.to_string()))
}

/// Create a mutable metadata record with no royalty, creators, collection or uses.
pub fn create_metadata(
    metadata_account: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
    payer: &Pubkey,
    params: &TokenParameters,
) -> Result<Instruction, LaunchError> {
    let meta = TokenMetadata {
        name: params.name.clone(),
        symbol: params.symbol.clone(),
        uri: params.uri.clone(),
        is_mutable: true,
    };
    metadata::create_metadata_accounts_v3(metadata_account, mint, authority, payer, authority, &meta)
}

/// Set the mint authority to none. Irreversible.
pub fn revoke_mint_authority(mint: &Pubkey, authority: &Pubkey) -> Result<Instruction, LaunchError> {
    spl_token::instruction::set_authority(
        &spl_token::id(),
        mint,
        None,
        AuthorityType::MintTokens,
        authority,
        &[],
    )
    .map_err(|e| LaunchError::instruction_failed("spl_token::set_authority", e.to_string()))
}

/// The six launch instructions, named by step
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchInstructions {
    pub allocate_mint: Instruction,
    pub initialize_mint: Instruction,
    pub create_holding_account: Instruction,
    pub mint_supply: Instruction,
    pub create_metadata: Instruction,
    pub revoke_mint_authority: Instruction,
}

impl LaunchInstructions {
    /// Instructions in execution order
    pub fn into_ordered(self) -> [Instruction; 6] {
        [
            self.allocate_mint,
            self.initialize_mint,
            self.create_holding_account,
            self.mint_supply,
            self.create_metadata,
            self.revoke_mint_authority,
        ]
    }
}

/// Build all six launch instructions from the run's context.
///
/// `rent_lamports` is the rent-exemption minimum for a mint account as
/// reported by the network for this run.
pub fn build_launch_instructions(
    ctx: &LaunchContext,
    params: &TokenParameters,
    rent_lamports: u64,
) -> Result<LaunchInstructions, LaunchError> {
    let payer = &ctx.payer;
    let mint = &ctx.mint;
    let raw_amount = scale_supply(params.supply, params.decimals)?;

    Ok(LaunchInstructions {
        allocate_mint: allocate_mint_account(payer, mint, rent_lamports),
        initialize_mint: initialize_mint(mint, payer, params.decimals)?,
        create_holding_account: create_holding_account(payer, payer, mint),
        mint_supply: mint_supply(mint, &ctx.holding.address, payer, raw_amount)?,
        create_metadata: create_metadata(&ctx.metadata.address, mint, payer, payer, params)?,
        revoke_mint_authority: revoke_mint_authority(mint, payer)?,
    })
}
