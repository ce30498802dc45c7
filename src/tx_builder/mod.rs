//! Token launch transaction builder
//!
//! Builds, validates and submits the single atomic transaction that issues a
//! new fungible token.
//!
//! ## Architecture
//!
//! - **errors**: Error taxonomy for every pipeline stage
//! - **addresses**: Program-derived address search
//! - **metadata**: Token Metadata instruction encoding
//! - **context**: Per-run payer/mint identities and derived addresses
//! - **instructions**: The six launch instruction constructors and supply scaling
//! - **assembler**: Fee-priority prefix and ordering validation
//! - **output**: Compiled message and required signer set
//! - **submit**: Signing and single-shot submission
//!
//! ## Instruction order
//!
//! ```text
//! 0 set_compute_unit_price
//! 1 create_account (mint)
//! 2 initialize_mint
//! 3 create_associated_token_account
//! 4 mint_to
//! 5 create_metadata_accounts_v3
//! 6 set_authority(MintTokens, None)
//! ```
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use solana_sdk::signature::{Keypair, Signer};
//! use token_launch::config::TokenParameters;
//! use token_launch::tx_builder::{assemble_launch, build_launch_instructions, LaunchContext};
//!
//! # fn example(params: &TokenParameters) -> Result<(), token_launch::tx_builder::LaunchError> {
//! let payer = Keypair::new();
//! let mint = Keypair::new();
//! let ctx = LaunchContext::derive(payer.pubkey(), mint.pubkey())?;
//! let ixs = build_launch_instructions(&ctx, params, 1_461_600)?;
//! let assembled = assemble_launch(params.priority_fee, ixs, &ctx.payer, &ctx.mint)?;
//! assert_eq!(assembled.instructions().len(), 7);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub use errors::LaunchError;

pub mod addresses;
pub mod assembler;
pub mod context;
pub mod instructions;
pub mod metadata;
pub mod output;
pub mod submit;

pub use addresses::{derive_program_address, holding_account, metadata_account, DerivedAddress};
pub use assembler::{assemble_launch, validate_launch_order, LaunchStep, LAUNCH_ORDER};
pub use context::LaunchContext;
pub use instructions::{build_launch_instructions, scale_supply, LaunchInstructions};
pub use output::AssembledLaunch;
pub use submit::{LaunchReceipt, Submitter};
