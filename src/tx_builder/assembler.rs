//! Launch transaction assembly and ordering validation
//!
//! The launch transaction always has exactly seven instructions:
//! 0. compute unit price (fee priority)
//! 1. allocate mint account
//! 2. initialize mint
//! 3. create holding account
//! 4. mint supply
//! 5. attach metadata
//! 6. revoke mint authority
//!
//! Revoking the mint authority is one-way, so it must come after every
//! instruction that needs the authority's signature. The order is checked
//! on every assembly, not left to the caller.

use crate::tx_builder::errors::LaunchError;
use crate::tx_builder::instructions::LaunchInstructions;
use crate::tx_builder::metadata;
use crate::tx_builder::output::AssembledLaunch;
use solana_sdk::{
    compute_budget::{self, ComputeBudgetInstruction},
    instruction::Instruction,
    pubkey::Pubkey,
    system_program,
};
use spl_token::{instruction::AuthorityType, instruction::TokenInstruction};
use spl_token::solana_program::program_option::COption;

/// Number of instructions in a launch transaction
pub const LAUNCH_INSTRUCTION_COUNT: usize = 7;

/// One step of the launch, recognised from an instruction's program and data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStep {
    FeePriority,
    AllocateMint,
    InitializeMint,
    CreateHoldingAccount,
    MintSupply,
    AttachMetadata,
    RevokeMintAuthority,
}

/// Required order of a launch transaction
pub const LAUNCH_ORDER: [LaunchStep; LAUNCH_INSTRUCTION_COUNT] = [
    LaunchStep::FeePriority,
    LaunchStep::AllocateMint,
    LaunchStep::InitializeMint,
    LaunchStep::CreateHoldingAccount,
    LaunchStep::MintSupply,
    LaunchStep::AttachMetadata,
    LaunchStep::RevokeMintAuthority,
];

impl LaunchStep {
    /// Recognise which launch step `ix` performs, if any.
    pub fn classify(ix: &Instruction) -> Option<Self> {
        let program_id = ix.program_id;

        if program_id == compute_budget::id() {
            // SetComputeUnitPrice has discriminator 3
            return (ix.data.first() == Some(&3)).then_some(Self::FeePriority);
        }

        if program_id == system_program::id() {
            // CreateAccount has discriminator 0 (u32 little-endian)
            return (ix.data.len() >= 4 && ix.data[..4] == [0, 0, 0, 0])
                .then_some(Self::AllocateMint);
        }

        if program_id == spl_associated_token_account::id() {
            // Create is either empty data or [0]; [1] is the idempotent variant
            return (ix.data.is_empty() || ix.data == [0]).then_some(Self::CreateHoldingAccount);
        }

        if program_id == metadata::id() {
            return (ix.data.first() == Some(&metadata::discriminator::CREATE_METADATA_ACCOUNT_V3))
                .then_some(Self::AttachMetadata);
        }

        if program_id == spl_token::id() {
            return match TokenInstruction::unpack(&ix.data).ok()? {
                TokenInstruction::InitializeMint { .. } => Some(Self::InitializeMint),
                TokenInstruction::MintTo { .. } => Some(Self::MintSupply),
                TokenInstruction::SetAuthority {
                    authority_type: AuthorityType::MintTokens,
                    new_authority: COption::None,
                } => Some(Self::RevokeMintAuthority),
                _ => None,
            };
        }

        None
    }
}

/// Check that `instructions` is exactly the seven launch steps in order.
pub fn validate_launch_order(instructions: &[Instruction]) -> Result<(), LaunchError> {
    if instructions.len() != LAUNCH_INSTRUCTION_COUNT {
        return Err(LaunchError::invalid_order(format!(
            "expected {} instructions, got {}",
            LAUNCH_INSTRUCTION_COUNT,
            instructions.len()
        )));
    }

    let steps: Vec<Option<LaunchStep>> = instructions.iter().map(LaunchStep::classify).collect();

    // Report a misplaced revoke first, it is the one that cannot be undone
    let last = LAUNCH_INSTRUCTION_COUNT - 1;
    if let Some(pos) = steps
        .iter()
        .position(|s| *s == Some(LaunchStep::RevokeMintAuthority))
    {
        if pos != last {
            return Err(LaunchError::invalid_order(format!(
                "mint authority revocation must be the last instruction, found at position {}",
                pos
            )));
        }
    }

    for (idx, (found, expected)) in steps.iter().zip(LAUNCH_ORDER.iter()).enumerate() {
        match found {
            Some(step) if step == expected => {}
            Some(step) => {
                return Err(LaunchError::invalid_order(format!(
                    "position {} must be {:?}, found {:?}",
                    idx, expected, step
                )))
            }
            None => {
                return Err(LaunchError::invalid_order(format!(
                    "position {} must be {:?}, found unrecognised instruction for program {}",
                    idx, expected, instructions[idx].program_id
                )))
            }
        }
    }

    Ok(())
}

/// Prepend the fee-priority instruction to the six launch instructions and
/// compile the result for signing by `{payer, mint}`.
pub fn assemble_launch(
    priority_fee: u64,
    instructions: LaunchInstructions,
    payer: &Pubkey,
    mint: &Pubkey,
) -> Result<AssembledLaunch, LaunchError> {
    assemble_launch_instructions(priority_fee, instructions.into_ordered().to_vec(), payer, mint)
}

/// Like [`assemble_launch`], for an arbitrary list of six step instructions.
///
/// The list is validated as given; nothing is reordered.
pub fn assemble_launch_instructions(
    priority_fee: u64,
    steps: Vec<Instruction>,
    payer: &Pubkey,
    mint: &Pubkey,
) -> Result<AssembledLaunch, LaunchError> {
    if payer == mint {
        return Err(LaunchError::config("payer and mint must be distinct keys"));
    }

    let mut instructions = Vec::with_capacity(LAUNCH_INSTRUCTION_COUNT);
    instructions.push(ComputeBudgetInstruction::set_compute_unit_price(priority_fee));
    instructions.extend(steps);

    validate_launch_order(&instructions)?;

    AssembledLaunch::new(instructions, payer, &[*payer, *mint])
}
