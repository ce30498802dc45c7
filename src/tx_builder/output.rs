//! Assembled launch transaction
//!
//! [`AssembledLaunch`] is the output of the assembler: the validated
//! instruction list, the compiled legacy message and the set of keys that
//! must sign it. It performs no I/O; the submitter turns it into a signed
//! [`Transaction`] once a blockhash is known.

use crate::tx_builder::errors::LaunchError;
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    message::Message,
    pubkey::Pubkey,
    signer::signers::Signers,
    transaction::Transaction,
};

/// Signer keys from a compiled message header, fee payer first
#[inline]
#[must_use]
pub fn get_required_signers(message: &Message) -> &[Pubkey] {
    let num_signers = message.header.num_required_signatures as usize;
    &message.account_keys[..num_signers.min(message.account_keys.len())]
}

#[derive(Debug, Clone)]
pub struct AssembledLaunch {
    instructions: Vec<Instruction>,
    message: Message,
    required_signers: Vec<Pubkey>,
}

impl AssembledLaunch {
    /// Compile `instructions` with `payer` as fee payer.
    ///
    /// The compiled header must require exactly `expected_signers`, in any
    /// order, and nothing else.
    pub fn new(
        instructions: Vec<Instruction>,
        payer: &Pubkey,
        expected_signers: &[Pubkey],
    ) -> Result<Self, LaunchError> {
        let message = Message::new(&instructions, Some(payer));
        let required_signers = get_required_signers(&message).to_vec();

        let matches_expected = required_signers.len() == expected_signers.len()
            && expected_signers.iter().all(|k| required_signers.contains(k));
        if !matches_expected {
            return Err(LaunchError::Signing(format!(
                "compiled signer set {:?} does not match expected {:?}",
                required_signers, expected_signers
            )));
        }

        Ok(Self {
            instructions,
            message,
            required_signers,
        })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Keys that must sign, fee payer first
    pub fn required_signers(&self) -> &[Pubkey] {
        &self.required_signers
    }

    pub fn fee_payer(&self) -> &Pubkey {
        &self.required_signers[0]
    }

    /// Sign with every required key against `blockhash`.
    ///
    /// Fails if any required signer is missing or an extra key is supplied.
    pub fn sign<T: Signers + ?Sized>(
        &self,
        signers: &T,
        blockhash: Hash,
    ) -> Result<Transaction, LaunchError> {
        let mut tx = Transaction::new_unsigned(self.message.clone());
        tx.try_sign(signers, blockhash)
            .map_err(|e| LaunchError::Signing(e.to_string()))?;
        Ok(tx)
    }
}
