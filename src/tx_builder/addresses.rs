//! Program-derived address computation
//!
//! The launch needs two addresses that no private key can ever sign for:
//! the payer's holding account for the new mint, and the mint's metadata
//! record. Both are pure functions of their seeds; nothing is registered or
//! stored.

use crate::tx_builder::errors::LaunchError;
use crate::tx_builder::metadata::{self, METADATA_SEED};
use solana_sdk::pubkey::{Pubkey, PubkeyError};

/// An address derived from `(program_id, seeds)` plus the bump that made it
/// fall off the ed25519 curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedAddress {
    pub address: Pubkey,
    pub bump: u8,
}

/// Search the bump space for the first off-curve address.
///
/// Bumps are tried from 255 down to 0, the same order the on-chain programs
/// use, so the result matches the address they will check against.
pub fn derive_program_address(
    program_id: &Pubkey,
    seeds: &[&[u8]],
) -> Result<DerivedAddress, LaunchError> {
    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut seeds_with_bump: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        seeds_with_bump.extend_from_slice(seeds);
        seeds_with_bump.push(&bump_seed);

        match Pubkey::create_program_address(&seeds_with_bump, program_id) {
            Ok(address) => return Ok(DerivedAddress { address, bump }),
            // On-curve for this bump, keep searching
            Err(PubkeyError::InvalidSeeds) => continue,
            Err(e) => {
                return Err(LaunchError::AddressDerivation {
                    program: program_id.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    Err(LaunchError::AddressDerivation {
        program: program_id.to_string(),
        reason: "no bump in 0..=255 yields an off-curve address".to_string(),
    })
}

/// Associated token account of `owner` for `mint` under the SPL Token program.
pub fn holding_account(owner: &Pubkey, mint: &Pubkey) -> Result<DerivedAddress, LaunchError> {
    derive_program_address(
        &spl_associated_token_account::id(),
        &[owner.as_ref(), spl_token::id().as_ref(), mint.as_ref()],
    )
}

/// Token Metadata record for `mint`.
pub fn metadata_account(mint: &Pubkey) -> Result<DerivedAddress, LaunchError> {
    let program_id = metadata::id();
    derive_program_address(
        &program_id,
        &[METADATA_SEED, program_id.as_ref(), mint.as_ref()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use spl_associated_token_account::get_associated_token_address;

    #[test]
    fn test_holding_account_is_deterministic() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let first = holding_account(&owner, &mint).unwrap();
        let second = holding_account(&owner, &mint).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_metadata_account_is_deterministic() {
        let mint = Pubkey::new_unique();
        assert_eq!(
            metadata_account(&mint).unwrap(),
            metadata_account(&mint).unwrap()
        );
    }

    #[test]
    fn test_holding_account_matches_spl_helper() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let derived = holding_account(&owner, &mint).unwrap();
        assert_eq!(derived.address, get_associated_token_address(&owner, &mint));
    }

    #[test]
    fn test_matches_canonical_find_program_address() {
        let mint = Pubkey::new_unique();
        let program_id = metadata::id();
        let (expected, expected_bump) = Pubkey::find_program_address(
            &[METADATA_SEED, program_id.as_ref(), mint.as_ref()],
            &program_id,
        );

        let derived = metadata_account(&mint).unwrap();
        assert_eq!(derived.address, expected);
        assert_eq!(derived.bump, expected_bump);
    }

    #[test]
    fn test_derived_addresses_are_off_curve() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        assert!(!holding_account(&owner, &mint).unwrap().address.is_on_curve());
        assert!(!metadata_account(&mint).unwrap().address.is_on_curve());
    }

    #[test]
    fn test_different_mints_give_different_addresses() {
        let owner = Pubkey::new_unique();
        let a = holding_account(&owner, &Pubkey::new_unique()).unwrap();
        let b = holding_account(&owner, &Pubkey::new_unique()).unwrap();
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn test_oversized_seed_is_rejected() {
        let long_seed = [7u8; 64];
        let result = derive_program_address(&Pubkey::new_unique(), &[&long_seed]);
        assert!(matches!(result, Err(LaunchError::AddressDerivation { .. })));
    }
}
