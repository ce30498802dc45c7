//! Token Metadata program instruction encoding
//!
//! Borsh mirrors of the `CreateMetadataAccountV3` arguments. The launch only
//! ever writes zero royalty and leaves creators, collection, uses and
//! collection details empty, but the full argument shape is kept so the
//! encoding matches the program's.

use crate::tx_builder::LaunchError;
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

/// Token Metadata program ID
pub const METADATA_PROGRAM_ID: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s";

/// First seed of every metadata PDA
pub const METADATA_SEED: &[u8] = b"metadata";

/// Instruction discriminators
pub mod discriminator {
    pub const CREATE_METADATA_ACCOUNT_V3: u8 = 33;
}

/// Field limits enforced by the metadata program
pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;

pub fn id() -> Pubkey {
    solana_sdk::pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s")
}

/// Descriptive fields written into the metadata record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub is_mutable: bool,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    pub address: Pubkey,
    pub verified: bool,
    pub share: u8,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub verified: bool,
    pub key: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseMethod {
    Burn,
    Multiple,
    Single,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Uses {
    pub use_method: UseMethod,
    pub remaining: u64,
    pub total: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum CollectionDetails {
    V1 { size: u64 },
    V2 { padding: [u8; 8] },
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct DataV2 {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateMetadataAccountArgsV3 {
    pub data: DataV2,
    pub is_mutable: bool,
    pub collection_details: Option<CollectionDetails>,
}

impl From<&TokenMetadata> for CreateMetadataAccountArgsV3 {
    fn from(meta: &TokenMetadata) -> Self {
        Self {
            data: DataV2 {
                name: meta.name.clone(),
                symbol: meta.symbol.clone(),
                uri: meta.uri.clone(),
                seller_fee_basis_points: 0,
                creators: None,
                collection: None,
                uses: None,
            },
            is_mutable: meta.is_mutable,
            collection_details: None,
        }
    }
}

/// Serialize `CreateMetadataAccountV3` instruction data
pub fn serialize_create_v3(meta: &TokenMetadata) -> Result<Vec<u8>, LaunchError> {
    let args = borsh::to_vec(&CreateMetadataAccountArgsV3::from(meta))
        .map_err(|e| LaunchError::instruction_failed("token-metadata", e.to_string()))?;

    let mut data = Vec::with_capacity(1 + args.len());
    data.push(discriminator::CREATE_METADATA_ACCOUNT_V3);
    data.extend_from_slice(&args);
    Ok(data)
}

/// Build a `CreateMetadataAccountV3` instruction.
///
/// Accounts:
/// 0. metadata (writable) - PDA for the mint
/// 1. mint
/// 2. mint_authority (signer)
/// 3. payer (signer, writable)
/// 4. update_authority (signer)
/// 5. system_program
/// 6. rent (unused, program ID placeholder)
pub fn create_metadata_accounts_v3(
    metadata: &Pubkey,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    payer: &Pubkey,
    update_authority: &Pubkey,
    meta: &TokenMetadata,
) -> Result<Instruction, LaunchError> {
    let program_id = id();
    Ok(Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(*metadata, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(*mint_authority, true),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(*update_authority, true),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(program_id, false),
        ],
        data: serialize_create_v3(meta)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(data: &[u8]) -> Option<CreateMetadataAccountArgsV3> {
        let (&tag, rest) = data.split_first()?;
        if tag != discriminator::CREATE_METADATA_ACCOUNT_V3 {
            return None;
        }
        CreateMetadataAccountArgsV3::try_from_slice(rest).ok()
    }

    fn sample() -> TokenMetadata {
        TokenMetadata {
            name: "Test".to_string(),
            symbol: "TST".to_string(),
            uri: "https://example.com/metadata.json".to_string(),
            is_mutable: true,
        }
    }

    #[test]
    fn test_program_id_constant_matches() {
        assert_eq!(id().to_string(), METADATA_PROGRAM_ID);
    }

    #[test]
    fn test_serialize_layout() {
        let data = serialize_create_v3(&TokenMetadata {
            name: "A".to_string(),
            symbol: "B".to_string(),
            uri: "".to_string(),
            is_mutable: true,
        })
        .unwrap();

        let expected: Vec<u8> = vec![
            33, // discriminator
            1, 0, 0, 0, b'A', // name
            1, 0, 0, 0, b'B', // symbol
            0, 0, 0, 0, // uri
            0, 0, // seller_fee_basis_points
            0, 0, 0, // creators, collection, uses
            1, // is_mutable
            0, // collection_details
        ];
        assert_eq!(data, expected);
    }

    #[test]
    fn test_decode_accepts_own_encoding() {
        let meta = sample();
        let decoded = decode(&serialize_create_v3(&meta).unwrap()).unwrap();
        assert_eq!(decoded.data.name, meta.name);
        assert_eq!(decoded.data.symbol, meta.symbol);
        assert_eq!(decoded.data.uri, meta.uri);
        assert_eq!(decoded.data.seller_fee_basis_points, 0);
        assert!(decoded.is_mutable);
        assert_eq!(decoded.collection_details, None);
    }

    #[test]
    fn test_decode_rejects_trailing_bytes_and_wrong_discriminator() {
        let mut data = serialize_create_v3(&sample()).unwrap();
        data.push(0);
        assert!(decode(&data).is_none());

        let mut data = serialize_create_v3(&sample()).unwrap();
        data[0] = 32;
        assert!(decode(&data).is_none());

        assert!(decode(&[33, 10, 0]).is_none());
        assert!(decode(&[]).is_none());
    }

    #[test]
    fn test_decode_reads_populated_optional_fields() {
        let creator = Pubkey::new_unique();
        let args = CreateMetadataAccountArgsV3 {
            data: DataV2 {
                name: "Test".to_string(),
                symbol: "TST".to_string(),
                uri: String::new(),
                seller_fee_basis_points: 500,
                creators: Some(vec![Creator {
                    address: creator,
                    verified: true,
                    share: 100,
                }]),
                collection: None,
                uses: Some(Uses {
                    use_method: UseMethod::Single,
                    remaining: 1,
                    total: 1,
                }),
            },
            is_mutable: false,
            collection_details: Some(CollectionDetails::V1 { size: 0 }),
        };

        let mut data = vec![discriminator::CREATE_METADATA_ACCOUNT_V3];
        data.extend_from_slice(&borsh::to_vec(&args).unwrap());

        assert_eq!(decode(&data), Some(args));
    }

    #[test]
    fn test_instruction_accounts() {
        let metadata = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let payer = Pubkey::new_unique();

        let ix = create_metadata_accounts_v3(&metadata, &mint, &payer, &payer, &payer, &sample()).unwrap();

        assert_eq!(ix.program_id, id());
        assert_eq!(ix.accounts.len(), 7);
        assert!(ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
        assert_eq!(ix.accounts[1].pubkey, mint);
        assert!(ix.accounts[2].is_signer);
        assert!(ix.accounts[3].is_signer && ix.accounts[3].is_writable);
        assert_eq!(ix.accounts[5].pubkey, system_program::id());
    }
}
