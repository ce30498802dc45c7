//! Test Utilities Module
//!
//! An in-memory ledger implementing [`LaunchRpc`] so the launch pipeline can
//! be exercised end to end without a network.
//!
//! The mock understands exactly the instructions a launch uses (compute unit
//! price, system `CreateAccount`, SPL Token `InitializeMint` / `MintTo` /
//! `SetAuthority`, associated token account `Create`, and Token Metadata
//! `CreateMetadataAccountV3`). A transaction is applied to a copy of the
//! account state and committed only if every instruction succeeds.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use crate::config::TokenParameters;
use crate::rpc::LaunchRpc;
use crate::tx_builder::{
    instructions::MINT_ACCOUNT_LEN,
    metadata::{self, CreateMetadataAccountArgsV3, TokenMetadata},
    LaunchError,
};
use async_trait::async_trait;
use borsh::BorshDeserialize;
use solana_sdk::{
    compute_budget,
    hash::Hash,
    instruction::CompiledInstruction,
    message::Message,
    pubkey::Pubkey,
    signature::Signature,
    system_instruction::SystemInstruction,
    system_program,
    transaction::Transaction,
};
use spl_associated_token_account::get_associated_token_address;
use spl_token::{
    instruction::{AuthorityType, TokenInstruction},
    solana_program::program_option::COption,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Token parameters used by the launch scenario tests
pub fn sample_token_parameters() -> TokenParameters {
    TokenParameters {
        decimals: 9,
        supply: 1_000_000,
        name: "Test".to_string(),
        symbol: "TST".to_string(),
        uri: "https://example.com/metadata.json".to_string(),
        priority_fee: 1000,
    }
}

/// Account states the mock ledger can hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAccount {
    /// Plain system-owned balance
    Wallet { lamports: u64 },
    /// Created but not yet initialized by its owner program
    Allocated { owner: Pubkey, space: u64, lamports: u64 },
    Mint {
        decimals: u8,
        supply: u64,
        mint_authority: Option<Pubkey>,
        freeze_authority: Option<Pubkey>,
    },
    Token { mint: Pubkey, owner: Pubkey, amount: u64 },
    Metadata {
        mint: Pubkey,
        update_authority: Pubkey,
        data: TokenMetadata,
    },
}

type Accounts = HashMap<Pubkey, MockAccount>;

/// In-memory ledger with all-or-nothing transaction execution
pub struct MockLedger {
    rent_lamports: u64,
    blockhash: Hash,
    accounts: Mutex<Accounts>,
    confirmed: Mutex<Vec<Signature>>,
    submitted: Mutex<Vec<Transaction>>,
    fail_at: Mutex<Option<usize>>,
    offline: AtomicBool,
    rent_queries: AtomicUsize,
    submissions: AtomicUsize,
}

impl MockLedger {
    /// Create a ledger reporting `rent_lamports` as the rent-exemption minimum
    pub fn new(rent_lamports: u64) -> Self {
        Self {
            rent_lamports,
            blockhash: Hash::new_unique(),
            accounts: Mutex::new(HashMap::new()),
            confirmed: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            fail_at: Mutex::new(None),
            offline: AtomicBool::new(false),
            rent_queries: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
        }
    }

    /// Give `key` a system balance
    pub async fn fund(&self, key: Pubkey, lamports: u64) {
        self.accounts
            .lock()
            .await
            .insert(key, MockAccount::Wallet { lamports });
    }

    pub async fn insert_account(&self, key: Pubkey, account: MockAccount) {
        self.accounts.lock().await.insert(key, account);
    }

    pub async fn account(&self, key: &Pubkey) -> Option<MockAccount> {
        self.accounts.lock().await.get(key).cloned()
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.lock().await.len()
    }

    pub async fn snapshot(&self) -> HashMap<Pubkey, MockAccount> {
        self.accounts.lock().await.clone()
    }

    pub async fn confirmed_signatures(&self) -> Vec<Signature> {
        self.confirmed.lock().await.clone()
    }

    /// Every transaction received, including rejected ones
    pub async fn submitted_transactions(&self) -> Vec<Transaction> {
        self.submitted.lock().await.clone()
    }

    /// Make the instruction at `index` fail on the next submissions
    pub async fn fail_at_instruction(&self, index: Option<usize>) {
        *self.fail_at.lock().await = index;
    }

    /// Simulate an unreachable endpoint
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn rent_query_count(&self) -> usize {
        self.rent_queries.load(Ordering::SeqCst)
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), LaunchError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LaunchError::Network("connection refused".to_string()));
        }
        Ok(())
    }

    fn execute(
        &self,
        accounts: &Accounts,
        tx: &Transaction,
        fail_at: Option<usize>,
    ) -> Result<Accounts, LaunchError> {
        tx.verify()
            .map_err(|e| LaunchError::simulation_failed(None, e.to_string()))?;
        if tx.message.recent_blockhash != self.blockhash {
            return Err(LaunchError::simulation_failed(None, "blockhash not found"));
        }

        let mut working = accounts.clone();
        for (idx, compiled) in tx.message.instructions.iter().enumerate() {
            if fail_at == Some(idx) {
                return Err(LaunchError::simulation_failed(Some(idx), "injected failure"));
            }
            apply_instruction(&mut working, &tx.message, compiled)
                .map_err(|reason| LaunchError::simulation_failed(Some(idx), reason))?;
        }
        Ok(working)
    }
}

#[async_trait]
impl LaunchRpc for MockLedger {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, LaunchError> {
        self.check_online()?;
        self.rent_queries.fetch_add(1, Ordering::SeqCst);
        if data_len != MINT_ACCOUNT_LEN {
            return Err(LaunchError::Rpc(format!("unexpected data length {}", data_len)));
        }
        Ok(self.rent_lamports)
    }

    async fn latest_blockhash(&self) -> Result<Hash, LaunchError> {
        self.check_online()?;
        Ok(self.blockhash)
    }

    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, LaunchError> {
        self.check_online()?;
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().await.push(tx.clone());

        let fail_at = *self.fail_at.lock().await;
        let mut accounts = self.accounts.lock().await;
        let committed = self.execute(&accounts, tx, fail_at)?;
        *accounts = committed;

        let signature = tx.signatures[0];
        self.confirmed.lock().await.push(signature);
        Ok(signature)
    }
}

/// Signer keys of a compiled message
fn signers(message: &Message) -> &[Pubkey] {
    &message.account_keys[..message.header.num_required_signatures as usize]
}

fn apply_instruction(
    accounts: &mut Accounts,
    message: &Message,
    compiled: &CompiledInstruction,
) -> Result<(), String> {
    let program_id = message.account_keys[compiled.program_id_index as usize];
    let keys: Vec<Pubkey> = compiled
        .accounts
        .iter()
        .map(|i| message.account_keys[*i as usize])
        .collect();
    let signed = |key: &Pubkey| signers(message).contains(key);
    let data = compiled.data.as_slice();

    if program_id == compute_budget::id() {
        apply_compute_budget(data)
    } else if program_id == system_program::id() {
        apply_system(accounts, &keys, data, &signed)
    } else if program_id == spl_token::id() {
        apply_token(accounts, &keys, data, &signed)
    } else if program_id == spl_associated_token_account::id() {
        apply_create_ata(accounts, &keys, data)
    } else if program_id == metadata::id() {
        apply_metadata(accounts, &keys, data, &signed)
    } else {
        Err(format!("unknown program {}", program_id))
    }
}

/// Only `SetComputeUnitPrice` (tag 3 followed by a u64 price) is accepted.
fn apply_compute_budget(data: &[u8]) -> Result<(), String> {
    match data.split_first() {
        Some((&3, price)) if price.len() == 8 => Ok(()),
        _ => Err("unsupported compute budget instruction".to_string()),
    }
}

fn key_at(keys: &[Pubkey], index: usize) -> Result<Pubkey, String> {
    keys.get(index)
        .copied()
        .ok_or_else(|| "not enough account keys".to_string())
}

fn apply_system(
    accounts: &mut Accounts,
    keys: &[Pubkey],
    data: &[u8],
    signed: &dyn Fn(&Pubkey) -> bool,
) -> Result<(), String> {
    let ix: SystemInstruction =
        bincode::deserialize(data).map_err(|e| format!("invalid system instruction: {}", e))?;
    let SystemInstruction::CreateAccount {
        lamports,
        space,
        owner,
    } = ix
    else {
        return Err("unsupported system instruction".to_string());
    };

    let from = key_at(keys, 0)?;
    let to = key_at(keys, 1)?;
    if !signed(&from) || !signed(&to) {
        return Err("missing required signature for create_account".to_string());
    }
    if accounts.contains_key(&to) {
        return Err(format!("account {} already in use", to));
    }
    match accounts.get_mut(&from) {
        Some(MockAccount::Wallet { lamports: balance }) if *balance >= lamports => {
            *balance -= lamports;
        }
        _ => return Err("insufficient funds for create_account".to_string()),
    }

    accounts.insert(
        to,
        MockAccount::Allocated {
            owner,
            space,
            lamports,
        },
    );
    Ok(())
}

fn apply_token(
    accounts: &mut Accounts,
    keys: &[Pubkey],
    data: &[u8],
    signed: &dyn Fn(&Pubkey) -> bool,
) -> Result<(), String> {
    let ix = TokenInstruction::unpack(data).map_err(|e| format!("invalid token instruction: {}", e))?;
    let mint_key = key_at(keys, 0)?;

    match ix {
        TokenInstruction::InitializeMint {
            decimals,
            mint_authority,
            freeze_authority,
        } => {
            match accounts.get(&mint_key) {
                Some(MockAccount::Allocated { owner, space, .. })
                    if *owner == spl_token::id() && *space == MINT_ACCOUNT_LEN as u64 => {}
                Some(MockAccount::Mint { .. }) => return Err("mint already initialized".to_string()),
                _ => return Err("mint account not allocated for the token program".to_string()),
            }
            let freeze_authority = match freeze_authority {
                COption::Some(key) => Some(key),
                COption::None => None,
            };
            accounts.insert(
                mint_key,
                MockAccount::Mint {
                    decimals,
                    supply: 0,
                    mint_authority: Some(mint_authority),
                    freeze_authority,
                },
            );
            Ok(())
        }
        TokenInstruction::MintTo { amount } => {
            let dest = key_at(keys, 1)?;
            let authority = key_at(keys, 2)?;
            if !signed(&authority) {
                return Err("mint authority did not sign".to_string());
            }
            match accounts.get(&dest) {
                Some(MockAccount::Token { mint, .. }) if *mint == mint_key => {}
                _ => return Err("destination is not a token account for this mint".to_string()),
            }
            match accounts.get_mut(&mint_key) {
                Some(MockAccount::Mint {
                    supply,
                    mint_authority,
                    ..
                }) => {
                    if *mint_authority != Some(authority) {
                        return Err("owner does not match mint authority".to_string());
                    }
                    *supply = supply.checked_add(amount).ok_or("supply overflow")?;
                }
                _ => return Err("mint not initialized".to_string()),
            }
            if let Some(MockAccount::Token { amount: balance, .. }) = accounts.get_mut(&dest) {
                *balance = balance.checked_add(amount).ok_or("balance overflow")?;
            }
            Ok(())
        }
        TokenInstruction::SetAuthority {
            authority_type: AuthorityType::MintTokens,
            new_authority,
        } => {
            let current = key_at(keys, 1)?;
            if !signed(&current) {
                return Err("current authority did not sign".to_string());
            }
            match accounts.get_mut(&mint_key) {
                Some(MockAccount::Mint { mint_authority, .. }) => {
                    if *mint_authority != Some(current) {
                        return Err("owner does not match mint authority".to_string());
                    }
                    *mint_authority = match new_authority {
                        COption::Some(key) => Some(key),
                        COption::None => None,
                    };
                    Ok(())
                }
                _ => Err("mint not initialized".to_string()),
            }
        }
        other => Err(format!("unsupported token instruction {:?}", other)),
    }
}

fn apply_create_ata(accounts: &mut Accounts, keys: &[Pubkey], data: &[u8]) -> Result<(), String> {
    if !(data.is_empty() || data == [0]) {
        return Err("only non-idempotent create is supported".to_string());
    }
    let ata = key_at(keys, 1)?;
    let wallet = key_at(keys, 2)?;
    let mint = key_at(keys, 3)?;

    if ata != get_associated_token_address(&wallet, &mint) {
        return Err("provided address does not match derived address".to_string());
    }
    if accounts.contains_key(&ata) {
        return Err(format!("account {} already in use", ata));
    }
    if !matches!(accounts.get(&mint), Some(MockAccount::Mint { .. })) {
        return Err("mint not initialized".to_string());
    }

    accounts.insert(
        ata,
        MockAccount::Token {
            mint,
            owner: wallet,
            amount: 0,
        },
    );
    Ok(())
}

fn apply_metadata(
    accounts: &mut Accounts,
    keys: &[Pubkey],
    data: &[u8],
    signed: &dyn Fn(&Pubkey) -> bool,
) -> Result<(), String> {
    let args = match data.split_first() {
        Some((&metadata::discriminator::CREATE_METADATA_ACCOUNT_V3, rest)) => {
            CreateMetadataAccountArgsV3::try_from_slice(rest)
                .map_err(|e| format!("invalid metadata instruction: {}", e))?
        }
        _ => return Err("unsupported metadata instruction".to_string()),
    };
    let meta = TokenMetadata {
        name: args.data.name,
        symbol: args.data.symbol,
        uri: args.data.uri,
        is_mutable: args.is_mutable,
    };
    let metadata_key = key_at(keys, 0)?;
    let mint = key_at(keys, 1)?;
    let mint_authority = key_at(keys, 2)?;
    let payer = key_at(keys, 3)?;
    let update_authority = key_at(keys, 4)?;

    let expected = crate::tx_builder::metadata_account(&mint).map_err(|e| e.to_string())?;
    if metadata_key != expected.address {
        return Err("metadata account does not match derived address".to_string());
    }
    if accounts.contains_key(&metadata_key) {
        return Err("metadata already exists".to_string());
    }
    if !signed(&mint_authority) || !signed(&payer) {
        return Err("missing required signature for metadata".to_string());
    }
    match accounts.get(&mint) {
        Some(MockAccount::Mint {
            mint_authority: Some(current),
            ..
        }) if *current == mint_authority => {}
        _ => return Err("mint authority mismatch".to_string()),
    }

    accounts.insert(
        metadata_key,
        MockAccount::Metadata {
            mint,
            update_authority,
            data: meta,
        },
    );
    Ok(())
}
