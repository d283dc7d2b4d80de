use super::{RpcTokenAccountBalance, SolanaRpc};
use crate::errors::ServiceError;
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use std::time::Duration;

/// `getMultipleAccounts` accepts at most 100 keys per call
const MAX_MULTIPLE_ACCOUNTS: usize = 100;

const TOKEN_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
const TOKEN_2022_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

// SPL token account layout: mint (32) | owner (32) | amount (8) | ...
const TOKEN_ACCOUNT_LEN: usize = 165;
const OWNER_OFFSET: usize = 32;
// Token-2022 accounts with extensions carry an account-type byte after the base layout
const ACCOUNT_TYPE_ACCOUNT: u8 = 2;

pub struct SolanaRpcClient {
    client: RpcClient,
}

impl SolanaRpcClient {
    pub fn new(url: String, timeout_secs: u64) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(
            url,
            Duration::from_secs(timeout_secs),
            CommitmentConfig::confirmed(),
        );
        Self { client }
    }
}

/// Owner wallet of an SPL token account, `None` for anything else
fn token_account_owner(account: &Account) -> Option<Pubkey> {
    if account.owner != TOKEN_PROGRAM_ID && account.owner != TOKEN_2022_PROGRAM_ID {
        return None;
    }
    let data = &account.data;
    if data.len() < TOKEN_ACCOUNT_LEN {
        return None;
    }
    if data.len() > TOKEN_ACCOUNT_LEN && data[TOKEN_ACCOUNT_LEN] != ACCOUNT_TYPE_ACCOUNT {
        return None;
    }
    let owner: [u8; 32] = data[OWNER_OFFSET..OWNER_OFFSET + 32].try_into().ok()?;
    Some(Pubkey::new_from_array(owner))
}

#[async_trait]
impl SolanaRpc for SolanaRpcClient {
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, ServiceError> {
        Ok(self.client.get_balance(pubkey).await?)
    }

    async fn get_token_largest_accounts(
        &self,
        mint: &Pubkey,
    ) -> Result<Vec<RpcTokenAccountBalance>, ServiceError> {
        Ok(self.client.get_token_largest_accounts(mint).await?)
    }

    async fn get_token_account_owners(
        &self,
        accounts: &[Pubkey],
    ) -> Result<Vec<Option<Pubkey>>, ServiceError> {
        let mut owners = Vec::with_capacity(accounts.len());

        for chunk in accounts.chunks(MAX_MULTIPLE_ACCOUNTS) {
            let fetched = self.client.get_multiple_accounts(chunk).await?;

            if fetched.len() != chunk.len() {
                return Err(ServiceError::malformed(format!(
                    "getMultipleAccounts returned {} accounts for {} keys",
                    fetched.len(),
                    chunk.len()
                )));
            }

            owners.extend(
                fetched
                    .iter()
                    .map(|account| account.as_ref().and_then(token_account_owner)),
            );
        }

        Ok(owners)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ServiceError> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn send_transaction(&self, tx: &VersionedTransaction) -> Result<Signature, ServiceError> {
        let config = RpcSendTransactionConfig {
            preflight_commitment: Some(CommitmentLevel::Confirmed),
            ..Default::default()
        };

        Ok(self.client.send_transaction_with_config(tx, config).await?)
    }
}
