//! Solana JSON-RPC access
//!
//! - `SolanaRpc`: the calls the distributor makes, so cycles can run against
//!   a mock node in tests
//! - `SolanaRpcClient`: implementation over the nonblocking `solana-client`

mod client;

use crate::errors::ServiceError;
use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;

pub use client::SolanaRpcClient;
pub use solana_client::rpc_response::RpcTokenAccountBalance;

#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// `getBalance`, in lamports
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, ServiceError>;

    /// `getTokenLargestAccounts` for a mint, in node order
    async fn get_token_largest_accounts(
        &self,
        mint: &Pubkey,
    ) -> Result<Vec<RpcTokenAccountBalance>, ServiceError>;

    /// Owner wallet of each token account, `None` for missing or
    /// non-token accounts. Output is index-aligned with `accounts`.
    async fn get_token_account_owners(
        &self,
        accounts: &[Pubkey],
    ) -> Result<Vec<Option<Pubkey>>, ServiceError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, ServiceError>;

    /// `sendTransaction` with `confirmed` preflight
    async fn send_transaction(&self, tx: &VersionedTransaction) -> Result<Signature, ServiceError>;
}
