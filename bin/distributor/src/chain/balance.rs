use crate::errors::ServiceError;
use crate::rpc::SolanaRpc;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;

/// Reads the distribution wallet's SOL balance
pub struct BalanceReader<R: SolanaRpc> {
    rpc: Arc<R>,
    wallet: Pubkey,
}

impl<R: SolanaRpc> BalanceReader<R> {
    pub fn new(rpc: Arc<R>, wallet: Pubkey) -> Self {
        Self { rpc, wallet }
    }

    /// Current balance in lamports
    pub async fn current_balance(&self) -> Result<u64, ServiceError> {
        self.rpc.get_balance(&self.wallet).await
    }
}
