//! Token holder snapshot
//!
//! Known limitation: `getTokenLargestAccounts` returns only the largest
//! accounts of a mint (20 on public RPC nodes), not every holder. Listing
//! all holders needs a paginated program-account scan, which is not done
//! here.

use crate::errors::ServiceError;
use crate::rpc::{RpcTokenAccountBalance, SolanaRpc};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;

/// One entry of the holder snapshot. Fetched fresh each cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Holder {
    /// Token account reported by the node
    pub token_account: Pubkey,
    /// Where the SOL share goes: the token account itself, or its owner
    /// wallet when owner resolution is enabled
    pub recipient: Pubkey,
    /// Raw token amount
    pub amount: u64,
    pub decimals: u8,
    pub ui_amount: Option<f64>,
}

impl TryFrom<&RpcTokenAccountBalance> for Holder {
    type Error = ServiceError;

    fn try_from(entry: &RpcTokenAccountBalance) -> Result<Self, Self::Error> {
        let token_account = Pubkey::from_str(&entry.address).map_err(|e| {
            ServiceError::malformed(format!("holder address {:?}: {}", entry.address, e))
        })?;
        let amount = entry.amount.amount.parse::<u64>().map_err(|e| {
            ServiceError::malformed(format!("holder amount {:?}: {}", entry.amount.amount, e))
        })?;

        Ok(Self {
            token_account,
            recipient: token_account,
            amount,
            decimals: entry.amount.decimals,
            ui_amount: entry.amount.ui_amount,
        })
    }
}

/// Lists the largest holders of the target mint
pub struct HolderLister<R: SolanaRpc> {
    rpc: Arc<R>,
    mint: Pubkey,
    resolve_owners: bool,
}

impl<R: SolanaRpc> HolderLister<R> {
    pub fn new(rpc: Arc<R>, mint: Pubkey, resolve_owners: bool) -> Self {
        Self {
            rpc,
            mint,
            resolve_owners,
        }
    }

    pub fn mint(&self) -> &Pubkey {
        &self.mint
    }

    /// Holders in node order. No deduplication and no minimum-balance filter.
    ///
    /// Only the RPC call itself fails the listing. An entry that does not
    /// parse is dropped with a warning and the rest are kept.
    pub async fn list(&self) -> Result<Vec<Holder>, ServiceError> {
        let accounts = self.rpc.get_token_largest_accounts(&self.mint).await?;

        let mut holders: Vec<Holder> = accounts
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| match Holder::try_from(entry) {
                Ok(holder) => Some(holder),
                Err(error) => {
                    tracing::warn!(index = i, %error, "Skipping unparsable holder entry");
                    None
                }
            })
            .collect();

        if self.resolve_owners && !holders.is_empty() {
            holders = self.resolve(holders).await?;
        }

        Ok(holders)
    }

    async fn resolve(&self, holders: Vec<Holder>) -> Result<Vec<Holder>, ServiceError> {
        let keys: Vec<Pubkey> = holders.iter().map(|h| h.token_account).collect();
        let owners = self.rpc.get_token_account_owners(&keys).await?;

        let resolved: Vec<Holder> = holders
            .into_iter()
            .zip(owners)
            .filter_map(|(holder, owner)| match owner {
                Some(owner) => Some(Holder {
                    recipient: owner,
                    ..holder
                }),
                None => {
                    tracing::warn!(
                        token_account = %holder.token_account,
                        "Token account has no resolvable owner, dropping holder"
                    );
                    None
                }
            })
            .collect();

        Ok(resolved)
    }
}
