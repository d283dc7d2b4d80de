use super::FeeClaimApi;
use crate::errors::ServiceError;
use crate::rpc::SolanaRpc;
use crate::wallet::Wallet;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use std::sync::Arc;

/// Claims accumulated creator fees into the distribution wallet
pub struct FeeClaimer<R, F>
where
    R: SolanaRpc,
    F: FeeClaimApi,
{
    rpc: Arc<R>,
    api: Arc<F>,
    wallet: Arc<Wallet>,
    dry_run: bool,
}

/// Signature of a claim transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub signature: Signature,
    /// false in dry-run mode: signed but never sent
    pub submitted: bool,
}

impl ClaimReceipt {
    pub fn explorer_url(&self) -> String {
        format!("https://solscan.io/tx/{}", self.signature)
    }
}

impl<R, F> FeeClaimer<R, F>
where
    R: SolanaRpc,
    F: FeeClaimApi,
{
    pub fn new(rpc: Arc<R>, api: Arc<F>, wallet: Arc<Wallet>, dry_run: bool) -> Self {
        Self {
            rpc,
            api,
            wallet,
            dry_run,
        }
    }

    /// Fetch the claim transaction, sign it with the wallet and submit it.
    /// Not retried; the caller decides what a failure means for the cycle.
    pub async fn claim(&self) -> Result<ClaimReceipt, ServiceError> {
        let payload = self
            .api
            .request_claim_transaction(&self.wallet.pubkey())
            .await?;

        let unsigned: VersionedTransaction = bincode::deserialize(&payload)?;
        let signed = VersionedTransaction::try_new(unsigned.message, &[self.wallet.keypair()])?;

        if self.dry_run {
            tracing::info!(signature = %signed.signatures[0], "Dry run: claim transaction signed, not submitted");
            return Ok(ClaimReceipt {
                signature: signed.signatures[0],
                submitted: false,
            });
        }

        let signature = self.rpc.send_transaction(&signed).await?;

        Ok(ClaimReceipt {
            signature,
            submitted: true,
        })
    }
}
