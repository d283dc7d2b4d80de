use super::plan::{DistributionPlan, PlanRejection};
use super::types::{DistributionOutcome, DistributionReport, TransferFailure};
use crate::chain::Holder;
use crate::errors::ServiceError;
use crate::lamports::lamports_to_sol;
use crate::rpc::SolanaRpc;
use crate::wallet::Wallet;
use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
#[allow(deprecated)]
use solana_sdk::system_instruction;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct TransferSettings {
    /// Smallest per-holder share worth sending
    pub min_transfer_lamports: u64,
    /// Log progress every N holders
    pub progress_every: usize,
    /// Refetch the blockhash once it is older than this
    pub blockhash_max_age: Duration,
    pub dry_run: bool,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            min_transfer_lamports: 5_000,
            progress_every: 10,
            blockhash_max_age: Duration::from_secs(30),
            dry_run: false,
        }
    }
}

/// Splits an amount evenly across holders, one transfer transaction each
pub struct Distributor<R: SolanaRpc> {
    rpc: Arc<R>,
    wallet: Arc<Wallet>,
    settings: TransferSettings,
}

impl<R: SolanaRpc> Distributor<R> {
    pub fn new(rpc: Arc<R>, wallet: Arc<Wallet>, settings: TransferSettings) -> Self {
        Self {
            rpc,
            wallet,
            settings,
        }
    }

    /// Send `amount_lamports / holders.len()` to every holder in order.
    ///
    /// A failed transfer is counted and skipped; nothing is retried or rolled
    /// back. `cancel` is checked before each holder, so a cancelled run stops
    /// starting new transfers but never aborts one in flight.
    pub async fn distribute(
        &self,
        holders: &[Holder],
        amount_lamports: u64,
        cancel: &CancellationToken,
    ) -> DistributionOutcome {
        tracing::info!(
            holders = holders.len(),
            amount_sol = lamports_to_sol(amount_lamports),
            "Distributing fees to {} holders",
            holders.len()
        );

        let plan = match DistributionPlan::compute(
            amount_lamports,
            holders.len(),
            self.settings.min_transfer_lamports,
        ) {
            Ok(plan) => plan,
            Err(PlanRejection::NothingToDistribute) => {
                tracing::info!("No holders or insufficient balance to distribute");
                return DistributionOutcome::NothingToDistribute;
            }
            Err(PlanRejection::ShareBelowMinimum {
                per_holder_lamports,
                minimum_lamports,
            }) => {
                tracing::info!(
                    per_holder_lamports,
                    minimum_lamports,
                    "Amount per holder too small: {:.9} SOL",
                    lamports_to_sol(per_holder_lamports)
                );
                return DistributionOutcome::ShareBelowMinimum {
                    per_holder_lamports,
                    minimum_lamports,
                };
            }
        };

        if self.settings.dry_run {
            tracing::info!(
                recipients = plan.recipients,
                per_holder_lamports = plan.per_holder_lamports,
                "Dry run: would send {:.9} SOL to each of {} holders",
                lamports_to_sol(plan.per_holder_lamports),
                plan.recipients
            );
            return DistributionOutcome::DryRun {
                recipients: plan.recipients,
                per_holder_lamports: plan.per_holder_lamports,
            };
        }

        tracing::info!(
            total_sol = lamports_to_sol(plan.distributed_lamports()),
            remainder_lamports = plan.remainder_lamports(),
            "Distributing {:.9} SOL to each holder...",
            lamports_to_sol(plan.per_holder_lamports)
        );

        let mut report = DistributionReport {
            per_holder_lamports: plan.per_holder_lamports,
            ..Default::default()
        };
        let mut blockhash: Option<(Hash, Instant)> = None;
        let total = holders.len();

        for (i, holder) in holders.iter().enumerate() {
            if cancel.is_cancelled() {
                report.unprocessed = total - i;
                tracing::warn!(
                    processed = i,
                    unprocessed = report.unprocessed,
                    "Distribution cancelled before all holders were paid"
                );
                break;
            }

            match self
                .transfer(&holder.recipient, plan.per_holder_lamports, &mut blockhash)
                .await
            {
                Ok(signature) => {
                    tracing::debug!(holder = i, recipient = %holder.recipient, %signature, "Transfer sent");
                    report.successful += 1;
                    report.signatures.push((holder.recipient, signature));
                }
                Err(error) => {
                    tracing::error!(
                        holder = i,
                        recipient = %holder.recipient,
                        kind = error.kind(),
                        %error,
                        "Error transferring to holder {}",
                        i
                    );
                    report.failed += 1;
                    report.failures.push(TransferFailure {
                        index: i,
                        recipient: holder.recipient,
                        error,
                    });
                }
            }

            if (i + 1) % self.settings.progress_every == 0 {
                tracing::info!("  Distributed to {}/{} holders", i + 1, total);
            }
        }

        if report.is_fully_successful() {
            tracing::info!(
                sent_sol = lamports_to_sol(report.sent_lamports()),
                "Distribution complete! {}",
                report
            );
        } else {
            tracing::warn!(
                sent_sol = lamports_to_sol(report.sent_lamports()),
                "Distribution complete! {}",
                report
            );
        }

        DistributionOutcome::Completed(report)
    }

    /// Build, sign and submit one System Program transfer
    async fn transfer(
        &self,
        recipient: &Pubkey,
        lamports: u64,
        cached: &mut Option<(Hash, Instant)>,
    ) -> Result<Signature, ServiceError> {
        let recent_blockhash = match *cached {
            Some((hash, fetched_at)) if fetched_at.elapsed() < self.settings.blockhash_max_age => hash,
            _ => {
                let hash = self.rpc.get_latest_blockhash().await?;
                *cached = Some((hash, Instant::now()));
                hash
            }
        };

        let payer = self.wallet.pubkey();
        #[allow(deprecated)]
        let ix = system_instruction::transfer(&payer, recipient, lamports);
        let message = Message::new(&[ix], Some(&payer));

        let mut tx = Transaction::new_unsigned(message);
        tx.try_sign(&[self.wallet.keypair()], recent_blockhash)?;

        self.rpc.send_transaction(&VersionedTransaction::from(tx)).await
    }
}
