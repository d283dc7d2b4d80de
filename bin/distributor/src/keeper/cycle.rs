use crate::chain::{BalanceReader, HolderLister};
use crate::claim::{ClaimReceipt, FeeClaimApi, FeeClaimer};
use crate::distribution::{DistributionOutcome, Distributor};
use crate::errors::ServiceError;
use crate::lamports::lamports_to_sol;
use crate::rpc::SolanaRpc;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

/// Cycle controller configuration
#[derive(Debug, Clone)]
pub struct CycleConfig {
    pub interval_secs: u64,
    /// Pause after claiming so the claim can land before reading the balance
    pub settle_delay_secs: u64,
    pub error_backoff_secs: u64,
    /// Lamports always left in the wallet for fees
    pub reserve_lamports: u64,
    pub claim_enabled: bool,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 15 * 60,
            settle_delay_secs: 5,
            error_backoff_secs: 60,
            reserve_lamports: 10_000_000,
            claim_enabled: true,
        }
    }
}

/// What happened in one claim → read → distribute pass
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    /// `None` when claiming is disabled
    pub claim: Option<Result<ClaimReceipt, ServiceError>>,
    /// Zero when the balance query failed
    pub balance_lamports: u64,
    pub balance_error: Option<ServiceError>,
    pub holder_count: usize,
    pub holders_error: Option<ServiceError>,
    /// Amount handed to the distributor, if it ran
    pub distribution_lamports: Option<u64>,
    pub outcome: Option<DistributionOutcome>,
    /// Cancelled during the settlement pause or before every holder was paid
    pub interrupted: bool,
}

impl CycleReport {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            claim: None,
            balance_lamports: 0,
            balance_error: None,
            holder_count: 0,
            holders_error: None,
            distribution_lamports: None,
            outcome: None,
            interrupted: false,
        }
    }
}

/// Main distributor loop: claim fees, then split the balance among holders,
/// every `interval_secs` until cancelled
pub struct CycleController<R, F>
where
    R: SolanaRpc,
    F: FeeClaimApi,
{
    claimer: FeeClaimer<R, F>,
    balances: BalanceReader<R>,
    holders: HolderLister<R>,
    distributor: Distributor<R>,
    config: CycleConfig,
    cancel_token: CancellationToken,
}

impl<R, F> CycleController<R, F>
where
    R: SolanaRpc + 'static,
    F: FeeClaimApi + 'static,
{
    pub fn new(
        claimer: FeeClaimer<R, F>,
        balances: BalanceReader<R>,
        holders: HolderLister<R>,
        distributor: Distributor<R>,
        config: CycleConfig,
    ) -> Self {
        Self {
            claimer,
            balances,
            holders,
            distributor,
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Get cancellation token for graceful shutdown
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Run cycles until cancelled. Each cycle runs in its own task so a panic
    /// inside one is logged and retried after the backoff instead of taking
    /// the process down.
    pub async fn run(self: Arc<Self>) -> eyre::Result<()> {
        tracing::info!("🚀 Starting fee distributor loop");
        tracing::info!("  Token mint: {}", self.holders.mint());
        tracing::info!("  Distribution interval: {} minutes", self.config.interval_secs / 60);
        tracing::info!("  Reserve: {:.9} SOL", lamports_to_sol(self.config.reserve_lamports));

        loop {
            if self.cancel_token.is_cancelled() {
                break;
            }

            let this = self.clone();
            let handle = tokio::spawn(async move { this.run_cycle().await });

            let pause_secs = match handle.await {
                Ok(report) => {
                    if report.interrupted {
                        break;
                    }
                    tracing::info!(
                        "Next distribution in {} minutes...",
                        self.config.interval_secs / 60
                    );
                    self.config.interval_secs
                }
                Err(e) => {
                    tracing::error!("❌ Error in main loop: {}", e);
                    tracing::info!("Retrying in {} seconds...", self.config.error_backoff_secs);
                    self.config.error_backoff_secs
                }
            };

            if !self.pause(pause_secs).await {
                break;
            }
        }

        tracing::info!("🛑 Distributor stopped by user");
        Ok(())
    }

    /// One full pass. Claim, balance and holder failures are logged and
    /// downgraded so the rest of the cycle still runs.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::new();

        // Step 1: claim creator fees
        if self.config.claim_enabled {
            tracing::info!("Claiming creator fees...");
            let claim = self.claimer.claim().await;
            match &claim {
                Ok(receipt) if receipt.submitted => {
                    tracing::info!("✓ Fees claimed successfully!");
                    tracing::info!("Transaction: {}", receipt.explorer_url());
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(kind = e.kind(), "Error claiming creator fees: {}", e);
                }
            }
            report.claim = Some(claim);

            // Let the claim settle before reading the balance
            if !self.pause(self.config.settle_delay_secs).await {
                report.interrupted = true;
                return report;
            }
        }

        // Step 2: wallet balance. A failed read counts as nothing to distribute.
        match self.balances.current_balance().await {
            Ok(lamports) => report.balance_lamports = lamports,
            Err(e) => {
                tracing::error!(kind = e.kind(), "Error fetching balance: {}", e);
                report.balance_error = Some(e);
            }
        }
        tracing::info!("Current balance: {:.9} SOL", lamports_to_sol(report.balance_lamports));

        // Step 3: holder snapshot
        tracing::info!("Fetching holders...");
        let holders = match self.holders.list().await {
            Ok(holders) => holders,
            Err(e) => {
                tracing::error!(kind = e.kind(), "Error fetching holders: {}", e);
                report.holders_error = Some(e);
                Vec::new()
            }
        };
        report.holder_count = holders.len();
        tracing::info!("Found {} holders", holders.len());

        // Step 4: distribute everything above the reserve
        if report.balance_lamports > self.config.reserve_lamports {
            let amount = report.balance_lamports - self.config.reserve_lamports;
            report.distribution_lamports = Some(amount);
            let outcome = self
                .distributor
                .distribute(&holders, amount, &self.cancel_token)
                .await;
            report.interrupted = outcome.report().map_or(false, |r| r.was_interrupted());
            report.outcome = Some(outcome);
        } else {
            tracing::info!("Insufficient balance for distribution");
        }

        report
    }

    /// Sleep unless cancelled first. Returns false on cancellation.
    async fn pause(&self, secs: u64) -> bool {
        tokio::select! {
            _ = sleep(Duration::from_secs(secs)) => true,
            _ = self.cancel_token.cancelled() => false,
        }
    }
}
