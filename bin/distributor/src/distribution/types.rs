use crate::errors::ServiceError;
use crate::lamports::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::fmt;

/// Result of one distribution attempt
#[derive(Debug, Clone)]
pub enum DistributionOutcome {
    /// No holders, or nothing left after the reserve
    NothingToDistribute,
    /// Equal share too small to be worth a transfer; nothing was sent
    ShareBelowMinimum {
        per_holder_lamports: u64,
        minimum_lamports: u64,
    },
    /// Dry run: nothing built or sent
    DryRun {
        recipients: usize,
        per_holder_lamports: u64,
    },
    Completed(DistributionReport),
}

impl DistributionOutcome {
    pub fn report(&self) -> Option<&DistributionReport> {
        match self {
            DistributionOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }

    /// Transfers actually attempted
    pub fn attempted(&self) -> usize {
        self.report().map_or(0, |r| r.successful + r.failed)
    }
}

#[derive(Debug, Clone)]
pub struct TransferFailure {
    pub index: usize,
    pub recipient: Pubkey,
    pub error: ServiceError,
}

/// Tally of per-holder transfers
#[derive(Debug, Clone, Default)]
pub struct DistributionReport {
    pub per_holder_lamports: u64,
    pub successful: usize,
    pub failed: usize,
    /// Holders not reached because the run was cancelled
    pub unprocessed: usize,
    pub signatures: Vec<(Pubkey, Signature)>,
    pub failures: Vec<TransferFailure>,
}

impl DistributionReport {
    pub fn is_fully_successful(&self) -> bool {
        self.failed == 0 && self.unprocessed == 0
    }

    pub fn was_interrupted(&self) -> bool {
        self.unprocessed > 0
    }

    pub fn sent_lamports(&self) -> u64 {
        self.per_holder_lamports * self.successful as u64
    }
}

impl fmt::Display for DistributionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Distribution[share={:.9} SOL, successful={}, failed={}]",
            lamports_to_sol(self.per_holder_lamports),
            self.successful,
            self.failed
        )?;

        if self.unprocessed > 0 {
            write!(f, " (INTERRUPTED, {} unprocessed)", self.unprocessed)?;
        } else if self.failed > 0 {
            write!(f, " (PARTIAL FAILURE)")?;
        }

        Ok(())
    }
}
