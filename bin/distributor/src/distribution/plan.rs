/// Equal split of a distributable amount across a holder snapshot.
/// Recomputed every cycle; nothing ties it to earlier cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionPlan {
    pub total_lamports: u64,
    pub recipients: usize,
    pub per_holder_lamports: u64,
}

/// Why a plan could not be built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanRejection {
    /// No holders, or nothing to hand out
    NothingToDistribute,
    /// The equal share would not cover a transfer fee
    ShareBelowMinimum {
        per_holder_lamports: u64,
        minimum_lamports: u64,
    },
}

impl DistributionPlan {
    /// Split `total_lamports` evenly across `recipients`. The share is
    /// floored; the remainder (< `recipients` lamports) stays in the wallet.
    pub fn compute(
        total_lamports: u64,
        recipients: usize,
        minimum_lamports: u64,
    ) -> Result<Self, PlanRejection> {
        if recipients == 0 || total_lamports == 0 {
            return Err(PlanRejection::NothingToDistribute);
        }

        let per_holder_lamports = total_lamports / recipients as u64;

        if per_holder_lamports < minimum_lamports {
            return Err(PlanRejection::ShareBelowMinimum {
                per_holder_lamports,
                minimum_lamports,
            });
        }

        Ok(Self {
            total_lamports,
            recipients,
            per_holder_lamports,
        })
    }

    /// Lamports that leave the wallet if every transfer lands
    pub fn distributed_lamports(&self) -> u64 {
        self.per_holder_lamports * self.recipients as u64
    }

    pub fn remainder_lamports(&self) -> u64 {
        self.total_lamports - self.distributed_lamports()
    }
}
