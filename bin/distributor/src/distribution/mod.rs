mod distributor;
mod plan;
mod types;

pub use distributor::{Distributor, TransferSettings};
pub use plan::{DistributionPlan, PlanRejection};
pub use types::{DistributionOutcome, DistributionReport, TransferFailure};
