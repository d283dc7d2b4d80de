//! Creator-fee claiming
//!
//! The fee-claim service builds the claim transaction; we only sign and
//! submit it.

mod claimer;
mod client;

use crate::errors::ServiceError;
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

pub use claimer::{ClaimReceipt, FeeClaimer};
pub use client::PumpPortalClient;

#[async_trait]
pub trait FeeClaimApi: Send + Sync {
    /// Fetch the serialized, unsigned `VersionedTransaction` that collects
    /// creator fees into `public_key`
    async fn request_claim_transaction(&self, public_key: &Pubkey) -> Result<Vec<u8>, ServiceError>;
}
