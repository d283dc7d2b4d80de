//! Chain reads for one cycle
//!
//! - Wallet balance
//! - Holder snapshot of the target token

mod balance;
mod holders;

pub use balance::BalanceReader;
pub use holders::{Holder, HolderLister};
