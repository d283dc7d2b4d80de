// bin/distributor/src/lib.rs

pub mod chain;
pub mod claim;
pub mod config;
pub mod distribution;
pub mod errors;
pub mod keeper;
pub mod lamports;
pub mod rpc;
pub mod wallet;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use errors::ServiceError;
pub use wallet::Wallet;
