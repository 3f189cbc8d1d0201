//! API Module
//!
//! Existence-check clients for the explorer backend.

mod explorer;

pub use explorer::*;

use crate::error::ShardWalletResult;

/// Answers "has this address ever appeared on-chain" for batches of
/// addresses.
///
/// Implementations must return exactly one boolean per input address, in
/// input order, without deduplicating repeated addresses. Any transport or
/// service failure surfaces as `OracleUnavailable`; no retries happen at
/// this layer.
pub trait ExistenceOracle {
    fn check_active(&self, addresses: &[String]) -> ShardWalletResult<Vec<bool>>;
}
