//! Shared types for shardwallet
//!
//! All data structures that cross module boundaries are defined here
//! for consistent serialization.

use serde::{Deserialize, Serialize};

use crate::error::ShardWalletResult;
use crate::group;

// =============================================================================
// Constants
// =============================================================================

/// Total number of groups (shards) the address space is partitioned into.
///
/// Changing this value changes which group every address classifies to, so it
/// must match the network the wallet talks to.
pub const TOTAL_GROUPS: u32 = 4;

/// Default gap limit: a group is fully scanned once this many consecutive
/// derived addresses have no on-chain activity.
pub const DEFAULT_GAP_LIMIT: usize = 5;

/// Maximum number of addresses per existence-check request page.
pub const QUERY_PAGE_SIZE: usize = 80;

/// Default cap on addresses accepted per group in one discovery run.
/// A run that exceeds it fails with `DiscoveryExceededBudget`.
pub const DEFAULT_GROUP_SCAN_BUDGET: usize = 1_000;

/// BIP44 coin type used in the derivation path `m/44'/{coin}'/0'/0/{index}`.
pub const BIP44_COIN_TYPE: u32 = 1234;

// =============================================================================
// Address Types
// =============================================================================

/// A derived address together with the index it was derived at.
///
/// Produced by the deriver, immutable once created. The group id is not
/// stored: it is always recomputed from the address bytes so the two can
/// never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressKeyPair {
    /// Derivation index (non-hardened child of the discovery root).
    pub index: u32,
    /// Base58 address string: version byte followed by the public key digest.
    pub hash: String,
    /// Compressed secp256k1 public key, hex encoded.
    pub public_key: String,
}

impl AddressKeyPair {
    /// Group this address classifies to under `group_count` shards.
    pub fn group(&self, group_count: u32) -> ShardWalletResult<u32> {
        group::group_of_address(&self.hash, group_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_key_pair_roundtrip() {
        let pair = AddressKeyPair {
            index: 7,
            hash: "1GCX9sA4nrzgt163dciR4vXkFCG3RQcqHSpgHBbaZnYh8".to_string(),
            public_key: "02f4df48cc9327a4c37822ec84f207c082f6a75aa9498db68f721c6604f6730e71"
                .to_string(),
        };

        let json = serde_json::to_string(&pair).unwrap();
        let back: AddressKeyPair = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pair);
    }
}
