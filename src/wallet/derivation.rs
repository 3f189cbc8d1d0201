//! Address Derivation
//!
//! Derives grouped addresses from a BIP32 master key. Which group an index
//! lands in is decided by the classifier hash alone, so deriving for a
//! target group is rejection sampling: walk the unused indices in order and
//! keep the addresses that classify to the wanted group.

use std::collections::BTreeSet;
use std::str::FromStr;

use bitcoin::bip32::{ChildNumber, DerivationPath, Xpriv};
use bitcoin::secp256k1::{All, Secp256k1};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use crate::error::{ShardWalletError, ShardWalletResult};
use crate::group;
use crate::types::{AddressKeyPair, BIP44_COIN_TYPE};

type Blake2b256 = Blake2b<U32>;

/// Version prefix prepended to the public key digest.
const ADDRESS_VERSION: u8 = 0x00;

/// First hardened index; the derivable keyspace ends here.
const KEYSPACE_CEILING: u32 = 1 << 31;

/// Derive the discovery root `m/44'/{coin}'/0'/0` under which all wallet
/// addresses live as non-hardened children.
pub fn discovery_root(secp: &Secp256k1<All>, master: &Xpriv) -> ShardWalletResult<Xpriv> {
    let path = DerivationPath::from_str(&format!("m/44'/{}'/0'/0", BIP44_COIN_TYPE))?;
    Ok(master.derive_priv(secp, &path)?)
}

/// Derive the address record at a fixed index under the discovery root.
pub fn derive_address_at(
    secp: &Secp256k1<All>,
    root: &Xpriv,
    index: u32,
) -> ShardWalletResult<AddressKeyPair> {
    let child = ChildNumber::from_normal_idx(index).map_err(|_| {
        ShardWalletError::derivation_exhausted(format!(
            "Index {} outside the non-hardened keyspace",
            index
        ))
    })?;

    let derived = root.derive_priv(secp, &[child])?;
    let public_key = derived.private_key.public_key(secp);
    let compressed = public_key.serialize();

    Ok(AddressKeyPair {
        index,
        hash: address_from_public_key(&compressed),
        public_key: hex::encode(compressed),
    })
}

/// Derive `count` addresses that classify to `target_group`.
///
/// Indices are consumed in ascending order starting from the smallest one
/// not in `skip_indices`. Rejected indices are remembered for the duration
/// of this call so they are never rederived; only the accepted indices are
/// reported back to the caller through the returned pairs.
pub fn derive_in_group(
    secp: &Secp256k1<All>,
    root: &Xpriv,
    target_group: u32,
    group_count: u32,
    count: usize,
    skip_indices: &BTreeSet<u32>,
) -> ShardWalletResult<Vec<AddressKeyPair>> {
    if target_group >= group_count {
        return Err(ShardWalletError::invalid_group(format!(
            "Group {} out of range [0, {})",
            target_group, group_count
        )));
    }

    let mut attempted = skip_indices.clone();
    let mut accepted = Vec::with_capacity(count);

    while accepted.len() < count {
        let index = next_unused_index(&attempted)?;
        attempted.insert(index);

        let pair = derive_address_at(secp, root, index)?;
        if group::group_of_address(&pair.hash, group_count)? == target_group {
            accepted.push(pair);
        }
    }

    Ok(accepted)
}

/// Derive one new address in `target_group`, skipping the given indices.
pub fn derive_new_address(
    secp: &Secp256k1<All>,
    root: &Xpriv,
    target_group: u32,
    group_count: u32,
    skip_indices: &BTreeSet<u32>,
) -> ShardWalletResult<AddressKeyPair> {
    let mut batch = derive_in_group(secp, root, target_group, group_count, 1, skip_indices)?;
    Ok(batch.remove(0))
}

/// Base58 address for a compressed public key: version prefix followed by
/// the BLAKE2b-256 digest of the key bytes.
fn address_from_public_key(public_key: &[u8]) -> String {
    let digest = Blake2b256::digest(public_key);

    let mut bytes = Vec::with_capacity(1 + digest.len());
    bytes.push(ADDRESS_VERSION);
    bytes.extend_from_slice(&digest);

    bs58::encode(bytes).into_string()
}

/// Smallest non-negative index not present in `used`.
fn next_unused_index(used: &BTreeSet<u32>) -> ShardWalletResult<u32> {
    let mut candidate: u32 = 0;
    for &index in used {
        if index == candidate {
            candidate = candidate.checked_add(1).ok_or_else(|| {
                ShardWalletError::derivation_exhausted("Index space exhausted")
            })?;
        } else if index > candidate {
            break;
        }
    }

    if candidate >= KEYSPACE_CEILING {
        return Err(ShardWalletError::derivation_exhausted(
            "No non-hardened index left to derive",
        ));
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::wallet::master_key_from_mnemonic;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_root(secp: &Secp256k1<All>) -> Xpriv {
        let master = master_key_from_mnemonic(TEST_MNEMONIC).unwrap();
        discovery_root(secp, &master).unwrap()
    }

    #[test]
    fn test_golden_derivation_vectors() {
        let secp = Secp256k1::new();
        let root = test_root(&secp);

        let pair = derive_address_at(&secp, &root, 0).unwrap();
        assert_eq!(pair.hash, "1qUhzfi2GxZ3tV7tv9a4HoNu8azz7M4HkxTAi2erzLHS");
        assert_eq!(
            pair.public_key,
            "024739d2f1248040b3cd9b15a0d2877790b5ee57d526d99004fe41f4088dc890bb"
        );
        assert_eq!(pair.group(4).unwrap(), 3);

        let pair = derive_address_at(&secp, &root, 1).unwrap();
        assert_eq!(pair.hash, "1HZAyYQTHoR44JiMndj361mWgsyGUAHicUR6PbTkPxgKd");
        assert_eq!(pair.group(4).unwrap(), 1);

        let pair = derive_address_at(&secp, &root, 12).unwrap();
        assert_eq!(pair.hash, "19aEFKVjosxocFLYzmcvszXHH7o5rav9G76mqnoaAJfTh");
        assert_eq!(pair.group(4).unwrap(), 0);
    }

    #[test]
    fn test_derive_in_group_rejection_sampling() {
        let secp = Secp256k1::new();
        let root = test_root(&secp);

        // Indices 1, 2, 3, 4 are the first four landing in group 1.
        let batch = derive_in_group(&secp, &root, 1, 4, 4, &BTreeSet::new()).unwrap();
        let indices: Vec<u32> = batch.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);

        for pair in &batch {
            assert_eq!(pair.group(4).unwrap(), 1);
        }
    }

    #[test]
    fn test_derive_in_group_respects_skip_set() {
        let secp = Secp256k1::new();
        let root = test_root(&secp);

        let skip: BTreeSet<u32> = [1, 2].into_iter().collect();
        let batch = derive_in_group(&secp, &root, 1, 4, 2, &skip).unwrap();
        let indices: Vec<u32> = batch.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![3, 4]);
    }

    #[test]
    fn test_derive_new_address_takes_next_free_index_in_group() {
        let secp = Secp256k1::new();
        let root = test_root(&secp);

        // With nothing used, the first group-1 address sits at index 1.
        let pair = derive_new_address(&secp, &root, 1, 4, &BTreeSet::new()).unwrap();
        assert_eq!(pair.index, 1);
        assert_eq!(pair.group(4).unwrap(), 1);

        // With indices 0..=4 taken, the next group-1 address is index 6.
        let used: BTreeSet<u32> = (0..=4).collect();
        let pair = derive_new_address(&secp, &root, 1, 4, &used).unwrap();
        assert_eq!(pair.index, 6);
        assert_eq!(pair.group(4).unwrap(), 1);
    }

    #[test]
    fn test_derive_in_group_zero_count() {
        let secp = Secp256k1::new();
        let root = test_root(&secp);

        let batch = derive_in_group(&secp, &root, 0, 4, 0, &BTreeSet::new()).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_invalid_target_group() {
        let secp = Secp256k1::new();
        let root = test_root(&secp);

        let err = derive_in_group(&secp, &root, 4, 4, 1, &BTreeSet::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidGroup);
    }

    #[test]
    fn test_hardened_index_is_exhaustion() {
        let secp = Secp256k1::new();
        let root = test_root(&secp);

        let err = derive_address_at(&secp, &root, 1 << 31).unwrap_err();
        assert_eq!(err.code, ErrorCode::DerivationExhausted);
    }

    #[test]
    fn test_next_unused_index() {
        assert_eq!(next_unused_index(&BTreeSet::new()).unwrap(), 0);

        let used: BTreeSet<u32> = [0, 1, 2, 5].into_iter().collect();
        assert_eq!(next_unused_index(&used).unwrap(), 3);

        let used: BTreeSet<u32> = [1, 2, 3].into_iter().collect();
        assert_eq!(next_unused_index(&used).unwrap(), 0);
    }
}
