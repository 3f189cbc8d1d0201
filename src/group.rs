//! Group Classification
//!
//! Deterministic assignment of addresses to groups (shards). Two
//! implementations that disagree here would misclassify funds, so the hash
//! below is reproduced bit for bit: djb2 over the address payload, forced
//! odd, XOR-folded to a single byte, reduced modulo the group count.

use crate::error::{ShardWalletError, ShardWalletResult};

/// Length of the version/type prefix at the front of a decoded address.
const VERSION_PREFIX_LEN: usize = 1;

/// Minimum payload length after the version prefix.
const MIN_PAYLOAD_LEN: usize = 32;

/// Base58 alphabet used by address strings. The visually ambiguous
/// characters `0OIl` are excluded.
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Classify an address into a group id in `[0, group_count)`.
///
/// Pure and total over valid addresses; fails with `DecodeError` on
/// malformed input and `InvalidGroup` when `group_count` is zero.
pub fn group_of_address(address: &str, group_count: u32) -> ShardWalletResult<u32> {
    if group_count == 0 {
        return Err(ShardWalletError::invalid_group("Group count must be non-zero"));
    }

    let payload = decode_address_payload(address)?;
    let value = djb2(&payload) | 1;
    let hash = xor_fold(value);

    Ok(hash % group_count)
}

/// Check whether a string is a well-formed address: non-empty, restricted
/// Base58 alphabet, and at least 32 payload bytes after the version prefix.
pub fn is_address_valid(address: &str) -> bool {
    !address.is_empty()
        && address.chars().all(|c| BASE58_ALPHABET.contains(c))
        && decode_address_payload(address).is_ok()
}

/// Decode an address string and strip the version prefix.
fn decode_address_payload(address: &str) -> ShardWalletResult<Vec<u8>> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| ShardWalletError::decode_error(format!("Invalid address encoding: {}", e)))?;

    if bytes.len() < VERSION_PREFIX_LEN + MIN_PAYLOAD_LEN {
        return Err(ShardWalletError::decode_error(format!(
            "Address payload too short: {} bytes",
            bytes.len().saturating_sub(VERSION_PREFIX_LEN)
        )));
    }

    Ok(bytes[VERSION_PREFIX_LEN..].to_vec())
}

/// djb2: seed 5381, `acc = acc * 33 + byte` with 32-bit wraparound.
fn djb2(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(5381u32, |acc, b| acc.wrapping_mul(33).wrapping_add(u32::from(*b)))
}

/// XOR the bytes at bit offsets 24, 16, 8 and 0 into a single byte value.
fn xor_fold(value: u32) -> u32 {
    ((value >> 24) ^ (value >> 16) ^ (value >> 8) ^ value) & 0xFF
}
