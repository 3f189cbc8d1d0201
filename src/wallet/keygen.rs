//! Key Generation
//!
//! Creates wallets from entropy or mnemonic phrases.
//!
//! SECURITY: All sensitive data (entropy, seeds) is zeroized on drop.

use bip39::Mnemonic;
use bitcoin::bip32::Xpriv;
use bitcoin::Network;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{ShardWalletError, ShardWalletResult};

/// Create a new wallet from random entropy.
///
/// Returns the mnemonic phrase together with the BIP32 master key.
///
/// SECURITY: Entropy is securely zeroized after mnemonic generation
pub fn create_wallet() -> ShardWalletResult<(String, Xpriv)> {
    // Use Zeroizing wrapper to ensure entropy is cleared on drop
    let mut entropy = Zeroizing::new([0u8; 16]); // 128 bits = 12 words
    OsRng.fill_bytes(entropy.as_mut());

    let mnemonic = Mnemonic::from_entropy(entropy.as_ref())
        .map_err(|e| ShardWalletError::crypto_error(format!("Failed to create mnemonic: {}", e)))?;

    let phrase = mnemonic.to_string();

    // Seed is 64 bytes - wrap in Zeroizing for automatic cleanup
    let seed = Zeroizing::new(mnemonic.to_seed(""));
    let master = Xpriv::new_master(Network::Bitcoin, seed.as_ref())?;

    Ok((phrase, master))
}

/// Restore the master key from a mnemonic phrase.
pub fn master_key_from_mnemonic(phrase: &str) -> ShardWalletResult<Xpriv> {
    master_key_from_mnemonic_with_passphrase(phrase, "")
}

/// Restore the master key from a mnemonic phrase with an optional
/// passphrase (BIP-39).
///
/// SECURITY: Seed is securely zeroized after key derivation
pub fn master_key_from_mnemonic_with_passphrase(
    phrase: &str,
    passphrase: &str,
) -> ShardWalletResult<Xpriv> {
    let mnemonic = Mnemonic::parse(phrase)?;

    let seed = Zeroizing::new(mnemonic.to_seed(passphrase));
    Ok(Xpriv::new_master(Network::Bitcoin, seed.as_ref())?)
}
