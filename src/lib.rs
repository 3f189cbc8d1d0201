//! shardwallet Core Library
//!
//! Wallet core for a multi-group (sharded) chain: deterministic address
//! derivation plus recovery of every address that has ever been used
//! on-chain.
//!
//! # Architecture
//!
//! This crate provides:
//! - **group**: deterministic address-to-group classification
//! - **wallet**: key generation and gap-limit address derivation
//! - **discovery**: the multi-group active-address discovery engine
//! - **api**: the existence-oracle contract and explorer backend client
//!
//! # Security
//!
//! This crate uses `zeroize` to clear seed material from memory, and the
//! logging layer redacts mnemonics and partially redacts addresses.
//!
//! # Example
//!
//! ```rust,ignore
//! use shardwallet::{DiscoveryEngine, ExplorerClient, wallet};
//!
//! let master = wallet::master_key_from_mnemonic(&phrase)?;
//! let client = ExplorerClient::new("https://explorer.example.org/api");
//! let active = DiscoveryEngine::new(&client).discover(&master, &[], 5)?;
//! ```

pub mod api;
pub mod discovery;
pub mod error;
pub mod group;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export key types for convenience
pub use api::{ExistenceOracle, ExplorerClient};
pub use discovery::{DiscoveryConfig, DiscoveryEngine};
pub use error::{ErrorCode, ShardWalletError, ShardWalletResult};
pub use group::{group_of_address, is_address_valid};
pub use types::*;

// Re-export wallet functions
pub use wallet::{
    create_wallet,
    derive_address_at,
    derive_in_group,
    derive_new_address,
    discovery_root,
    master_key_from_mnemonic,
};
