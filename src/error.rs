//! Unified error types for shardwallet
//!
//! All errors flow through this module for consistent handling
//! and machine-readable error reporting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all shardwallet operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardWalletError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ShardWalletError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn decode_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DecodeError, msg)
    }

    pub fn invalid_group(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidGroup, msg)
    }

    pub fn derivation_exhausted(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DerivationExhausted, msg)
    }

    pub fn oracle_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::OracleUnavailable, msg)
    }

    pub fn discovery_exceeded_budget(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DiscoveryExceededBudget, msg)
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for ShardWalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ShardWalletError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    InvalidMnemonic,

    // Address errors
    DecodeError,

    // Derivation errors
    InvalidGroup,
    DerivationExhausted,

    // Discovery errors
    OracleUnavailable,
    DiscoveryExceededBudget,

    // Network errors
    NetworkError,
    Timeout,

    // Crypto errors
    CryptoError,

    // Parse errors
    JsonError,

    // Internal
    Internal,
}

/// Result type alias for shardwallet operations
pub type ShardWalletResult<T> = Result<T, ShardWalletError>;

// Conversions from common error types

impl From<serde_json::Error> for ShardWalletError {
    fn from(e: serde_json::Error) -> Self {
        ShardWalletError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<std::io::Error> for ShardWalletError {
    fn from(e: std::io::Error) -> Self {
        ShardWalletError::new(ErrorCode::Internal, e.to_string())
    }
}

impl From<bs58::decode::Error> for ShardWalletError {
    fn from(e: bs58::decode::Error) -> Self {
        ShardWalletError::new(ErrorCode::DecodeError, format!("Base58 error: {}", e))
    }
}

impl From<reqwest::Error> for ShardWalletError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ShardWalletError::new(ErrorCode::Timeout, "Request timed out")
        } else if e.is_connect() {
            ShardWalletError::new(ErrorCode::NetworkError, "Connection failed")
        } else {
            ShardWalletError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}

impl From<bitcoin::bip32::Error> for ShardWalletError {
    fn from(e: bitcoin::bip32::Error) -> Self {
        ShardWalletError::new(ErrorCode::CryptoError, format!("BIP32 error: {}", e))
    }
}

impl From<bip39::Error> for ShardWalletError {
    fn from(e: bip39::Error) -> Self {
        ShardWalletError::new(ErrorCode::InvalidMnemonic, format!("BIP39 error: {}", e))
    }
}
