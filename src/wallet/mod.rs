//! Wallet Module
//!
//! Handles wallet creation, restoration and grouped address derivation.

mod derivation;
mod keygen;

pub use derivation::*;
pub use keygen::*;
