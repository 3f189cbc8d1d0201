//! Utilities Module
//!
//! Common utilities used across the crate.

mod rate_limiter;
pub mod http;
pub mod logging;

pub use rate_limiter::*;
