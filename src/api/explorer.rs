//! Explorer Backend Client
//!
//! HTTP implementation of the existence oracle. Requests are paginated at a
//! fixed page size and issued sequentially; results are concatenated in
//! input order.

use serde::Deserialize;

use crate::error::{ShardWalletError, ShardWalletResult};
use crate::types::QUERY_PAGE_SIZE;
use crate::utils::http;

use super::ExistenceOracle;

/// Client for the explorer backend's `POST /addresses/active` endpoint.
///
/// The endpoint accepts an ordered list of address strings (up to the page
/// size) and returns a same-length, same-order list of booleans.
pub struct ExplorerClient {
    base_url: String,
    page_size: usize,
}

impl ExplorerClient {
    /// Create a client with the default page size.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            page_size: QUERY_PAGE_SIZE,
        }
    }

    /// Override the page size, e.g. for a backend with tighter limits.
    pub fn with_page_size(mut self, page_size: usize) -> ShardWalletResult<Self> {
        if page_size == 0 {
            return Err(ShardWalletError::invalid_input(
                "Page size must be non-zero",
            ));
        }
        self.page_size = page_size;
        Ok(self)
    }

    fn post_page(&self, page: &[String]) -> ShardWalletResult<Vec<bool>> {
        let url = format!("{}/addresses/active", self.base_url.trim_end_matches('/'));

        let response = http::post_json(&url, &page).map_err(|e| {
            ShardWalletError::oracle_unavailable("Explorer backend unreachable")
                .with_details(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShardWalletError::oracle_unavailable(format!(
                "Explorer backend returned HTTP {}",
                status
            )));
        }

        // Strict schema: a JSON array of booleans, one per queried address.
        let flags: ActiveFlags = response.json().map_err(|e| {
            ShardWalletError::oracle_unavailable("Malformed explorer response")
                .with_details(e.to_string())
        })?;

        if flags.0.len() != page.len() {
            return Err(ShardWalletError::oracle_unavailable(format!(
                "Explorer answered {} flags for {} addresses",
                flags.0.len(),
                page.len()
            )));
        }

        Ok(flags.0)
    }
}

#[derive(Debug, Deserialize)]
struct ActiveFlags(Vec<bool>);

impl ExistenceOracle for ExplorerClient {
    fn check_active(&self, addresses: &[String]) -> ShardWalletResult<Vec<bool>> {
        let mut results = Vec::with_capacity(addresses.len());

        for page in addresses.chunks(self.page_size) {
            results.extend(self.post_page(page)?);
        }

        Ok(results)
    }
}
