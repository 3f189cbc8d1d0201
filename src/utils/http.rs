//! HTTP Client with Connection Pooling
//!
//! Provides a global HTTP client with:
//! - Connection pooling for better performance
//! - Built-in rate limiting per endpoint domain; throttled requests wait
//!   for the token bucket to refill instead of failing

use reqwest::blocking::Client;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use crate::error::{ShardWalletError, ShardWalletResult};

/// Global HTTP client instance - lazy initialized
static GLOBAL_CLIENT: OnceLock<Arc<HttpClientPool>> = OnceLock::new();

/// HTTP Client Pool with connection reuse
pub struct HttpClientPool {
    /// Default client for general use
    default_client: Client,
    /// Rate limiter per domain
    rate_limiter: Mutex<super::RateLimiter>,
}

impl HttpClientPool {
    /// Create a new HTTP client pool
    fn new() -> ShardWalletResult<Self> {
        let default_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .user_agent("shardwallet/0.1")
            .build()
            .map_err(|e| ShardWalletError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            default_client,
            rate_limiter: Mutex::new(super::RateLimiter::new(10, 1)), // 10 req/sec default
        })
    }

    /// Get the default HTTP client
    pub fn client(&self) -> &Client {
        &self.default_client
    }

    /// Make a POST request with rate limiting
    pub fn post_json<T: serde::Serialize>(
        &self,
        url: &str,
        body: &T,
    ) -> ShardWalletResult<reqwest::blocking::Response> {
        self.wait_for_rate_limit(url)?;

        self.default_client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| ShardWalletError::network(format!("POST request failed: {}", e)))
    }

    /// Block until the domain's token bucket allows the request. Throttling
    /// delays a call, it never fails one; the lock is released while
    /// sleeping so other threads are not held up.
    fn wait_for_rate_limit(&self, url: &str) -> ShardWalletResult<()> {
        let domain = extract_domain(url);

        loop {
            let wait = {
                let mut limiter = self
                    .rate_limiter
                    .lock()
                    .map_err(|_| ShardWalletError::internal("Rate limiter lock poisoned"))?;

                if limiter.check(&domain) {
                    return Ok(());
                }
                limiter
                    .time_until_allowed(&domain)
                    .unwrap_or(Duration::from_millis(50))
            };
            std::thread::sleep(wait);
        }
    }
}

/// Get the global HTTP client pool
pub fn get_client_pool() -> &'static Arc<HttpClientPool> {
    GLOBAL_CLIENT.get_or_init(|| {
        // Only fails if rustls cannot initialize, which is unrecoverable.
        Arc::new(
            HttpClientPool::new()
                .expect("HTTP client pool initialization failed - check TLS configuration"),
        )
    })
}

/// Make a rate-limited POST request with JSON body
pub fn post_json<T: serde::Serialize>(
    url: &str,
    body: &T,
) -> ShardWalletResult<reqwest::blocking::Response> {
    get_client_pool().post_json(url, body)
}

/// Extract domain from URL for rate limiting
fn extract_domain(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or(url)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://explorer.example.org/addresses/active"),
            "explorer.example.org"
        );
        assert_eq!(extract_domain("http://localhost:9090/test"), "localhost:9090");
    }

    #[test]
    fn test_client_pool_creation() {
        let pool = get_client_pool();
        assert!(pool.client().get("https://example.com").build().is_ok());
    }

    #[test]
    fn test_rate_limit_waits_instead_of_failing() {
        // Fresh pool with its own bucket (10 tokens per second). Burning
        // through more than a bucket's worth of permits must delay the
        // overflow call, never error it.
        let pool = HttpClientPool::new().unwrap();
        let start = std::time::Instant::now();

        for _ in 0..11 {
            pool.wait_for_rate_limit("http://localhost:9090/addresses/active")
                .unwrap();
        }

        assert!(
            start.elapsed() >= Duration::from_millis(200),
            "11th permit should have waited for a refill"
        );
    }
}
