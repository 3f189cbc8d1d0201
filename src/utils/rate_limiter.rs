//! Rate Limiter
//!
//! Token bucket rate limiting for explorer calls, one bucket per domain.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Token bucket rate limiter keyed by domain
pub struct RateLimiter {
    buckets: HashMap<String, Bucket>,
    default_rate: u32,
    default_period: Duration,
}

struct Bucket {
    tokens: u32,
    max_tokens: u32,
    last_refill: Instant,
    refill_period: Duration,
    tokens_per_refill: u32,
}

impl RateLimiter {
    /// Create a new rate limiter with default settings
    /// `rate` is the number of requests allowed per `period`
    pub fn new(rate: u32, period_seconds: u64) -> Self {
        Self {
            buckets: HashMap::new(),
            default_rate: rate,
            default_period: Duration::from_secs(period_seconds),
        }
    }

    /// Check if a request is allowed for the given key
    pub fn check(&mut self, key: &str) -> bool {
        let bucket = self.buckets.entry(key.to_string()).or_insert_with(|| Bucket {
            tokens: self.default_rate,
            max_tokens: self.default_rate,
            last_refill: Instant::now(),
            refill_period: self.default_period,
            tokens_per_refill: self.default_rate,
        });

        // Refill tokens based on elapsed time
        let elapsed = bucket.last_refill.elapsed();
        if elapsed >= bucket.refill_period {
            let refills = (elapsed.as_millis() / bucket.refill_period.as_millis()) as u32;
            let new_tokens = bucket.tokens.saturating_add(refills * bucket.tokens_per_refill);
            bucket.tokens = new_tokens.min(bucket.max_tokens);
            bucket.last_refill = Instant::now();
        }

        // Try to consume a token
        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Get time until next allowed request
    pub fn time_until_allowed(&self, key: &str) -> Option<Duration> {
        self.buckets.get(key).and_then(|bucket| {
            if bucket.tokens > 0 {
                None
            } else {
                let elapsed = bucket.last_refill.elapsed();
                if elapsed < bucket.refill_period {
                    Some(bucket.refill_period - elapsed)
                } else {
                    None
                }
            }
        })
    }
}
