//! Per-principal, per-function token-bucket rate limiting (spec.md
//! §4.7). Uses a plain [`std::sync::Mutex`]-guarded table rather than a
//! crate dependency: the pack shows no shared concurrent-map crate for
//! this kind of counter, and the critical section here is a handful of
//! arithmetic operations.

use crate::error::AuthError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// A token bucket per `(principal, function)` pair. Bursts above the
/// configured capacity are tolerated by letting tokens go negative
/// until the shortfall refills.
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    buckets: Mutex<HashMap<(String, String), Bucket>>,
}

impl RateLimiter {
    /// Construct a limiter allowing `capacity` requests per principal
    /// per function, refilling at `refill_per_sec` tokens/second.
    pub fn new(capacity: u32, refill_per_sec: u32) -> Self {
        Self {
            capacity: capacity as f64,
            refill_per_sec: refill_per_sec as f64,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Consume one token for `(principal_id, function_id)`, or reject
    /// with [`AuthError::RateLimited`] and a positive `retry_after_secs`.
    pub fn check(&self, principal_id: &str, function_id: &str) -> Result<(), AuthError> {
        let key = (principal_id.to_string(), function_id.to_string());
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();
        let bucket = buckets
            .entry(key)
            .or_insert_with(|| Bucket { tokens: self.capacity, last_refill: now });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let deficit = 1.0 - bucket.tokens;
            let retry_after_secs = (deficit / self.refill_per_sec).ceil().max(1.0) as u64;
            Err(AuthError::RateLimited { retry_after_secs })
        }
    }
}
