//! Token-bucket pacing for upstream requests.
//!
//! Every request a client sends first waits on its [`RequestPacer`]. Pacing
//! lives here rather than in the pagination or chunking loops, so those loops
//! stay plain sequential iteration.

use std::num::NonZeroU32;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

/// Shared token bucket: `requests_per_minute` refill, `burst` capacity.
pub struct RequestPacer {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl RequestPacer {
    /// Builds a pacer. Zero values are raised to 1.
    #[must_use]
    pub fn new(requests_per_minute: u32, burst: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(rate).allow_burst(burst);
        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Waits until the bucket has a token, then consumes it.
    pub async fn until_ready(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer").finish_non_exhaustive()
    }
}
