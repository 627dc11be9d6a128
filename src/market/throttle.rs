//! Process-wide request spacing.
//!
//! The remote service throttles (and eventually bans) clients that exceed
//! roughly three requests per second. `RequestThrottle` serialises the
//! whole wait → send → stamp sequence under one lock, so the spacing
//! holds across any number of concurrent callers, not just per caller.

use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Default spacing between outbound requests (~3 req/s).
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(340);

/// Enforces a minimum interval between consecutive outbound requests.
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    /// Completion instant of the most recent request.
    last_request: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Run `request` once the spacing window has elapsed.
    ///
    /// The lock is held while waiting and while the request is in flight;
    /// the stamp is taken when the request completes.
    pub async fn run<F, Fut, T>(&self, request: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut last = self.last_request.lock().await;

        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                trace!(wait_ms = wait.as_millis() as u64, "Throttling request");
                tokio::time::sleep(wait).await;
            }
        }

        let output = request().await;
        *last = Some(Instant::now());
        output
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
