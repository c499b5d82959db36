use std::time::Duration;

/// Retry delay after the first failed fetch.
pub const RETRY_BASE: Duration = Duration::from_secs(10);
/// Longest wait between retries.
pub const RETRY_MAX: Duration = Duration::from_secs(300);

/// Doubling retry delay, capped, reset by the next success.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    base: Duration,
    max: Duration,
    failures: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(RETRY_BASE, RETRY_MAX)
    }
}

impl Backoff {
    #[must_use]
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            next: base,
            base,
            max: max.max(base),
            failures: 0,
        }
    }

    /// Records a failure and returns how long to wait before retrying.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = self.next.saturating_mul(2).min(self.max);
        self.failures = self.failures.saturating_add(1);
        delay
    }

    pub fn reset(&mut self) {
        self.next = self.base;
        self.failures = 0;
    }

    #[must_use]
    pub fn failures(&self) -> u32 {
        self.failures
    }
}
