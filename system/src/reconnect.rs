use std::time::Duration;

const DEFAULT_BASE_DELAY_MS: u64 = 500;
const DEFAULT_MAX_DELAY_MS: u64 = 15_000;

/// Doubling reconnect delay with a cap. Reset when a connection succeeds.
/// Messages sent while disconnected are dropped, not queued; only the
/// connection attempt itself is retried.
#[derive(Debug)]
pub struct ReconnectBackoff {
    base: Duration,
    max: Duration,
    current: Option<Duration>,
}

impl ReconnectBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            current: None,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let next = match self.current {
            None => self.base,
            Some(current) => std::cmp::min(current * 2, self.max),
        };
        self.current = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        )
    }
}
