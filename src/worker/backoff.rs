use std::time::Duration;

/// Doubling delay for stream-setup retries: starts at one second, doubles on
/// each consecutive failure, and is clamped to the configured cap.
#[derive(Debug)]
pub struct ExponentialBackoff {
    current: Duration,
    max: Duration,
}

impl ExponentialBackoff {
    const INITIAL: Duration = Duration::from_secs(1);

    pub fn new(max: Duration) -> Self {
        Self {
            current: Self::INITIAL.min(max),
            max,
        }
    }

    /// Delay to sleep for the failure that just happened. Doubles the delay
    /// handed out on the next call.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    /// Back to one second, called after a stream opens successfully.
    pub fn reset(&mut self) {
        self.current = Self::INITIAL.min(self.max);
    }
}
