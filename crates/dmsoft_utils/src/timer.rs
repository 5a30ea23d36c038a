use std::time::{Duration, Instant};

/// Simple stopwatch helper for wall-clock measurements.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start_new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Time left until `budget` is used up, zero once exceeded.
    pub fn remaining(&self, budget: Duration) -> Duration {
        budget.saturating_sub(self.elapsed())
    }

    pub fn has_exceeded(&self, budget: Duration) -> bool {
        self.elapsed() >= budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_saturates() {
        let watch = Stopwatch::start_new();
        std::thread::sleep(Duration::from_millis(5));
        assert!(watch.has_exceeded(Duration::from_millis(1)));
        assert_eq!(watch.remaining(Duration::from_millis(1)), Duration::ZERO);
        assert!(watch.remaining(Duration::from_secs(60)) > Duration::from_secs(59));
    }
}
