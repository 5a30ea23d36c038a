//! Bounded waits built on repeated searches.
//!
//! A probe returning `Ok(None)` is retried until the timeout; an `Err`
//! aborts the wait immediately.

use std::thread;
use std::time::Duration;

use dmsoft_utils::Stopwatch;
use tracing::debug;

use crate::Result;
use crate::args::{Found, Point, Rect};
use crate::pic_color::PicColor;
use crate::text_ocr::TextOcr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    Ready(T),
    TimedOut,
}

impl<T> WaitOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            WaitOutcome::Ready(value) => Some(value),
            WaitOutcome::TimedOut => None,
        }
    }
}

/// Call `probe` every `interval` until it yields a value or `timeout`
/// passes. The probe always runs at least once.
pub fn poll_until<T, F>(
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<WaitOutcome<T>>
where
    F: FnMut() -> Result<Option<T>>,
{
    let watch = Stopwatch::start_new();
    let interval = interval.max(Duration::from_millis(1));
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        if let Some(value) = probe()? {
            debug!(attempts, elapsed_ms = watch.elapsed_ms(), "wait satisfied");
            return Ok(WaitOutcome::Ready(value));
        }
        let remaining = watch.remaining(timeout);
        if remaining.is_zero() {
            debug!(attempts, elapsed_ms = watch.elapsed_ms(), "wait timed out");
            return Ok(WaitOutcome::TimedOut);
        }
        thread::sleep(interval.min(remaining));
    }
}

/// Waiting forms of the common searches, polled at
/// [`Invoke::poll_interval`](crate::Invoke::poll_interval).
pub trait WaitExt: PicColor + TextOcr {
    fn wait_color(
        &self,
        rect: Rect,
        color: &str,
        sim: f64,
        dir: i32,
        timeout: Duration,
    ) -> Result<WaitOutcome<Point>> {
        poll_until(timeout, self.poll_interval(), || {
            self.find_color(rect, color, sim, dir)
        })
    }

    fn wait_pic(
        &self,
        rect: Rect,
        pic_name: &str,
        delta_color: &str,
        sim: f64,
        dir: i32,
        timeout: Duration,
    ) -> Result<WaitOutcome<Found>> {
        poll_until(timeout, self.poll_interval(), || {
            self.find_pic(rect, pic_name, delta_color, sim, dir)
        })
    }

    fn wait_str(
        &self,
        rect: Rect,
        text: &str,
        color: &str,
        sim: f64,
        timeout: Duration,
    ) -> Result<WaitOutcome<Found>> {
        poll_until(timeout, self.poll_interval(), || {
            self.find_str(rect, text, color, sim)
        })
    }
}

impl<T: PicColor + TextOcr> WaitExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use dmsoft_bridge::{ConnectionError, MarshalError};

    #[test]
    fn test_ready_on_third_probe() {
        let mut calls = 0;
        let outcome = poll_until(Duration::from_secs(5), Duration::from_millis(1), || {
            calls += 1;
            Ok((calls == 3).then_some(calls))
        })
        .unwrap();
        assert_eq!(outcome, WaitOutcome::Ready(3));
    }

    #[test]
    fn test_zero_timeout_still_probes_once() {
        let mut calls = 0;
        let outcome: WaitOutcome<()> = poll_until(Duration::ZERO, Duration::from_millis(10), || {
            calls += 1;
            Ok(None)
        })
        .unwrap();
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_structural_error_aborts() {
        let mut calls = 0;
        let result: Result<WaitOutcome<()>> =
            poll_until(Duration::from_secs(5), Duration::from_millis(1), || {
                calls += 1;
                Err(Error::Connection(ConnectionError::Released))
            });
        assert!(matches!(
            result,
            Err(Error::Connection(ConnectionError::Released))
        ));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_marshal_error_is_not_retried() {
        let result: Result<WaitOutcome<()>> =
            poll_until(Duration::from_secs(5), Duration::from_millis(1), || {
                Err(MarshalError::EmptyText { param: "color" }.into())
            });
        assert!(result.is_err());
    }
}
