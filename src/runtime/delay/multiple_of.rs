use super::{enforce_bounds, require_positive, Delay, DelayError};
use std::time::Duration;

/// Waits that grow as a multiple of the base delay: attempt 1 waits
/// `delay`, attempt `n` (n >= 2) waits `delay * (n - 1) * multiple`,
/// accruing until the running total exceeds `timeout`.
///
/// Accruing: construct a fresh instance per continuation chain. Attempts
/// start at 1.
#[derive(Debug, Clone)]
pub struct MultipleOf {
    delay: Duration,
    timeout: Duration,
    multiple: u32,
    accrued: Duration,
}

impl MultipleOf {
    pub fn new(delay: Duration, timeout: Duration, multiple: u32) -> Result<Self, DelayError> {
        require_positive(delay, "delay")?;
        require_positive(timeout, "timeout")?;
        if multiple <= 1 {
            return Err(DelayError::new("multiple must be > 1"));
        }
        Ok(MultipleOf {
            delay,
            timeout,
            multiple,
            accrued: Duration::ZERO,
        })
    }

    pub(crate) fn accrued(&self) -> Duration {
        self.accrued
    }
}

impl Delay for MultipleOf {
    fn next_delay(&mut self, attempt: u32) -> Duration {
        if attempt < 2 {
            self.accrued = self.delay;
            return self.delay;
        }
        let next = self
            .delay
            .checked_mul((attempt - 1).saturating_mul(self.multiple))
            .unwrap_or(Duration::MAX);
        self.accrued = self.accrued.saturating_add(next);
        enforce_bounds(self.accrued, self.timeout, next)
    }
}

/// Like [`MultipleOf`], but returns the running accrued total instead of
/// the increment, producing a monotonically increasing wait floor.
///
/// Accruing: construct a fresh instance per continuation chain. Attempts
/// start at 1.
#[derive(Debug, Clone)]
pub struct ShiftByMultipleOf {
    inner: MultipleOf,
}

impl ShiftByMultipleOf {
    pub fn new(delay: Duration, timeout: Duration, multiple: u32) -> Result<Self, DelayError> {
        Ok(ShiftByMultipleOf {
            inner: MultipleOf::new(delay, timeout, multiple)?,
        })
    }
}

impl Delay for ShiftByMultipleOf {
    fn next_delay(&mut self, attempt: u32) -> Duration {
        let next = self.inner.next_delay(attempt);
        if next.is_zero() {
            next
        } else {
            self.inner.accrued()
        }
    }
}
