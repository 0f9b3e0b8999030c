use super::{require_positive, Delay, DelayError};
use std::time::{Duration, Instant};

/// Exponential waits between `min_delay` and `max_delay`, with a wall-clock
/// cutoff measured from construction rather than from accrued wait time.
///
/// Attempt 0 always yields `min_delay`; attempt `n` (n >= 1) yields
/// `min_delay * power_by ^ (n - 1)` capped at `max_delay`. Once `timeout`
/// has elapsed since the calculator was built, the zero sentinel is
/// returned regardless of attempt.
///
/// The wall-clock cutoff makes this the right choice when the waits happen
/// outside the calculator (e.g. remote stabilization polls): the budget
/// burns down with real time, not with the sum of suggested delays.
#[derive(Debug, Clone)]
pub struct CappedExponential {
    min_delay: Duration,
    max_delay: Duration,
    timeout: Duration,
    power_by: f64,
    started_at: Instant,
}

impl CappedExponential {
    pub fn new(
        min_delay: Duration,
        max_delay: Duration,
        timeout: Duration,
        power_by: f64,
    ) -> Result<Self, DelayError> {
        require_positive(min_delay, "min_delay")?;
        require_positive(max_delay, "max_delay")?;
        require_positive(timeout, "timeout")?;
        if power_by < 1.0 {
            return Err(DelayError::new("power_by must be >= 1.0"));
        }
        if max_delay < min_delay {
            return Err(DelayError::new("max_delay must be >= min_delay"));
        }
        Ok(CappedExponential {
            min_delay,
            max_delay,
            timeout,
            power_by,
            started_at: Instant::now(),
        })
    }
}

impl Delay for CappedExponential {
    fn next_delay(&mut self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.min_delay;
        }
        if self.started_at.elapsed() > self.timeout {
            return Duration::ZERO;
        }
        let millis = self.min_delay.as_millis() as f64 * self.power_by.powi(attempt as i32 - 1);
        let next = Duration::from_millis(millis.round() as u64);
        next.min(self.max_delay)
    }
}
