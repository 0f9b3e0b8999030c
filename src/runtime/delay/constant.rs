use super::{enforce_bounds, require_positive, Delay, DelayError};
use std::time::Duration;

/// Fixed wait between attempts until the projected total (`delay` x
/// `attempt`) would exceed `timeout`, after which the zero sentinel is
/// returned.
///
/// Stateless: the cutoff is projected from the attempt number, so the same
/// instance gives the same answer for the same attempt. Attempts start
/// at 1.
#[derive(Debug, Clone)]
pub struct Constant {
    delay: Duration,
    timeout: Duration,
}

impl Constant {
    pub fn new(delay: Duration, timeout: Duration) -> Result<Self, DelayError> {
        require_positive(delay, "delay")?;
        require_positive(timeout, "timeout")?;
        Ok(Constant { delay, timeout })
    }
}

impl Delay for Constant {
    fn next_delay(&mut self, attempt: u32) -> Duration {
        let projected = self.delay.checked_mul(attempt).unwrap_or(Duration::MAX);
        enforce_bounds(projected, self.timeout, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_spacing_until_cutoff() {
        let mut delay = Constant::new(Duration::from_secs(5), Duration::from_secs(50)).unwrap();

        let mut accrued = Duration::ZERO;
        let mut attempt = 1;
        loop {
            let next = delay.next_delay(attempt);
            if next.is_zero() {
                break;
            }
            assert_eq!(next, Duration::from_secs(5));
            accrued += next;
            attempt += 1;
        }
        assert_eq!(accrued, Duration::from_secs(50));
        assert_eq!(attempt, 11);
    }

    #[test]
    fn test_never_exceeds_timeout_for_large_attempts() {
        let timeout = Duration::from_secs(300);
        let mut delay = Constant::new(Duration::from_secs(7), timeout).unwrap();

        for attempt in 1..=10_000 {
            assert!(delay.next_delay(attempt) <= timeout);
        }
    }

    #[test]
    fn test_rejects_zero_configuration() {
        assert!(Constant::new(Duration::ZERO, Duration::from_secs(1)).is_err());
        assert!(Constant::new(Duration::from_secs(1), Duration::ZERO).is_err());
    }
}
