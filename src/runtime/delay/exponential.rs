use super::{require_positive, Delay, DelayError};
use std::time::Duration;

/// Exponentially growing waits of `power_by ^ attempt` seconds, floored at
/// `min_delay` and accrued against `timeout`.
///
/// Accruing: construct a fresh instance per continuation chain. Attempts
/// start at 0, so the first wait is one second (`power_by ^ 0`) unless the
/// floor lifts it.
#[derive(Debug, Clone)]
pub struct Exponential {
    min_delay: Duration,
    timeout: Duration,
    power_by: u32,
    accrued: Duration,
}

impl Exponential {
    pub fn new(min_delay: Duration, timeout: Duration, power_by: u32) -> Result<Self, DelayError> {
        require_positive(timeout, "timeout")?;
        if power_by < 2 {
            return Err(DelayError::new("power_by must be >= 2"));
        }
        if min_delay >= timeout {
            return Err(DelayError::new("min_delay must be < timeout"));
        }
        Ok(Exponential {
            min_delay,
            timeout,
            power_by,
            accrued: Duration::ZERO,
        })
    }
}

impl Delay for Exponential {
    fn next_delay(&mut self, attempt: u32) -> Duration {
        let seconds = f64::from(self.power_by).powi(attempt as i32).round();
        let next = Duration::from_secs(seconds as u64);
        self.accrued = self.accrued.saturating_add(next);

        if self.accrued < self.min_delay {
            self.min_delay
        } else if self.accrued > self.timeout {
            Duration::ZERO
        } else {
            next
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_powers_accrue_against_timeout() {
        let mut delay =
            Exponential::new(Duration::ZERO, Duration::from_secs(60), 2).unwrap();

        // 1 + 2 + 4 + 8 + 16 = 31, next power lands on 63 > 60
        assert_eq!(delay.next_delay(0), Duration::from_secs(1));
        assert_eq!(delay.next_delay(1), Duration::from_secs(2));
        assert_eq!(delay.next_delay(2), Duration::from_secs(4));
        assert_eq!(delay.next_delay(3), Duration::from_secs(8));
        assert_eq!(delay.next_delay(4), Duration::from_secs(16));
        assert_eq!(delay.next_delay(5), Duration::ZERO);
    }

    #[test]
    fn test_floor_lifts_small_accruals() {
        let mut delay =
            Exponential::new(Duration::from_secs(4), Duration::from_secs(100), 2).unwrap();

        // accrued 1, then 3, both under the 4s floor
        assert_eq!(delay.next_delay(0), Duration::from_secs(4));
        assert_eq!(delay.next_delay(1), Duration::from_secs(4));
        // accrued 7 clears the floor; the raw power is returned again
        assert_eq!(delay.next_delay(2), Duration::from_secs(4));
        assert_eq!(delay.next_delay(3), Duration::from_secs(8));
    }

    #[test]
    fn test_rejects_invalid_configuration() {
        assert!(Exponential::new(Duration::ZERO, Duration::from_secs(60), 1).is_err());
        assert!(Exponential::new(Duration::from_secs(60), Duration::from_secs(60), 2).is_err());
        assert!(Exponential::new(Duration::ZERO, Duration::ZERO, 2).is_err());
    }
}
