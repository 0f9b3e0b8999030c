use super::Delay;
use std::time::Duration;

/// Ordered sequence of sub-calculators forming a phase schedule.
///
/// Delegates to the first sub-calculator that still returns a non-zero
/// wait for the given attempt, advancing past exhausted ones and never
/// going back. Useful for blends like a handful of quick constant probes
/// followed by exponential backoff and a long constant tail.
///
/// Accruing (the phase cursor is state): construct a fresh instance per
/// continuation chain.
pub struct Blended {
    index: usize,
    in_order: Vec<Box<dyn Delay + Send>>,
}

impl Blended {
    pub fn of() -> BlendedBuilder {
        BlendedBuilder {
            in_order: Vec::new(),
        }
    }
}

pub struct BlendedBuilder {
    in_order: Vec<Box<dyn Delay + Send>>,
}

impl BlendedBuilder {
    pub fn add<D: Delay + Send + 'static>(mut self, delay: D) -> Self {
        self.in_order.push(Box::new(delay));
        self
    }

    pub fn build(self) -> Blended {
        Blended {
            index: 0,
            in_order: self.in_order,
        }
    }
}

impl Delay for Blended {
    fn next_delay(&mut self, attempt: u32) -> Duration {
        while self.index < self.in_order.len() {
            let next = self.in_order[self.index].next_delay(attempt);
            if !next.is_zero() {
                return next;
            }
            self.index += 1;
        }
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::delay::{Constant, ShiftByMultipleOf};

    #[test]
    fn test_first_phase_fully_drains_before_second() {
        let mut blended = Blended::of()
            .add(Constant::new(Duration::from_secs(5), Duration::from_secs(20)).unwrap())
            .add(
                ShiftByMultipleOf::new(Duration::from_secs(5), Duration::from_secs(220), 2)
                    .unwrap(),
            )
            .build();

        let mut waits = Vec::new();
        let mut attempt = 1;
        loop {
            let next = blended.next_delay(attempt);
            if next.is_zero() {
                break;
            }
            waits.push(next.as_secs());
            attempt += 1;
        }

        assert_eq!(waits, vec![5, 5, 5, 5, 40, 90, 150, 220]);
    }

    #[test]
    fn test_never_returns_to_an_exhausted_phase() {
        let mut blended = Blended::of()
            .add(Constant::new(Duration::from_secs(2), Duration::from_secs(4)).unwrap())
            .add(Constant::new(Duration::from_secs(9), Duration::from_secs(90)).unwrap())
            .build();

        // first phase exhausts at attempt 3 (2 * 3 > 4)
        assert_eq!(blended.next_delay(1), Duration::from_secs(2));
        assert_eq!(blended.next_delay(2), Duration::from_secs(2));
        assert_eq!(blended.next_delay(3), Duration::from_secs(9));
        // attempt 1 would fit the first phase again, but the cursor has moved on
        assert_eq!(blended.next_delay(1), Duration::from_secs(9));
    }

    #[test]
    fn test_empty_blend_is_exhausted() {
        let mut blended = Blended::of().build();
        assert_eq!(blended.next_delay(1), Duration::ZERO);
    }
}
