//! # Reinvocation Delay Strategies
//!
//! Calculators that map an attempt count to the wait before the next
//! invocation of a continuation chain. All of them share one contract:
//! [`Delay::next_delay`] returns the wait for the given attempt, and
//! `Duration::ZERO` once the calculator's configured timeout budget is
//! exhausted. The zero sentinel means "stop retrying", never "retry
//! immediately".
//!
//! Accruing calculators ([`MultipleOf`], [`ShiftByMultipleOf`],
//! [`Exponential`], [`Blended`]) carry running state across calls, which is
//! why [`Delay::next_delay`] takes `&mut self`: a calculator instance
//! belongs to exactly one continuation chain and is constructed fresh for
//! the next one. Stateless calculators get the same signature for free.
//!
//! Phases can be blended into a composite schedule:
//!
//! ```
//! use provisionflow::runtime::delay::{Blended, Constant, Delay, ShiftByMultipleOf};
//! use std::time::Duration;
//!
//! // five-second probes for the first 20 seconds, then an increasing
//! // wait floor up to 220 seconds
//! let mut delay = Blended::of()
//!     .add(Constant::new(Duration::from_secs(5), Duration::from_secs(20)).unwrap())
//!     .add(
//!         ShiftByMultipleOf::new(Duration::from_secs(5), Duration::from_secs(220), 2)
//!             .unwrap(),
//!     )
//!     .build();
//!
//! let mut attempt = 1;
//! let mut waits = Vec::new();
//! loop {
//!     let next = delay.next_delay(attempt);
//!     if next.is_zero() {
//!         break;
//!     }
//!     waits.push(next.as_secs());
//!     attempt += 1;
//! }
//! assert_eq!(waits, vec![5, 5, 5, 5, 40, 90, 150, 220]);
//! ```

use std::time::Duration;
use thiserror::Error;

pub mod blended;
pub mod capped_exponential;
pub mod constant;
pub mod exponential;
pub mod multiple_of;

pub use blended::{Blended, BlendedBuilder};
pub use capped_exponential::CappedExponential;
pub use constant::Constant;
pub use exponential::Exponential;
pub use multiple_of::{MultipleOf, ShiftByMultipleOf};

/// Rejected delay configuration. Raised at construction time, never at
/// call time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid delay configuration: {0}")]
pub struct DelayError(String);

impl DelayError {
    pub(crate) fn new<S: Into<String>>(message: S) -> Self {
        DelayError(message.into())
    }
}

/// Maps an attempt count to the wait before the next invocation.
///
/// Attempt numbering is calculator-specific: the constant and multiple
/// families expect attempts starting at 1, the exponential families accept
/// attempt 0 (see each calculator's docs). Implementations document which
/// convention they use rather than assuming a shared one.
pub trait Delay {
    /// Next wait for `attempt`, or `Duration::ZERO` once this calculator's
    /// timeout budget is exhausted.
    fn next_delay(&mut self, attempt: u32) -> Duration;
}

/// Zero once `accrued` exceeds `timeout`, otherwise `next`.
pub(crate) fn enforce_bounds(accrued: Duration, timeout: Duration, next: Duration) -> Duration {
    if accrued > timeout {
        Duration::ZERO
    } else {
        next
    }
}

/// Shared constructor checks for positive delay and timeout values.
pub(crate) fn require_positive(value: Duration, name: &str) -> Result<(), DelayError> {
    if value.is_zero() {
        Err(DelayError::new(format!("{name} must be > 0")))
    } else {
        Ok(())
    }
}
