use std::time::Duration;
use tokio::time::Instant;

/// Runtime metadata for one invocation of the hosting process.
///
/// Carries the wall-clock execution budget the host grants this invocation
/// and the reference under which the host can be re-invoked later.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    target_ref: String,
    deadline: Instant,
}

impl InvocationContext {
    /// Context with `budget` of execution time remaining from now.
    pub fn new<S: Into<String>>(target_ref: S, budget: Duration) -> Self {
        InvocationContext {
            target_ref: target_ref.into(),
            deadline: Instant::now() + budget,
        }
    }

    /// Reference the continuation scheduler should arm re-invocations
    /// against.
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    /// Execution time left before the host kills this process. Zero once
    /// the deadline has passed.
    pub fn remaining_time(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}
