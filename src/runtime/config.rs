use std::time::Duration;

/// Tuning knobs for the reinvocation decision.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Requested callback delays at or above this are handed off to the
    /// external scheduler instead of waited out locally.
    pub local_reinvoke_threshold: Duration,

    /// The remaining execution budget must exceed the requested delay times
    /// this factor before a local wait is allowed, so the process is never
    /// killed mid-retry before it can hand off.
    pub budget_safety_factor: f64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            local_reinvoke_threshold: Duration::from_secs(60),
            budget_safety_factor: 1.2,
        }
    }
}
