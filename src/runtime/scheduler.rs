use crate::runtime::request::{Credentials, HandlerRequest};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifies one armed continuation: the schedule rule and the invocation
/// target registered under it. Both halves travel in the serialized request
/// context so the next invocation can tear them down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuationHandle {
    pub rule_name: String,
    pub target_id: String,
}

impl ContinuationHandle {
    /// Fresh handle pair sharing one reschedule id.
    pub fn generate() -> Self {
        let reschedule_id = Uuid::new_v4();
        ContinuationHandle {
            rule_name: format!("reinvoke-handler-{reschedule_id}"),
            target_id: format!("reinvoke-target-{reschedule_id}"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct SchedulerError(pub String);

/// Arms (and tears down) future re-invocations of this same process.
///
/// Implementations bind the handle names and a one-time schedule expression
/// onto whatever event service actually fires the invocation; the runtime
/// only depends on this capability.
#[async_trait]
pub trait ContinuationScheduler: Send + Sync {
    /// Rebind to the credentials supplied with the current invocation.
    fn refresh(&self, _credentials: &Credentials) {}

    /// Arm a one-shot re-invocation of `target_ref` after
    /// `minutes_from_now`, delivering the serialized `request` (which
    /// already carries `handle` in its context) as the payload.
    async fn schedule(
        &self,
        target_ref: &str,
        minutes_from_now: u32,
        handle: &ContinuationHandle,
        request: &HandlerRequest,
    ) -> Result<(), SchedulerError>;

    /// Tear down a previously armed continuation. Idempotent: cancelling a
    /// handle that is already gone is a no-op, not an error.
    async fn cancel(&self, handle: &ContinuationHandle) -> Result<(), SchedulerError>;
}

/// One-time schedule expression for `minutes_from_now` minutes after
/// `from`, in the `cron(m H d M ? y)` form event schedulers accept.
///
/// An extra minute is added because the rule can be created just after a
/// minute boundary, which would otherwise schedule it into the past.
pub fn one_time_schedule_expression(from: DateTime<Utc>, minutes_from_now: u32) -> String {
    let fire_at = from + chrono::Duration::minutes(i64::from(minutes_from_now) + 1);
    format!(
        "cron({} {} {} {} ? {})",
        fire_at.minute(),
        fire_at.hour(),
        fire_at.day(),
        fire_at.month(),
        fire_at.year()
    )
}
