use crate::runtime::action::Action;
use crate::runtime::error::ErrorCode;
use crate::runtime::request::Credentials;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub const METRIC_NAMESPACE_ROOT: &str = "ProvisionFlow";
pub const METRIC_NAME_HANDLER_EXCEPTION: &str = "HandlerException";
pub const METRIC_NAME_HANDLER_DURATION: &str = "HandlerInvocationDuration";
pub const METRIC_NAME_HANDLER_INVOCATION_COUNT: &str = "HandlerInvocationCount";

/// Namespace suffix for a resource type, e.g.
/// `Org::Service::Widget` -> `Org/Service/Widget`.
pub fn resource_namespace(resource_type: &str) -> String {
    resource_type.replace("::", "/")
}

/// Publishes operational metrics for handler invocations.
///
/// Every method is fire-and-forget: implementations must swallow delivery
/// failures (queue, drop, or log) and must never block the invocation path.
/// Default bodies are no-ops so publishers only implement what they carry.
pub trait MetricsPublisher: Send + Sync {
    /// Rebind to the credentials supplied with the current invocation.
    fn refresh(&self, _credentials: &Credentials) {}

    fn publish_invocation_metric(&self, _timestamp: DateTime<Utc>, _action: Action) {}

    fn publish_duration_metric(
        &self,
        _timestamp: DateTime<Utc>,
        _action: Action,
        _milliseconds: u64,
    ) {
    }

    fn publish_exception_metric(
        &self,
        _timestamp: DateTime<Utc>,
        _action: Action,
        _error_code: ErrorCode,
    ) {
    }
}

/// Fans metrics out to every registered publisher.
///
/// The platform and the provider each get their own copy of the same
/// datapoints; an empty proxy is a valid (silent) publisher.
#[derive(Default)]
pub struct MetricsProxy {
    publishers: Vec<Arc<dyn MetricsPublisher>>,
}

impl MetricsProxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_publisher(&mut self, publisher: Arc<dyn MetricsPublisher>) {
        self.publishers.push(publisher);
    }
}

impl MetricsPublisher for MetricsProxy {
    fn refresh(&self, credentials: &Credentials) {
        for publisher in &self.publishers {
            publisher.refresh(credentials);
        }
    }

    fn publish_invocation_metric(&self, timestamp: DateTime<Utc>, action: Action) {
        for publisher in &self.publishers {
            publisher.publish_invocation_metric(timestamp, action);
        }
    }

    fn publish_duration_metric(&self, timestamp: DateTime<Utc>, action: Action, milliseconds: u64) {
        for publisher in &self.publishers {
            publisher.publish_duration_metric(timestamp, action, milliseconds);
        }
    }

    fn publish_exception_metric(
        &self,
        timestamp: DateTime<Utc>,
        action: Action,
        error_code: ErrorCode,
    ) {
        for publisher in &self.publishers {
            publisher.publish_exception_metric(timestamp, action, error_code);
        }
    }
}
