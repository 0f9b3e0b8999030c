use crate::runtime::error::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Where an invocation chain currently stands from the caller's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    InProgress,
    Success,
    Failed,
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationStatus::Pending => "PENDING",
            OperationStatus::InProgress => "IN_PROGRESS",
            OperationStatus::Success => "SUCCESS",
            OperationStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Outcome of a single handler invocation.
///
/// Produced exactly once per invocation and read-only afterwards.
/// `callback_delay_seconds` and `callback_state` are only meaningful while
/// `status` is IN_PROGRESS: the state is round-tripped to the next
/// invocation, the delay tells the processor how long to wait before it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub status: OperationStatus,

    /// Present iff `status` is FAILED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Opaque handler-defined state carried to the next invocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_state: Option<Value>,

    #[serde(default)]
    pub callback_delay_seconds: u64,

    /// Final or intermediate resource representation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<Value>,

    /// Result set for LIST actions.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub resource_models: Vec<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl ProgressEvent {
    fn with_status(status: OperationStatus) -> Self {
        ProgressEvent {
            status,
            error_code: None,
            message: None,
            callback_state: None,
            callback_delay_seconds: 0,
            resource_model: None,
            resource_models: Vec::new(),
            next_token: None,
        }
    }

    /// Terminal success, with the final resource representation.
    pub fn success(resource_model: Option<Value>) -> Self {
        let mut event = Self::with_status(OperationStatus::Success);
        event.resource_model = resource_model;
        event
    }

    /// Terminal failure with a classified error code.
    pub fn failed<S: Into<String>>(error_code: ErrorCode, message: S) -> Self {
        let mut event = Self::with_status(OperationStatus::Failed);
        event.error_code = Some(error_code);
        event.message = Some(message.into());
        event
    }

    /// Stabilization in progress; re-invoke after `delay_seconds` with
    /// `callback_state` round-tripped.
    pub fn in_progress(
        callback_state: Option<Value>,
        delay_seconds: u64,
        resource_model: Option<Value>,
    ) -> Self {
        let mut event = Self::with_status(OperationStatus::InProgress);
        event.callback_state = callback_state;
        event.callback_delay_seconds = delay_seconds;
        event.resource_model = resource_model;
        event
    }

    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }

    pub fn is_failed(&self) -> bool {
        self.status == OperationStatus::Failed
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == OperationStatus::InProgress
    }

    /// IN_PROGRESS with no requested delay: the chain can continue
    /// immediately within the same invocation.
    pub fn can_continue_progress(&self) -> bool {
        self.is_in_progress() && self.callback_delay_seconds == 0
    }

    /// Applies `func` when the chain can continue immediately, otherwise
    /// passes the event through unchanged.
    pub fn then<F>(self, func: F) -> Self
    where
        F: FnOnce(ProgressEvent) -> ProgressEvent,
    {
        if self.can_continue_progress() {
            func(self)
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors() {
        let event = ProgressEvent::success(Some(json!({"id": "r-1"})));
        assert!(event.is_success());
        assert_eq!(event.resource_model, Some(json!({"id": "r-1"})));
        assert!(event.error_code.is_none());

        let event = ProgressEvent::failed(ErrorCode::NotFound, "no such resource");
        assert!(event.is_failed());
        assert_eq!(event.error_code, Some(ErrorCode::NotFound));

        let event = ProgressEvent::in_progress(Some(json!({"step": 2})), 30, None);
        assert!(event.is_in_progress());
        assert_eq!(event.callback_delay_seconds, 30);
    }

    #[test]
    fn test_then_only_fires_on_immediate_progress() {
        let event = ProgressEvent::in_progress(None, 0, None)
            .then(|_| ProgressEvent::success(None));
        assert!(event.is_success());

        let event = ProgressEvent::in_progress(None, 30, None)
            .then(|_| ProgressEvent::success(None));
        assert!(event.is_in_progress());

        let event = ProgressEvent::failed(ErrorCode::InternalFailure, "nope")
            .then(|_| ProgressEvent::success(None));
        assert!(event.is_failed());
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let event = ProgressEvent::success(None);
        let value = serde_json::to_value(&event).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("errorCode"));
        assert!(!object.contains_key("resourceModel"));
        assert!(!object.contains_key("resourceModels"));
        assert_eq!(object["status"], json!("SUCCESS"));
    }
}
