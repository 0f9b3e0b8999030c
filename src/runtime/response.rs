use crate::runtime::error::ErrorCode;
use crate::runtime::progress::{OperationStatus, ProgressEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Final envelope returned to the caller for one invocation.
///
/// Field *presence* is the compatibility contract: absent fields are omitted
/// from the serialized form entirely, never emitted as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub operation_status: OperationStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<Value>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub resource_models: Vec<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl Response {
    pub fn from_progress(progress: ProgressEvent, bearer_token: Option<String>) -> Self {
        Response {
            operation_status: progress.status,
            bearer_token,
            error_code: progress.error_code,
            message: progress.message,
            resource_model: progress.resource_model,
            resource_models: progress.resource_models,
            next_token: progress.next_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_presence_based_serialization() {
        let response = Response::from_progress(
            ProgressEvent::success(Some(json!({"id": "r-1"}))),
            Some("token-9".to_string()),
        );
        let value = serde_json::to_value(&response).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object["operationStatus"], json!("SUCCESS"));
        assert_eq!(object["bearerToken"], json!("token-9"));
        assert_eq!(object["resourceModel"], json!({"id": "r-1"}));
        assert!(!object.contains_key("errorCode"));
        assert!(!object.contains_key("message"));
        assert!(!object.contains_key("resourceModels"));
        assert!(!object.contains_key("nextToken"));
    }

    #[test]
    fn test_failure_carries_code_and_token() {
        let response = Response::from_progress(
            ProgressEvent::failed(ErrorCode::InvalidRequest, "bad input"),
            Some("token-9".to_string()),
        );
        assert_eq!(response.operation_status, OperationStatus::Failed);
        assert_eq!(response.error_code, Some(ErrorCode::InvalidRequest));
        assert_eq!(response.bearer_token.as_deref(), Some("token-9"));
    }
}
