use crate::runtime::action::Action;
use crate::runtime::scheduler::ContinuationHandle;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Session credentials supplied by the caller for this invocation.
///
/// Treated as an opaque capability: the runtime only forwards them to
/// collaborators when rebinding at the start of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

/// Caller-supplied payload for one provisioning request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestData {
    /// Requested resource state. Required for CREATE/UPDATE/DELETE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_state: Option<Value>,

    /// Prior state for UPDATE diffs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_state: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

/// State threaded between invocations of one continuation chain.
///
/// Everything that must survive a hand-off travels here, serialized into the
/// scheduled payload; the process itself holds nothing across the boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Invocation counter for the chain. 0 marks a fresh request.
    #[serde(default)]
    pub invocation: u32,

    /// Opaque handler state from the previous invocation's progress result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_state: Option<Value>,

    /// Rule half of the armed continuation, cancelled on receipt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_rule_name: Option<String>,

    /// Target half of the armed continuation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_target_id: Option<String>,
}

/// One serialized provisioning request as received from the caller.
///
/// Immutable for the duration of an invocation, except that the processor
/// rewrites `request_context` (invocation count, callback state,
/// continuation handle) when it decides to re-invoke.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest {
    pub action: Action,

    /// Caller correlation id, echoed in every response for this chain.
    pub bearer_token: String,

    pub resource_type: String,

    /// Endpoint the caller listens on for progress reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_endpoint: Option<String>,

    #[serde(default)]
    pub request_data: RequestData,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_context: Option<RequestContext>,
}

impl HandlerRequest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// 1-based invocation count for this chain link. A request without a
    /// context is the chain's first link.
    pub fn invocation_count(&self) -> u32 {
        self.request_context
            .as_ref()
            .map(|context| context.invocation.max(1))
            .unwrap_or(1)
    }

    /// Whether this is the first invocation of the chain (no continuation
    /// context yet).
    pub fn is_first_invocation(&self) -> bool {
        self.request_context
            .as_ref()
            .map_or(true, |context| context.invocation == 0)
    }

    pub fn callback_state(&self) -> Option<&Value> {
        self.request_context
            .as_ref()
            .and_then(|context| context.callback_state.as_ref())
    }

    /// Continuation armed by a previous invocation, if any. Must be
    /// cancelled before this invocation proceeds.
    pub fn continuation_handle(&self) -> Option<ContinuationHandle> {
        let context = self.request_context.as_ref()?;
        match (&context.schedule_rule_name, &context.schedule_target_id) {
            (Some(rule_name), Some(target_id)) => Some(ContinuationHandle {
                rule_name: rule_name.clone(),
                target_id: target_id.clone(),
            }),
            _ => None,
        }
    }

    /// Rewrites the context for the next link in the chain: bumps the
    /// invocation count, carries the handler's callback state, and drops the
    /// already-cancelled continuation handle.
    pub fn advance(&mut self, callback_state: Option<Value>) {
        self.request_context = Some(RequestContext {
            invocation: self.invocation_count() + 1,
            callback_state,
            schedule_rule_name: None,
            schedule_target_id: None,
        });
    }

    /// Records the handle of a freshly armed continuation so the next
    /// invocation can clean it up.
    pub fn set_continuation_handle(&mut self, handle: &ContinuationHandle) {
        let context = self.request_context.get_or_insert_with(Default::default);
        context.schedule_rule_name = Some(handle.rule_name.clone());
        context.schedule_target_id = Some(handle.target_id.clone());
    }
}

/// The subset of the request a handler actually needs.
///
/// The full [`HandlerRequest`] carries runtime plumbing (credentials,
/// continuation bookkeeping) that handler implementations must not depend
/// on; they see this borrowed view instead.
#[derive(Debug, Clone, Copy)]
pub struct ResourceRequest<'a> {
    pub action: Action,
    pub resource_type: &'a str,
    pub desired_state: Option<&'a Value>,
    pub previous_state: Option<&'a Value>,
}

impl<'a> ResourceRequest<'a> {
    pub fn from_request(request: &'a HandlerRequest) -> Self {
        ResourceRequest {
            action: request.action,
            resource_type: &request.resource_type,
            desired_state: request.request_data.desired_state.as_ref(),
            previous_state: request.request_data.previous_state.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request_json() -> String {
        json!({
            "action": "CREATE",
            "bearerToken": "token-123",
            "resourceType": "Org::Service::Widget",
            "responseEndpoint": "https://callback.example.com",
            "requestData": {
                "desiredState": {"name": "widget-1"},
                "credentials": {
                    "accessKeyId": "AKID",
                    "secretAccessKey": "SECRET",
                    "sessionToken": "SESSION"
                }
            },
            "requestContext": {
                "invocation": 2,
                "callbackState": {"phase": "stabilizing", "checks": 3},
                "scheduleRuleName": "reinvoke-handler-abc",
                "scheduleTargetId": "reinvoke-target-abc"
            }
        })
        .to_string()
    }

    #[test]
    fn test_round_trip_preserves_callback_state() {
        let request = HandlerRequest::from_slice(request_json().as_bytes()).unwrap();
        let serialized = serde_json::to_string(&request).unwrap();
        let round_tripped = HandlerRequest::from_slice(serialized.as_bytes()).unwrap();

        assert_eq!(
            round_tripped.callback_state(),
            Some(&json!({"phase": "stabilizing", "checks": 3}))
        );
        assert_eq!(round_tripped.invocation_count(), 2);
        assert_eq!(round_tripped.bearer_token, "token-123");
    }

    #[test]
    fn test_continuation_handle_requires_both_halves() {
        let mut request = HandlerRequest::from_slice(request_json().as_bytes()).unwrap();
        let handle = request.continuation_handle().unwrap();
        assert_eq!(handle.rule_name, "reinvoke-handler-abc");
        assert_eq!(handle.target_id, "reinvoke-target-abc");

        request.request_context.as_mut().unwrap().schedule_target_id = None;
        assert!(request.continuation_handle().is_none());
    }

    #[test]
    fn test_advance_bumps_invocation_and_drops_handle() {
        let mut request = HandlerRequest::from_slice(request_json().as_bytes()).unwrap();
        request.advance(Some(json!({"phase": "waiting"})));

        let context = request.request_context.as_ref().unwrap();
        assert_eq!(context.invocation, 3);
        assert_eq!(context.callback_state, Some(json!({"phase": "waiting"})));
        assert!(context.schedule_rule_name.is_none());
        assert!(context.schedule_target_id.is_none());
        assert!(!request.is_first_invocation());
    }

    #[test]
    fn test_fresh_request_counts_as_first_invocation() {
        let mut request = HandlerRequest::from_slice(request_json().as_bytes()).unwrap();
        request.request_context = None;
        assert!(request.is_first_invocation());
        assert_eq!(request.invocation_count(), 1);

        request.advance(None);
        assert_eq!(request.invocation_count(), 2);
    }
}
