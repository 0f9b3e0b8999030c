/*!
# ProvisionFlow

An invocation runtime for building resource provisioning handlers that run
as short-lived serverless functions.

## Overview

ProvisionFlow sits between an orchestrating caller and your resource
handler. It receives a serialized provisioning request, validates it,
invokes the handler, interprets the handler's progress result, and decides
what happens next: finish, wait briefly and re-invoke in-process, or arm an
external continuation and exit. Along the way it publishes invocation
metrics, classifies faults onto a fixed error taxonomy, and guarantees the
caller always receives a final status report carrying its bearer token.

## Key Components

* **RequestProcessor**: the state machine that drives one invocation end to
  end
* **ResourceHandler**: a trait implemented by provider packages with the
  actual CREATE/READ/UPDATE/DELETE/LIST logic
* **ProgressEvent**: the result a handler returns: terminal success or
  failure, or IN_PROGRESS with a requested callback delay and opaque state
* **Delay strategies**: composable calculators (constant, multiple-of,
  exponential, capped, blended) that map attempt counts to waits; see
  [`runtime::delay`]
* **Collaborators**: dependency-injected capabilities for callbacks,
  continuation scheduling, metrics, and schema validation

## Usage Example

```rust,no_run
use async_trait::async_trait;
use provisionflow::{
    Action, CallbackError, CallbackReporter, Collaborators, ContinuationHandle,
    ContinuationScheduler, ErrorCode, HandlerError, HandlerRequest, InvocationContext,
    MetricsProxy, OperationStatus, ProgressEvent, RequestProcessor, ResourceHandler,
    ResourceRequest, SchedulerError, SchemaValidator, ValidationError,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

struct WidgetHandler;

#[async_trait]
impl ResourceHandler for WidgetHandler {
    async fn handle(
        &self,
        request: ResourceRequest<'_>,
        _callback_state: Option<&Value>,
    ) -> Result<ProgressEvent, HandlerError> {
        match request.action {
            Action::Create => Ok(ProgressEvent::success(request.desired_state.cloned())),
            _ => Err(HandlerError::declared(
                ErrorCode::InvalidRequest,
                "unsupported action",
            )),
        }
    }
}

// Bind these to your callback endpoint and event service.
struct HttpCallback;

#[async_trait]
impl CallbackReporter for HttpCallback {
    async fn report_progress(
        &self,
        _bearer_token: &str,
        _error_code: Option<ErrorCode>,
        _status: OperationStatus,
        _resource_model: Option<&Value>,
        _message: Option<&str>,
    ) -> Result<(), CallbackError> {
        Ok(())
    }
}

struct EventScheduler;

#[async_trait]
impl ContinuationScheduler for EventScheduler {
    async fn schedule(
        &self,
        _target_ref: &str,
        _minutes_from_now: u32,
        _handle: &ContinuationHandle,
        _request: &HandlerRequest,
    ) -> Result<(), SchedulerError> {
        Ok(())
    }

    async fn cancel(&self, _handle: &ContinuationHandle) -> Result<(), SchedulerError> {
        Ok(())
    }
}

struct WidgetSchema;

impl SchemaValidator for WidgetSchema {
    fn validate(&self, _raw_model: &Value) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let processor = RequestProcessor::new(
        WidgetHandler,
        Collaborators {
            callback: Arc::new(HttpCallback),
            scheduler: Arc::new(EventScheduler),
            metrics: Arc::new(MetricsProxy::new()),
            validator: Arc::new(WidgetSchema),
        },
    );

    let payload = br#"{
        "action": "CREATE",
        "bearerToken": "token-1",
        "resourceType": "Org::Service::Widget",
        "responseEndpoint": "https://callback.example.com",
        "requestData": {
            "desiredState": {"name": "widget-1"},
            "credentials": {"accessKeyId": "AKID", "secretAccessKey": "SECRET"}
        }
    }"#;

    let context = InvocationContext::new("fn-ref/widget-provider", Duration::from_secs(840));
    let response = processor.process(payload, &context).await;
    println!("{}", serde_json::to_string(&response).unwrap());
}
```

## Error Handling

Handler faults are explicit values, not unwinding control flow: a handler
fails with a [`HandlerError`], and [`HandlerError::classify`] maps it onto
the fixed [`ErrorCode`] taxonomy as a pure transformation: declared codes
pass through, downstream faults classify by HTTP status family, and
anything else becomes `InternalFailure`. A handler that aborts without
producing a result at all is reported as an internal failure rather than
taking the process down with it.
*/

pub mod runtime;

// Re-export all public APIs for easier access
pub use runtime::action::Action;
pub use runtime::callback::{CallbackError, CallbackReporter};
pub use runtime::config::ProcessorConfig;
pub use runtime::context::InvocationContext;
pub use runtime::delay::{
    Blended, CappedExponential, Constant, Delay, DelayError, Exponential, MultipleOf,
    ShiftByMultipleOf,
};
pub use runtime::error::{ErrorCode, HandlerError, ProcessorError, Result};
pub use runtime::handler::ResourceHandler;
pub use runtime::metrics::{MetricsProxy, MetricsPublisher};
pub use runtime::processor::{Collaborators, RequestProcessor};
pub use runtime::progress::{OperationStatus, ProgressEvent};
pub use runtime::request::{
    Credentials, HandlerRequest, RequestContext, RequestData, ResourceRequest,
};
pub use runtime::response::Response;
pub use runtime::scheduler::{ContinuationHandle, ContinuationScheduler, SchedulerError};
pub use runtime::schema::{SchemaValidator, ValidationError};
