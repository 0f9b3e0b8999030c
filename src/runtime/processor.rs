//! # Request Processing
//!
//! The invocation state machine: validate the inbound request, invoke the
//! handler, interpret its progress result, and either complete, wait and
//! re-invoke locally, or hand off to the continuation scheduler.
//!
//! A request moves through `RECEIVED -> VALIDATED -> INVOKING` and ends in
//! one of `COMPLETED`, `HANDED_OFF` or `TERMINAL_FAILURE`; a local retry
//! loops back to `INVOKING` after a bounded wait. Whatever path it takes,
//! the caller always receives exactly one terminal status report for this
//! chain link.

use crate::runtime::action::Action;
use crate::runtime::callback::CallbackReporter;
use crate::runtime::config::ProcessorConfig;
use crate::runtime::context::InvocationContext;
use crate::runtime::error::{ErrorCode, ProcessorError, Result};
use crate::runtime::handler::ResourceHandler;
use crate::runtime::metrics::MetricsPublisher;
use crate::runtime::progress::{OperationStatus, ProgressEvent};
use crate::runtime::request::{Credentials, HandlerRequest, ResourceRequest};
use crate::runtime::response::Response;
use crate::runtime::scheduler::{ContinuationHandle, ContinuationScheduler};
use crate::runtime::schema::SchemaValidator;
use chrono::Utc;
use futures::FutureExt;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Credential-bearing collaborators, constructed once at process start and
/// rebound to fresh credentials at the beginning of every invocation.
///
/// One invocation owns its collaborators exclusively for its duration; no
/// mutable state crosses invocation boundaries.
pub struct Collaborators {
    pub callback: Arc<dyn CallbackReporter>,
    pub scheduler: Arc<dyn ContinuationScheduler>,
    pub metrics: Arc<dyn MetricsPublisher>,
    pub validator: Arc<dyn SchemaValidator>,
}

impl Collaborators {
    fn refresh(&self, credentials: &Credentials) {
        self.callback.refresh(credentials);
        self.scheduler.refresh(credentials);
        self.metrics.refresh(credentials);
    }
}

/// What the processor does after interpreting a handler result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextStep {
    /// Terminal status reached; report and exit the loop.
    Complete,
    /// Wait out the requested delay in-process, then re-invoke.
    LocalRetry(Duration),
    /// Arm an external continuation and exit this process.
    HandOff { minutes: u32 },
}

/// Interprets a handler result against the remaining execution budget.
///
/// A sub-minute delay is waited out locally when the budget leaves a 20%
/// margin over the wait; everything else becomes a hand-off rounded up to
/// whole minutes. Pure so the retry/hand-off policy is testable without
/// collaborators.
fn decide_next(
    progress: &ProgressEvent,
    action: Action,
    remaining_budget: Duration,
    config: &ProcessorConfig,
) -> Result<NextStep> {
    if progress.status != OperationStatus::InProgress {
        return Ok(NextStep::Complete);
    }
    if !action.is_mutating() {
        return Err(ProcessorError::Contract(
            "READ and LIST handlers must return synchronously.".to_string(),
        ));
    }

    let requested = Duration::from_secs(progress.callback_delay_seconds);
    let padded = requested.as_secs_f64() * config.budget_safety_factor;
    if requested < config.local_reinvoke_threshold && remaining_budget.as_secs_f64() > padded {
        Ok(NextStep::LocalRetry(requested))
    } else {
        let minutes = progress.callback_delay_seconds.div_ceil(60).max(1);
        Ok(NextStep::HandOff {
            minutes: u32::try_from(minutes).unwrap_or(u32::MAX),
        })
    }
}

fn validate_request(request: &HandlerRequest) -> Result<Credentials> {
    if request.action.is_mutating() && request.request_data.desired_state.is_none() {
        return Err(ProcessorError::Malformed(
            "no resource properties supplied for a mutating action".to_string(),
        ));
    }
    match request.response_endpoint.as_deref() {
        Some(endpoint) if !endpoint.is_empty() => {}
        _ => {
            return Err(ProcessorError::Malformed(
                "no callback endpoint received".to_string(),
            ));
        }
    }
    request
        .request_data
        .credentials
        .clone()
        .ok_or_else(|| ProcessorError::Malformed("missing required credentials".to_string()))
}

/// Drives one invocation of a [`ResourceHandler`] end to end.
///
/// Construct once at process start with the dependency-injected
/// [`Collaborators`] and call [`RequestProcessor::process`] for every
/// inbound payload.
pub struct RequestProcessor<H> {
    handler: H,
    collaborators: Collaborators,
    config: ProcessorConfig,
}

impl<H: ResourceHandler> RequestProcessor<H> {
    pub fn new(handler: H, collaborators: Collaborators) -> Self {
        Self::with_config(handler, collaborators, ProcessorConfig::default())
    }

    pub fn with_config(handler: H, collaborators: Collaborators, config: ProcessorConfig) -> Self {
        RequestProcessor {
            handler,
            collaborators,
            config,
        }
    }

    /// Processes one serialized provisioning request and produces the final
    /// response envelope for it.
    ///
    /// Every path through this method yields a response, and every terminal
    /// outcome is additionally reported to the [`CallbackReporter`], so the
    /// caller is never left without a status update.
    pub async fn process(&self, payload: &[u8], context: &InvocationContext) -> Response {
        let raw: Value = match serde_json::from_slice(payload) {
            Ok(raw) => raw,
            Err(e) => return self.reject_unparseable(&e),
        };
        let request = match HandlerRequest::from_slice(payload) {
            Ok(request) => request,
            Err(e) => return self.reject_unparseable(&e),
        };

        let action = request.action;
        let bearer_token = request.bearer_token.clone();
        let desired_state = request.request_data.desired_state.clone();

        let progress = match self.process_invocation(&raw, request, context).await {
            Ok(progress) => progress,
            Err(e) => {
                let code = e.error_code();
                error!("{action} request failed before completion: {e}");
                self.collaborators
                    .metrics
                    .publish_exception_metric(Utc::now(), action, code);

                let mut failed = ProgressEvent::failed(code, e.to_string());
                if action.is_mutating() && !matches!(e, ProcessorError::Validation(_)) {
                    // surface the rejected model back to the caller
                    failed.resource_model = desired_state;
                }
                self.report_progress(&bearer_token, &failed).await;
                failed
            }
        };

        Response::from_progress(progress, Some(bearer_token))
    }

    async fn process_invocation(
        &self,
        raw: &Value,
        mut request: HandlerRequest,
        context: &InvocationContext,
    ) -> Result<ProgressEvent> {
        let action = request.action;
        let credentials = validate_request(&request)?;

        // collaborators are rebound before any handler code runs
        self.collaborators.refresh(&credentials);

        if request.is_first_invocation() {
            // acknowledge receipt so the caller sees the chain has started
            if let Err(e) = self
                .collaborators
                .callback
                .report_progress(
                    &request.bearer_token,
                    None,
                    OperationStatus::InProgress,
                    None,
                    None,
                )
                .await
            {
                warn!(
                    "acknowledgement for {} was not delivered: {e}",
                    request.bearer_token
                );
            }
        }

        // this invocation was produced by an armed continuation: tear the
        // schedule down before anything else, best-effort
        if let Some(handle) = request.continuation_handle() {
            match self.collaborators.scheduler.cancel(&handle).await {
                Ok(()) => info!(
                    "cleaned up previous continuation {} / {}",
                    handle.rule_name, handle.target_id
                ),
                Err(e) => warn!("failed to clean up continuation {}: {e}", handle.rule_name),
            }
        }

        if action.is_mutating() {
            // validate the raw payload, not the deserialized copy, so fields
            // the lenient deserializer dropped still count against the schema
            if let Some(raw_model) = raw.pointer("/requestData/desiredState") {
                self.collaborators.validator.validate(raw_model)?;
            }
        }

        let bearer_token = request.bearer_token.clone();
        loop {
            self.collaborators
                .metrics
                .publish_invocation_metric(Utc::now(), action);

            let progress = self.invoke_once(&request).await;

            if action.is_mutating() {
                self.report_progress(&bearer_token, &progress).await;
            }

            match decide_next(&progress, action, context.remaining_time(), &self.config)? {
                NextStep::Complete => {
                    if !action.is_mutating() {
                        self.report_progress(&bearer_token, &progress).await;
                    }
                    return Ok(progress);
                }
                NextStep::LocalRetry(delay) => {
                    request.advance(progress.callback_state.clone());
                    info!(
                        "re-invoking {action} locally after {}s (invocation {})",
                        delay.as_secs(),
                        request.invocation_count()
                    );
                    tokio::time::sleep(delay).await;
                }
                NextStep::HandOff { minutes } => {
                    request.advance(progress.callback_state.clone());
                    let handle = ContinuationHandle::generate();
                    request.set_continuation_handle(&handle);

                    match self
                        .collaborators
                        .scheduler
                        .schedule(context.target_ref(), minutes, &handle, &request)
                        .await
                    {
                        Ok(()) => {
                            info!(
                                "handed {action} off to continuation {} in {minutes} minute(s)",
                                handle.rule_name
                            );
                            return Ok(progress);
                        }
                        Err(e) => {
                            // the chain must not end silently: convert to a
                            // reported terminal failure
                            error!("failed to arm continuation for {action}: {e}");
                            self.collaborators.metrics.publish_exception_metric(
                                Utc::now(),
                                action,
                                ErrorCode::ServiceInternalError,
                            );
                            let mut failed =
                                ProgressEvent::failed(ErrorCode::ServiceInternalError, e.to_string());
                            failed.resource_model = progress.resource_model.clone();
                            self.report_progress(&bearer_token, &failed).await;
                            return Ok(failed);
                        }
                    }
                }
            }
        }
    }

    /// Invokes the handler once, timing strictly around the call, and folds
    /// every kind of fault into a classified FAILED progress result.
    async fn invoke_once(&self, request: &HandlerRequest) -> ProgressEvent {
        let action = request.action;
        let view = ResourceRequest::from_request(request);
        let callback_state = request.callback_state();

        let started = std::time::Instant::now();
        let outcome = AssertUnwindSafe(self.handler.handle(view, callback_state))
            .catch_unwind()
            .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.collaborators
            .metrics
            .publish_duration_metric(Utc::now(), action, elapsed_ms);

        match outcome {
            Ok(Ok(progress)) => {
                debug!("handler returned {}", progress.status);
                progress
            }
            Ok(Err(fault)) => {
                let code = fault.classify();
                self.collaborators
                    .metrics
                    .publish_exception_metric(Utc::now(), action, code);
                error!(
                    "{code} in a {action} action on a {}: {fault}",
                    request.resource_type
                );
                ProgressEvent::failed(code, fault.to_string())
            }
            Err(_) => {
                self.collaborators.metrics.publish_exception_metric(
                    Utc::now(),
                    action,
                    ErrorCode::InternalFailure,
                );
                error!(
                    "handler aborted without producing a result in a {action} action on a {}",
                    request.resource_type
                );
                ProgressEvent::failed(
                    ErrorCode::InternalFailure,
                    "Handler failed to provide a response.",
                )
            }
        }
    }

    async fn report_progress(&self, bearer_token: &str, progress: &ProgressEvent) {
        let delivery = self
            .collaborators
            .callback
            .report_progress(
                bearer_token,
                progress.error_code,
                progress.status,
                progress.resource_model.as_ref(),
                progress.message.as_deref(),
            )
            .await;
        if let Err(e) = delivery {
            warn!("progress report for {bearer_token} was not delivered: {e}");
        }
    }

    fn reject_unparseable(&self, error: &serde_json::Error) -> Response {
        error!("failed to deserialize request: {error}");
        Response::from_progress(
            ProgressEvent::failed(
                ErrorCode::InvalidRequest,
                format!("failed to deserialize request: {error}"),
            ),
            None,
        )
    }
}
