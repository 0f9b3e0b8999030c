use crate::runtime::error::ErrorCode;
use crate::runtime::progress::OperationStatus;
use crate::runtime::request::Credentials;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Delivery failure from the callback endpoint. Logged by the processor,
/// never propagated, since a lost status update must not fail the invocation.
#[derive(Debug, Clone, Error)]
#[error("callback delivery failed: {0}")]
pub struct CallbackError(pub String);

/// Pushes progress for one chain back to the orchestrating caller.
///
/// Best-effort by contract: the processor funnels every terminal outcome
/// through one report, and additionally reports each intermediate
/// IN_PROGRESS pass of mutating actions.
#[async_trait]
pub trait CallbackReporter: Send + Sync {
    /// Rebind to the credentials supplied with the current invocation.
    /// Called exactly once per invocation, before any handler code runs.
    fn refresh(&self, _credentials: &Credentials) {}

    async fn report_progress(
        &self,
        bearer_token: &str,
        error_code: Option<ErrorCode>,
        status: OperationStatus,
        resource_model: Option<&Value>,
        message: Option<&str>,
    ) -> Result<(), CallbackError>;
}
