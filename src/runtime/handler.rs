use crate::runtime::error::HandlerError;
use crate::runtime::progress::ProgressEvent;
use crate::runtime::request::ResourceRequest;
use async_trait::async_trait;
use serde_json::Value;

/// Interface implemented by provider packages as the key entry point.
///
/// The handler owns all resource-specific logic; the runtime owns
/// everything around it (validation, classification, reporting,
/// reinvocation). One call per pass through the invocation loop.
///
/// ## Contract
///
/// * Must produce exactly one [`ProgressEvent`] per call, or fail with a
///   [`HandlerError`] the runtime can classify.
/// * May take arbitrarily long; the runtime measures but does not bound the
///   call.
/// * READ and LIST invocations must resolve to a terminal status; an
///   IN_PROGRESS result from them is a contract violation the runtime turns
///   into an internal failure.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Execute one pass of the requested action.
    ///
    /// # Arguments
    ///
    /// * `request` - Borrowed view of the provisioning request
    /// * `callback_state` - Opaque state returned by the previous pass, if
    ///   this is a reinvocation
    async fn handle(
        &self,
        request: ResourceRequest<'_>,
        callback_state: Option<&Value>,
    ) -> Result<ProgressEvent, HandlerError>;
}
