pub mod action;
pub mod callback;
pub mod config;
pub mod context;
pub mod delay;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod processor;
pub mod progress;
pub mod request;
pub mod response;
pub mod scheduler;
pub mod schema;

// Re-export key types for easier access
pub use action::Action;
pub use callback::{CallbackError, CallbackReporter};
pub use config::ProcessorConfig;
pub use context::InvocationContext;
pub use error::{ErrorCode, HandlerError, ProcessorError, Result};
pub use handler::ResourceHandler;
pub use metrics::{MetricsProxy, MetricsPublisher};
pub use processor::{Collaborators, RequestProcessor};
pub use progress::{OperationStatus, ProgressEvent};
pub use request::{Credentials, HandlerRequest, RequestContext, RequestData, ResourceRequest};
pub use response::Response;
pub use scheduler::{ContinuationHandle, ContinuationScheduler, SchedulerError};
pub use schema::{SchemaValidator, ValidationError};
