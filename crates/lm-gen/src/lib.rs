//! Generation pipeline: request assembly, retrying remote calls, and the
//! job orchestrator behind the editor.

pub mod backend;
pub mod config;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod request;
pub mod retry;
pub mod studio;

pub use backend::{PollStatus, RemoteBackend, VideoHandle};
pub use config::GenerationConfig;
pub use error::{GenResult, GenerationError};
pub use job::{GenerationJob, JobHistory, JobStatus};
pub use orchestrator::{Orchestrator, SessionContext};
pub use request::{GenerationRequest, GenerationSettings};
pub use retry::{RetryConfig, RetryPolicy, with_retry};
pub use studio::Studio;
