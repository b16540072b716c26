//! The remote generation service, as seen by the orchestrator.

use crate::error::GenResult;
use async_trait::async_trait;
use lm_core::{AspectRatio, ImageData};

/// Opaque handle of a long-running video operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoHandle(pub String);

/// Snapshot of a video operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStatus {
    pub done: bool,
    pub error: Option<String>,
    /// Where to download the finished asset from.
    pub result_ref: Option<String>,
}

impl PollStatus {
    pub fn running() -> Self {
        Self::default()
    }

    pub fn finished(result_ref: impl Into<String>) -> Self {
        Self {
            done: true,
            error: None,
            result_ref: Some(result_ref.into()),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            done: true,
            error: Some(error.into()),
            result_ref: None,
        }
    }
}

/// A generation service. Implementations map their transport failures
/// through [`GenerationError::classify`](crate::GenerationError::classify)
/// so the orchestrator can tell transient from permanent errors.
///
/// `aspect` is always a fixed ratio; `Original` is resolved before the call.
#[async_trait]
pub trait RemoteBackend: Send + Sync + 'static {
    /// Edit `image` per `prompt`. `references` are attached in order and
    /// are addressed by the prompt as reference image #1, #2, ….
    async fn generate_image(
        &self,
        prompt: &str,
        image: &ImageData,
        aspect: AspectRatio,
        references: &[ImageData],
    ) -> GenResult<ImageData>;

    async fn generate_video(
        &self,
        prompt: &str,
        image: &ImageData,
        aspect: AspectRatio,
    ) -> GenResult<VideoHandle>;

    async fn poll_status(&self, handle: &VideoHandle) -> GenResult<PollStatus>;

    async fn download_asset(&self, result_ref: &str) -> GenResult<Vec<u8>>;
}
