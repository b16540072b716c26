//! Generation orchestrator.
//!
//! `submit` records a pending job and returns at once; the remote pipeline
//! runs on a spawned task and reports back over a channel. Completions are
//! applied only by the owner (`next_completion` / `drain_completions`), so
//! job history and [`SessionContext`] have a single writer.
//!
//! ```text
//!   submit ──► Pending ──┬──► Completed (data URL)
//!                        └──► Failed    (message; surfaced only if active)
//! ```

use crate::backend::RemoteBackend;
use crate::config::GenerationConfig;
use crate::error::{GenResult, GenerationError};
use crate::job::{GenerationJob, JobHistory, JobStatus};
use crate::request::GenerationRequest;
use crate::retry::RetryPolicy;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lm_core::{ImageData, OutputKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use uuid::Uuid;

/// MIME type assumed for downloaded video assets.
pub const VIDEO_MIME: &str = "video/mp4";

/// UI-facing flags shared by the editor and the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// A job is in flight; new generations must be refused by the caller.
    pub busy: bool,
    /// Cleared by any authorization failure until [`Orchestrator::reauthorize`].
    pub authenticated: bool,
    /// The history entry the user is looking at.
    pub active_job: Option<Uuid>,
    pub error_message: Option<String>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            busy: false,
            authenticated: true,
            active_job: None,
            error_message: None,
        }
    }
}

#[derive(Debug)]
struct Completion {
    id: Uuid,
    outcome: GenResult<String>,
}

pub struct Orchestrator<B: RemoteBackend> {
    backend: Arc<B>,
    config: GenerationConfig,
    history: JobHistory,
    context: SessionContext,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: HashMap<Uuid, AbortHandle>,
}

impl<B: RemoteBackend> Orchestrator<B> {
    pub fn new(backend: B, config: GenerationConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend: Arc::new(backend),
            config,
            history: JobHistory::new(),
            context: SessionContext::default(),
            tx,
            rx,
            in_flight: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn history(&self) -> &JobHistory {
        &self.history
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn active_job(&self) -> Option<&GenerationJob> {
        self.context.active_job.and_then(|id| self.history.get(id))
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Start a job. Must be called inside a tokio runtime.
    ///
    /// Never refuses: callers check [`SessionContext::busy`] first.
    pub fn submit(&mut self, request: GenerationRequest, thumbnail: ImageData) -> Uuid {
        let job = GenerationJob::pending(request.kind, thumbnail);
        let id = job.id;
        self.history.push(job);
        self.context.active_job = Some(id);
        self.context.error_message = None;
        self.context.busy = true;

        log::info!(
            "job {id}: submitted {:?} ({}, {} references)",
            request.kind,
            request.aspect_ratio,
            request.references.len()
        );

        let backend = Arc::clone(&self.backend);
        let config = self.config.clone();
        let tx = self.tx.clone();
        let worker =
            tokio::spawn(async move { run_pipeline(backend.as_ref(), &config, &request).await });
        self.in_flight.insert(id, worker.abort_handle());

        // Every job reports exactly once, even if the worker panics or is aborted.
        tokio::spawn(async move {
            let outcome = match worker.await {
                Ok(outcome) => outcome,
                Err(err) => Err(GenerationError::Remote {
                    status: None,
                    message: if err.is_panic() {
                        "the generation task panicked".into()
                    } else {
                        "the generation was cancelled".into()
                    },
                }),
            };
            // Fails only once the orchestrator is dropped.
            let _ = tx.send(Completion { id, outcome });
        });
        id
    }

    /// Wait for the next job to finish and apply it. Returns `None` when
    /// nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Uuid> {
        if self.in_flight.is_empty() {
            return self.rx.try_recv().ok().map(|c| self.apply(c));
        }
        let completion = self.rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Apply every completion that has already arrived.
    pub fn drain_completions(&mut self) -> Vec<Uuid> {
        let mut done = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            done.push(self.apply(completion));
        }
        done
    }

    fn apply(&mut self, completion: Completion) -> Uuid {
        let Completion { id, outcome } = completion;
        self.in_flight.remove(&id);
        self.context.busy = !self.in_flight.is_empty();

        match outcome {
            Ok(url) => {
                if self.history.complete(id, url) {
                    log::info!("job {id}: completed");
                }
            }
            Err(err) => {
                if err.is_unauthorized() {
                    self.context.authenticated = false;
                }
                let message = err.to_string();
                log::warn!("job {id}: failed: {message}");
                if self.history.fail(id, message.clone()) && self.context.active_job == Some(id) {
                    self.context.error_message = Some(message);
                }
            }
        }
        id
    }

    /// Make a history entry the active view. Failed jobs show their error;
    /// nothing is re-run.
    pub fn select(&mut self, id: Uuid) -> bool {
        let Some(job) = self.history.get(id) else {
            return false;
        };
        self.context.error_message = match job.status {
            JobStatus::Failed => job.error.clone(),
            JobStatus::Pending | JobStatus::Completed => None,
        };
        self.context.active_job = Some(id);
        true
    }

    /// Remove a history entry. A pending job keeps running; its result is
    /// dropped when it arrives.
    pub fn delete(&mut self, id: Uuid) -> bool {
        if self.history.remove(id).is_none() {
            return false;
        }
        if self.context.active_job == Some(id) {
            self.context.active_job = None;
            self.context.error_message = None;
        }
        true
    }

    pub fn clear_error(&mut self) {
        self.context.error_message = None;
    }

    /// The user supplied a fresh credential.
    pub fn reauthorize(&mut self) {
        self.context.authenticated = true;
        self.context.error_message = None;
        log::info!("credential refreshed");
    }

    /// Abort every in-flight job and mark it failed.
    pub fn shutdown(&mut self) {
        for (id, handle) in self.in_flight.drain() {
            log::debug!("job {id}: aborted");
            handle.abort();
            self.history.fail(id, "the generation was cancelled".to_string());
        }
        self.context.busy = false;
    }
}

impl<B: RemoteBackend> Drop for Orchestrator<B> {
    fn drop(&mut self) {
        for handle in self.in_flight.values() {
            handle.abort();
        }
    }
}

// ─── Remote pipeline ─────────────────────────────────────────────────────

async fn run_pipeline<B: RemoteBackend>(
    backend: &B,
    config: &GenerationConfig,
    request: &GenerationRequest,
) -> GenResult<String> {
    let retry = RetryPolicy::new(config.retry());
    match request.kind {
        OutputKind::Image => {
            let image = retry
                .run("generate_image", || {
                    backend.generate_image(
                        &request.prompt,
                        &request.image,
                        request.aspect_ratio,
                        &request.references,
                    )
                })
                .await?;
            if image.is_empty() {
                return Err(GenerationError::EmptyResult(
                    "the model returned no image, possibly filtered for safety".into(),
                ));
            }
            Ok(data_url(&image.mime_type, &image.bytes))
        }
        OutputKind::Video => {
            let handle = retry
                .run("generate_video", || {
                    backend.generate_video(&request.prompt, &request.image, request.aspect_ratio)
                })
                .await?;
            log::debug!("video operation {} started", handle.0);

            let mut polls = 0u32;
            let result_ref = loop {
                if polls >= config.max_polls {
                    return Err(GenerationError::Remote {
                        status: None,
                        message: format!("timed out waiting for video after {polls} polls"),
                    });
                }
                tokio::time::sleep(config.poll_interval()).await;
                polls += 1;

                let status = retry.run("poll_status", || backend.poll_status(&handle)).await?;
                log::trace!("video operation {}: poll {polls}, done={}", handle.0, status.done);
                if !status.done {
                    continue;
                }
                if let Some(error) = status.error {
                    return Err(GenerationError::classify(None, error));
                }
                break status.result_ref.ok_or_else(|| {
                    GenerationError::EmptyResult("the video finished without a result".into())
                })?;
            };

            let bytes = retry
                .run("download_asset", || backend.download_asset(&result_ref))
                .await?;
            if bytes.is_empty() {
                return Err(GenerationError::EmptyResult("the video download was empty".into()));
            }
            Ok(data_url(VIDEO_MIME, &bytes))
        }
    }
}

fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}
