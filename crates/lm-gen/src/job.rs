//! Generation jobs and the newest-first history list.

use chrono::{DateTime, Utc};
use lm_core::{ImageData, OutputKind};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationJob {
    pub id: Uuid,
    pub kind: OutputKind,
    pub status: JobStatus,
    /// `data:` URL of the result once completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    /// The source image as it was when the job was submitted.
    pub thumbnail: ImageData,
}

impl GenerationJob {
    pub fn pending(kind: OutputKind, thumbnail: ImageData) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            status: JobStatus::Pending,
            result_url: None,
            error: None,
            created_at: Utc::now(),
            thumbnail,
        }
    }
}

/// Jobs, newest first. Status only moves forward: `Pending` to
/// `Completed` or `Failed`, once.
#[derive(Debug, Default)]
pub struct JobHistory {
    jobs: Vec<GenerationJob>,
}

impl JobHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: GenerationJob) {
        self.jobs.insert(0, job);
    }

    pub fn get(&self, id: Uuid) -> Option<&GenerationJob> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GenerationJob> {
        self.jobs.iter()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn remove(&mut self, id: Uuid) -> Option<GenerationJob> {
        let pos = self.jobs.iter().position(|j| j.id == id)?;
        Some(self.jobs.remove(pos))
    }

    /// Returns `false` if the job is gone or already terminal.
    pub fn complete(&mut self, id: Uuid, result_url: String) -> bool {
        match self.pending_mut(id) {
            Some(job) => {
                job.status = JobStatus::Completed;
                job.result_url = Some(result_url);
                true
            }
            None => false,
        }
    }

    /// Returns `false` if the job is gone or already terminal.
    pub fn fail(&mut self, id: Uuid, error: String) -> bool {
        match self.pending_mut(id) {
            Some(job) => {
                job.status = JobStatus::Failed;
                job.error = Some(error);
                true
            }
            None => false,
        }
    }

    fn pending_mut(&mut self, id: Uuid) -> Option<&mut GenerationJob> {
        self.jobs
            .iter_mut()
            .find(|j| j.id == id && j.status == JobStatus::Pending)
    }
}
