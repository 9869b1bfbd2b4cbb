//! Cut-planning job workflow over an [`ArtifactStore`].
//!
//! A job starts with an upload (raw program plus its parsed model), then any
//! number of skeleton computations, skeleton program generations and
//! reorders. Each step reads the newest artifacts it depends on and appends
//! its own result; nothing is overwritten.

use serde::de::DeserializeOwned;
use tracing::info;

use crate::config::CutplanConfig;
use crate::emit;
use crate::error::CutplanError;
use crate::mpf::{self, Program};
use crate::skeleton::{self, SkeletonModel};
use crate::store::{ArtifactKind, ArtifactRef, ArtifactStore};

/// Drives the parse / plan / emit pipeline for stored jobs.
#[derive(Debug)]
pub struct CutPlanner<S: ArtifactStore> {
    store: S,
    config: CutplanConfig,
}

impl<S: ArtifactStore> CutPlanner<S> {
    /// Planner with default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, CutplanConfig::default())
    }

    /// Planner with explicit configuration.
    pub const fn with_config(store: S, config: CutplanConfig) -> Self {
        Self { store, config }
    }

    /// Backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the planner and returns its store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Store an uploaded program and its parsed model.
    ///
    /// # Errors
    ///
    /// [`CutplanError::Serialization`] if the model cannot be encoded.
    pub fn upload(&mut self, job_id: u64, data: &[u8]) -> Result<Program, CutplanError> {
        let text = String::from_utf8_lossy(data);
        let program = mpf::parse_with_config(&text, &self.config);
        let parsed = serde_json::to_vec(&program)?;

        self.write(job_id, ArtifactKind::Source, data.to_vec());
        self.write(job_id, ArtifactKind::Parsed, parsed);
        Ok(program)
    }

    /// Newest parsed model of a job.
    ///
    /// # Errors
    ///
    /// [`CutplanError::MissingArtifact`] if the job was never uploaded.
    pub fn model(&self, job_id: u64) -> Result<Program, CutplanError> {
        self.read_json(job_id, ArtifactKind::Parsed)
    }

    /// Plan skeleton cuts for the newest parsed model and store the result.
    ///
    /// # Errors
    ///
    /// [`CutplanError::MissingArtifact`] without a parsed model.
    pub fn compute_skeleton(&mut self, job_id: u64) -> Result<SkeletonModel, CutplanError> {
        let program = self.model(job_id)?;
        let model = skeleton::compute_skeleton_with_config(&program, &self.config);
        let encoded = serde_json::to_vec(&model)?;
        self.write(job_id, ArtifactKind::Skeleton, encoded);
        Ok(model)
    }

    /// Append the newest skeleton cuts to the uploaded program text.
    ///
    /// # Errors
    ///
    /// [`CutplanError::MissingArtifact`] without a stored skeleton model or
    /// source program.
    pub fn append_skeleton(&mut self, job_id: u64) -> Result<String, CutplanError> {
        let model: SkeletonModel = self.read_json(job_id, ArtifactKind::Skeleton)?;
        let source = self.source_text(job_id)?;
        let text =
            emit::append_skeleton_with_config(&source, &model.skeleton_cuts, &self.config.emit);
        self.write(job_id, ArtifactKind::SkeletonProgram, text.clone().into_bytes());
        Ok(text)
    }

    /// Reorder the uploaded program's contour blocks and store the result.
    ///
    /// Nothing is written unless the order is valid.
    ///
    /// # Errors
    ///
    /// [`CutplanError::MissingArtifact`] without a source program, or any
    /// error from [`emit::reorder`].
    pub fn reorder(&mut self, job_id: u64, order: &[u32]) -> Result<String, CutplanError> {
        let source = self.source_text(job_id)?;
        let text = emit::reorder(&source, order)?;
        self.write(job_id, ArtifactKind::Reordered, text.clone().into_bytes());
        Ok(text)
    }

    /// Newest bytes of any artifact kind.
    ///
    /// # Errors
    ///
    /// [`CutplanError::MissingArtifact`] if nothing of that kind was written.
    pub fn download(&self, job_id: u64, kind: ArtifactKind) -> Result<Vec<u8>, CutplanError> {
        self.store
            .latest(job_id, kind)
            .ok_or(CutplanError::MissingArtifact { job_id, kind })
    }

    fn source_text(&self, job_id: u64) -> Result<String, CutplanError> {
        let bytes = self.download(job_id, ArtifactKind::Source)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_json<T: DeserializeOwned>(
        &self,
        job_id: u64,
        kind: ArtifactKind,
    ) -> Result<T, CutplanError> {
        let bytes = self.download(job_id, kind)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write(&mut self, job_id: u64, kind: ArtifactKind, bytes: Vec<u8>) -> ArtifactRef {
        let size = bytes.len();
        let artifact = self.store.append(job_id, kind, bytes);
        info!(job_id, %kind, version = artifact.version, size, "artifact written");
        artifact
    }
}
