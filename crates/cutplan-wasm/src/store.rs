//! Artifact persistence for cut-planning jobs.
//!
//! Every write appends a new version under `(job_id, kind)`; earlier versions
//! are kept. The engine itself never touches a store, only [`crate::jobs`]
//! does.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Uploaded program text.
    Source,
    /// Parsed program model (JSON).
    Parsed,
    /// Program plus skeleton cuts (JSON).
    Skeleton,
    /// Program text with the skeleton part appended.
    SkeletonProgram,
    /// Program text with contour blocks reordered.
    Reordered,
}

impl ArtifactKind {
    /// Stable lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Parsed => "parsed",
            Self::Skeleton => "skeleton",
            Self::SkeletonProgram => "skeleton_program",
            Self::Reordered => "reordered",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to one stored artifact version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Owning job.
    pub job_id: u64,
    /// Artifact kind.
    pub kind: ArtifactKind,
    /// 1-based version within `(job_id, kind)`.
    pub version: u32,
}

/// Append-only artifact storage keyed by job and kind.
pub trait ArtifactStore {
    /// Store `bytes` as the newest version of `(job_id, kind)`.
    fn append(&mut self, job_id: u64, kind: ArtifactKind, bytes: Vec<u8>) -> ArtifactRef;

    /// Newest version of `(job_id, kind)`, if any was written.
    fn latest(&self, job_id: u64, kind: ArtifactKind) -> Option<Vec<u8>>;
}

/// In-process [`ArtifactStore`] keeping full history.
#[derive(Debug, Default)]
pub struct MemoryStore {
    artifacts: HashMap<(u64, ArtifactKind), Vec<Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of versions stored for `(job_id, kind)`.
    pub fn version_count(&self, job_id: u64, kind: ArtifactKind) -> usize {
        self.artifacts.get(&(job_id, kind)).map_or(0, Vec::len)
    }

    /// A specific 1-based version of `(job_id, kind)`.
    pub fn version(&self, artifact: ArtifactRef) -> Option<&[u8]> {
        let index = usize::try_from(artifact.version).ok()?.checked_sub(1)?;
        self.artifacts
            .get(&(artifact.job_id, artifact.kind))?
            .get(index)
            .map(Vec::as_slice)
    }
}

impl ArtifactStore for MemoryStore {
    fn append(&mut self, job_id: u64, kind: ArtifactKind, bytes: Vec<u8>) -> ArtifactRef {
        let versions = self.artifacts.entry((job_id, kind)).or_default();
        versions.push(bytes);
        ArtifactRef {
            job_id,
            kind,
            version: u32::try_from(versions.len()).unwrap_or(u32::MAX),
        }
    }

    fn latest(&self, job_id: u64, kind: ArtifactKind) -> Option<Vec<u8>> {
        self.artifacts.get(&(job_id, kind))?.last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_keep_history() {
        let mut store = MemoryStore::new();
        let first = store.append(7, ArtifactKind::Reordered, b"one".to_vec());
        let second = store.append(7, ArtifactKind::Reordered, b"two".to_vec());

        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert_eq!(store.version_count(7, ArtifactKind::Reordered), 2);
        assert_eq!(store.latest(7, ArtifactKind::Reordered), Some(b"two".to_vec()));
        assert_eq!(store.version(first), Some(b"one".as_slice()));
    }

    #[test]
    fn kinds_and_jobs_are_separate() {
        let mut store = MemoryStore::new();
        store.append(1, ArtifactKind::Parsed, b"{}".to_vec());
        assert!(store.latest(1, ArtifactKind::Skeleton).is_none());
        assert!(store.latest(2, ArtifactKind::Parsed).is_none());
    }

    #[test]
    fn kind_names() {
        assert_eq!(ArtifactKind::SkeletonProgram.to_string(), "skeleton_program");
        assert_eq!(
            serde_json::to_string(&ArtifactKind::Parsed).unwrap_or_default(),
            "\"parsed\""
        );
    }
}
