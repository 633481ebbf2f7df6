use ephid_core::IdentifierSpace;

use crate::GenerateError;

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CacheLookup,
    LoadingTokenizer,
    Anchoring,
    Probing,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationProgress {
    pub stage: Stage,
    /// Starters probed so far.
    pub probed: usize,
    /// Starters to probe in total (after the deny-list).
    pub total: usize,
    /// Starters accepted so far.
    pub accepted: usize,
}

impl GenerationProgress {
    pub(crate) fn stage(stage: Stage) -> Self {
        Self {
            stage,
            probed: 0,
            total: 0,
            accepted: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    Progress {
        job_id: JobId,
        progress: GenerationProgress,
    },
    Completed {
        job_id: JobId,
        result: Result<IdentifierSpace, GenerateError>,
    },
}
