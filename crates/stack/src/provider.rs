//! Capability interface implemented once per language ecosystem.

use packplan_core::{EvidenceError, EvidenceView, Plan};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Evidence(#[from] EvidenceError),

    #[error("Invalid manifest {path}: {source}")]
    Manifest {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Detection and plan synthesis for one ecosystem.
///
/// `detect` is cheap and may fail on unexpected IO; the orchestrator treats a
/// failure there as "not detected". Once a provider has claimed a project, an
/// error from `plan` is final.
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect(&self, evidence: &EvidenceView) -> Result<bool, ProviderError>;

    fn plan(&self, evidence: &EvidenceView) -> Result<Plan, ProviderError>;
}
