use crate::error::DetectError;
use packplan_core::{EnvOverrides, EvidenceView, Plan};
use packplan_stack::{NodeProvider, Provider};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Walks registered providers in order and returns the first plan.
pub struct Detector {
    providers: Vec<Box<dyn Provider>>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Detector {
    /// A detector with no providers; every project yields no plan.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new().with_provider(Box::new(NodeProvider::new()))
    }

    pub fn with_provider(mut self, provider: Box<dyn Provider>) -> Self {
        self.register(provider);
        self
    }

    pub fn register(&mut self, provider: Box<dyn Provider>) {
        debug!(provider = provider.name(), "Registered provider");
        self.providers.push(provider);
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Detect the project rooted at `root`, honoring overrides from the process environment.
    pub fn detect(&self, root: &Path) -> Result<Option<Plan>, DetectError> {
        if !root.exists() {
            return Err(DetectError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(DetectError::NotADirectory(root.to_path_buf()));
        }

        let evidence = EvidenceView::new(root).with_env(EnvOverrides::from_process_env());
        self.detect_evidence(&evidence)
    }

    /// The first provider whose `detect` succeeds with `true` owns the project.
    ///
    /// A provider whose `detect` fails is skipped with a warning. Once a
    /// provider has claimed the project its `plan` result is returned as-is.
    pub fn detect_evidence(&self, evidence: &EvidenceView) -> Result<Option<Plan>, DetectError> {
        let start = Instant::now();
        info!(root = %evidence.root().display(), "Starting detection");

        for provider in &self.providers {
            let name = provider.name();

            match provider.detect(evidence) {
                Ok(true) => {}
                Ok(false) => {
                    debug!(provider = name, "Provider did not match");
                    continue;
                }
                Err(e) => {
                    warn!(provider = name, error = %e, "Provider detection failed, skipping");
                    continue;
                }
            }

            info!(provider = name, "Provider matched");
            let plan = provider
                .plan(evidence)
                .map_err(|source| DetectError::Provider {
                    provider: name,
                    source,
                })?;

            info!(
                provider = name,
                duration_ms = start.elapsed().as_millis(),
                "Detection complete"
            );
            return Ok(Some(plan));
        }

        info!(
            providers = self.providers.len(),
            duration_ms = start.elapsed().as_millis(),
            "No provider matched"
        );
        Ok(None)
    }
}
