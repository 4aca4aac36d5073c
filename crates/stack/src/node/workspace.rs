//! Monorepo workspace discovery.

use super::NodeContext;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub const PNPM_WORKSPACE_FILE: &str = "pnpm-workspace.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    /// Globs as declared, including negations
    pub patterns: Vec<String>,
    /// Directories holding a `package.json` that a positive glob matched, sorted
    pub packages: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PnpmWorkspace {
    #[serde(default)]
    packages: Vec<String>,
}

/// Workspace globs from `package.json`, else from `pnpm-workspace.yaml`.
pub fn resolve_workspaces(ctx: &NodeContext<'_>) -> Option<WorkspaceLayout> {
    let patterns = if ctx.manifest.is_monorepo() {
        ctx.manifest.workspaces.packages.clone()
    } else {
        read_pnpm_workspace(ctx)?
    };

    if patterns.is_empty() {
        return None;
    }

    let packages = expand_patterns(ctx, &patterns);
    debug!(
        patterns = patterns.len(),
        packages = packages.len(),
        "Resolved workspace layout"
    );

    Some(WorkspaceLayout {
        patterns,
        packages,
    })
}

fn read_pnpm_workspace(ctx: &NodeContext<'_>) -> Option<Vec<String>> {
    let content = match ctx.evidence.read_optional(PNPM_WORKSPACE_FILE) {
        Ok(content) => content?,
        Err(e) => {
            warn!(file = PNPM_WORKSPACE_FILE, error = %e, "Skipping unreadable workspace file");
            return None;
        }
    };

    match serde_yaml::from_str::<Option<PnpmWorkspace>>(&content) {
        Ok(workspace) => Some(workspace.unwrap_or_default().packages),
        Err(e) => {
            debug!(file = PNPM_WORKSPACE_FILE, error = %e, "Ignoring malformed workspace file");
            None
        }
    }
}

fn expand_patterns(ctx: &NodeContext<'_>, patterns: &[String]) -> Vec<String> {
    let mut packages = BTreeSet::new();

    for pattern in patterns {
        if pattern.starts_with('!') {
            continue;
        }

        let glob = format!("{}/package.json", clean_pattern(pattern));
        match ctx.evidence.list_files(&glob) {
            Ok(matches) => {
                for manifest in matches {
                    if let Some((dir, _)) = manifest.rsplit_once('/') {
                        packages.insert(dir.to_string());
                    }
                }
            }
            Err(e) => debug!(pattern = %pattern, error = %e, "Skipping workspace pattern"),
        }
    }

    for pattern in patterns {
        if let Some(excluded) = pattern.strip_prefix('!') {
            packages.remove(clean_pattern(excluded));
        }
    }

    packages.into_iter().collect()
}

fn clean_pattern(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    pattern.trim_end_matches('/')
}
