//! Best-effort check for a newer packplan release.
//!
//! Every failure (network, status, decoding) is logged at debug and
//! swallowed; the check never affects the exit code.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const TAGS_URL: &str = "https://api.github.com/repos/packplan/packplan/tags?per_page=10";
pub const RELEASES_URL: &str = "https://github.com/packplan/packplan/releases/latest";

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

/// Returns the newest release tag when it is newer than `current`.
pub async fn check_for_update(url: &str, current: &str, timeout: Duration) -> Option<String> {
    match latest_tag(url, timeout).await {
        Ok(Some(latest)) if is_newer(&latest, current) => Some(latest),
        Ok(latest) => {
            debug!(?latest, current, "No newer release");
            None
        }
        Err(e) => {
            debug!(error = %e, "Update check failed");
            None
        }
    }
}

async fn latest_tag(url: &str, timeout: Duration) -> Result<Option<String>> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("packplan/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?;

    if !response.status().is_success() {
        bail!("Release endpoint returned {}", response.status());
    }

    let tags: Vec<Tag> = response
        .json()
        .await
        .context("Failed to decode release tags")?;

    Ok(newest_release_tag(tags.into_iter().map(|t| t.name)))
}

/// The first `v`-prefixed tag; the endpoint lists newest first.
fn newest_release_tag(tags: impl IntoIterator<Item = String>) -> Option<String> {
    tags.into_iter().find(|name| name.starts_with('v'))
}

/// Compares `major.minor.patch`, ignoring a leading `v`. Missing or
/// non-numeric components count as zero.
pub fn is_newer(latest: &str, current: &str) -> bool {
    version_triple(latest) > version_triple(current)
}

fn version_triple(version: &str) -> [u64; 3] {
    let mut triple = [0; 3];
    let parts = version.trim_start_matches('v').split('.');
    for (slot, part) in triple.iter_mut().zip(parts) {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        *slot = digits.parse().unwrap_or(0);
    }
    triple
}

pub fn notice(latest: &str, current: &str) -> String {
    format!(
        "A new version of packplan is available: {} (current: v{})\nDownload: {}",
        latest,
        current.trim_start_matches('v'),
        RELEASES_URL
    )
}
