//! Node runtime version resolution.

use super::NodeContext;
use crate::rules::{first_match, Rule};
use packplan_core::config::keys;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const DEFAULT_NODE_VERSION: &str = "24";

/// Tool names accepted in `.tool-versions`
const TOOL_NAMES: &[&str] = &["nodejs", "node"];

static ENGINE_VERSION_RE: OnceLock<Regex> = OnceLock::new();
static MISE_NODE_RE: OnceLock<Regex> = OnceLock::new();

fn engine_version_re() -> &'static Regex {
    ENGINE_VERSION_RE.get_or_init(|| {
        Regex::new(r"(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("engine version regex is valid")
    })
}

fn mise_node_re() -> &'static Regex {
    MISE_NODE_RE.get_or_init(|| {
        Regex::new(r#"(?:node|nodejs)\s*=\s*"([^"]+)""#).expect("mise node regex is valid")
    })
}

/// One row of the version decision table
#[derive(Debug)]
pub enum VersionSource {
    Env(&'static str),
    EnginesNode,
    /// A file holding nothing but a version, like `.nvmrc`
    VersionFile(&'static str),
    ToolVersions,
    MiseToml,
}

pub const VERSION_SOURCES: &[VersionSource] = &[
    VersionSource::Env(keys::NODE_VERSION),
    VersionSource::Env(keys::LEGACY_NODE_VERSION),
    VersionSource::EnginesNode,
    VersionSource::VersionFile(".nvmrc"),
    VersionSource::VersionFile(".node-version"),
    VersionSource::ToolVersions,
    VersionSource::MiseToml,
];

/// Version files that feed resolution, in the order they are consulted
pub const VERSION_FILES: &[&str] = &[".nvmrc", ".node-version", ".tool-versions", "mise.toml"];

impl Rule<NodeContext<'_>> for VersionSource {
    type Output = String;

    fn name(&self) -> &str {
        match self {
            Self::Env(key) => key,
            Self::EnginesNode => "engines.node",
            Self::VersionFile(file) => file,
            Self::ToolVersions => ".tool-versions",
            Self::MiseToml => "mise.toml",
        }
    }

    fn evaluate(&self, ctx: &NodeContext<'_>) -> Option<String> {
        match self {
            Self::Env(key) => ctx
                .evidence
                .env()
                .get(key)
                .map(normalize_version)
                .filter(|v| !v.is_empty()),
            Self::EnginesNode => ctx
                .manifest
                .engines
                .node
                .as_deref()
                .and_then(parse_engine_version),
            Self::VersionFile(file) => read_version_file(ctx, file)
                .as_deref()
                .and_then(parse_version_file),
            Self::ToolVersions => read_version_file(ctx, ".tool-versions")
                .as_deref()
                .and_then(parse_tool_versions),
            Self::MiseToml => read_version_file(ctx, "mise.toml")
                .as_deref()
                .and_then(parse_mise_toml),
        }
    }
}

/// Resolve the Node version, falling back to [`DEFAULT_NODE_VERSION`].
pub fn resolve_node_version(ctx: &NodeContext<'_>) -> String {
    match first_match(VERSION_SOURCES, ctx) {
        Some((source, version)) => {
            debug!(source = source.name(), version = %version, "Resolved Node version");
            version
        }
        None => {
            debug!(version = DEFAULT_NODE_VERSION, "No Node version declared, using default");
            DEFAULT_NODE_VERSION.to_string()
        }
    }
}

fn read_version_file(ctx: &NodeContext<'_>, file: &str) -> Option<String> {
    match ctx.evidence.read_optional(file) {
        Ok(content) => content,
        Err(e) => {
            warn!(file, error = %e, "Skipping unreadable version file");
            None
        }
    }
}

/// Trim surrounding whitespace and a leading `v`.
pub fn normalize_version(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix('v').unwrap_or(trimmed).to_string()
}

/// Normalize a file-sourced version. Any `lts*` alias maps to the default.
fn finish_file_version(raw: &str) -> Option<String> {
    let version = normalize_version(raw);
    if version.is_empty() {
        return None;
    }
    if version.to_ascii_lowercase().starts_with("lts") {
        return Some(DEFAULT_NODE_VERSION.to_string());
    }
    Some(version)
}

/// Major version of the first number group in a constraint, e.g. `">=18 <21"` is `18`.
pub fn parse_engine_version(constraint: &str) -> Option<String> {
    engine_version_re()
        .captures(constraint)
        .and_then(|caps| caps.get(1))
        .map(|major| major.as_str().to_string())
}

pub fn parse_version_file(content: &str) -> Option<String> {
    finish_file_version(content)
}

/// asdf format: the second token of the first line naming Node.
pub fn parse_tool_versions(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        let tool = tokens.next()?;
        if !TOOL_NAMES.contains(&tool) {
            return None;
        }
        tokens.next().and_then(finish_file_version)
    })
}

/// `[tools]` table of `mise.toml`, with a loose text match as fallback.
pub fn parse_mise_toml(content: &str) -> Option<String> {
    let from_table = match toml::from_str::<toml::Table>(content) {
        Ok(doc) => doc
            .get("tools")
            .and_then(toml::Value::as_table)
            .and_then(|tools| ["node", "nodejs"].iter().find_map(|key| tools.get(*key)))
            .and_then(mise_tool_version),
        Err(e) => {
            debug!(error = %e, "mise.toml is not valid TOML, using text match");
            None
        }
    };

    from_table
        .or_else(|| {
            mise_node_re()
                .captures(content)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .as_deref()
        .and_then(finish_file_version)
}

/// `node = "20"`, `node = ["20", "18"]` or `node = { version = "20" }`
fn mise_tool_version(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(version) => Some(version.clone()),
        toml::Value::Array(versions) => versions.first().and_then(mise_tool_version),
        toml::Value::Table(table) => table
            .get("version")
            .and_then(toml::Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::manifest::PackageJson;
    use packplan_core::{EnvOverrides, EvidenceView, MockFileSystem};
    use std::sync::Arc;
    use yare::parameterized;

    fn resolve_with(
        manifest: &str,
        files: &[(&str, &str)],
        env: &[(&str, &str)],
    ) -> String {
        let fs = MockFileSystem::new();
        for (path, content) in files {
            fs.add_file(path, content);
        }
        let evidence = EvidenceView::with_fs("/mock", Arc::new(fs))
            .with_env(EnvOverrides::from_pairs(env.iter().copied()));
        let manifest = PackageJson::parse(manifest.as_bytes()).unwrap();
        resolve_node_version(&NodeContext::new(&evidence, &manifest))
    }

    #[test]
    fn test_nvmrc_only() {
        assert_eq!(resolve_with("{}", &[(".nvmrc", "v18.2.0\n")], &[]), "18.2.0");
    }

    #[test]
    fn test_engines_range_yields_major() {
        let manifest = r#"{"engines": {"node": ">=18 <21"}}"#;
        assert_eq!(resolve_with(manifest, &[], &[]), "18");
    }

    #[test]
    fn test_no_signal_is_default() {
        assert_eq!(resolve_with("{}", &[], &[]), DEFAULT_NODE_VERSION);
    }

    #[test]
    fn test_env_override_beats_everything() {
        let manifest = r#"{"engines": {"node": "18"}}"#;
        let files = [(".nvmrc", "16")];

        assert_eq!(
            resolve_with(manifest, &files, &[(keys::NODE_VERSION, " v22.1.0 ")]),
            "22.1.0"
        );
        assert_eq!(
            resolve_with(manifest, &files, &[(keys::LEGACY_NODE_VERSION, "20")]),
            "20"
        );
        assert_eq!(
            resolve_with(
                manifest,
                &files,
                &[(keys::NODE_VERSION, "22"), (keys::LEGACY_NODE_VERSION, "20")]
            ),
            "22"
        );
    }

    #[test]
    fn test_engines_beats_version_files() {
        let manifest = r#"{"engines": {"node": "^20.10.0"}}"#;
        assert_eq!(resolve_with(manifest, &[(".nvmrc", "18")], &[]), "20");
    }

    #[test]
    fn test_version_file_order() {
        let files = [
            (".node-version", "19.0.0"),
            (".tool-versions", "nodejs 17.0.0"),
            ("mise.toml", "[tools]\nnode = \"16\""),
        ];
        assert_eq!(resolve_with("{}", &files, &[]), "19.0.0");
        assert_eq!(resolve_with("{}", &files[1..], &[]), "17.0.0");
        assert_eq!(resolve_with("{}", &files[2..], &[]), "16");
    }

    #[test]
    fn test_blank_file_falls_through() {
        let files = [(".nvmrc", "  \n"), (".node-version", "20.1.0")];
        assert_eq!(resolve_with("{}", &files, &[]), "20.1.0");
    }

    #[parameterized(
        plain = { "20.11.1\n", Some("20.11.1") },
        leading_v = { "v18", Some("18") },
        lts_alias = { "lts/iron", Some(DEFAULT_NODE_VERSION) },
        lts_star = { "LTS/*", Some(DEFAULT_NODE_VERSION) },
        empty = { "", None },
    )]
    fn test_parse_version_file(content: &str, expected: Option<&str>) {
        assert_eq!(parse_version_file(content).as_deref(), expected);
    }

    #[parameterized(
        caret = { "^18.17.0", Some("18") },
        range = { ">=16.0.0 <19", Some("16") },
        exact = { "20", Some("20") },
        tilde = { "~20.1", Some("20") },
        wildcard = { "*", None },
    )]
    fn test_parse_engine_version(constraint: &str, expected: Option<&str>) {
        assert_eq!(parse_engine_version(constraint).as_deref(), expected);
    }

    #[parameterized(
        nodejs = { "ruby 3.2.0\nnodejs 20.9.0\n", Some("20.9.0") },
        node = { "node v21.0.0", Some("21.0.0") },
        missing = { "python 3.12.0\n", None },
        no_version = { "nodejs\n", None },
        prefix_only = { "nodejs-extra 1.0.0", None },
    )]
    fn test_parse_tool_versions(content: &str, expected: Option<&str>) {
        assert_eq!(parse_tool_versions(content).as_deref(), expected);
    }

    #[parameterized(
        node_key = { "[tools]\nnode = \"20\"\n", Some("20") },
        nodejs_key = { "[tools]\nnodejs = \"v18.19.0\"\n", Some("18.19.0") },
        array = { "[tools]\nnode = [\"22\", \"20\"]\n", Some("22") },
        table = { "[tools]\nnode = { version = \"lts\" }\n", Some(DEFAULT_NODE_VERSION) },
        other_tools = { "[tools]\npython = \"3.12\"\n", None },
        invalid_toml_fallback = { "[tools\nnode = \"19\"\n", Some("19") },
        env_section_fallback = { "[env]\nnode = \"17\"\n", Some("17") },
    )]
    fn test_parse_mise_toml(content: &str, expected: Option<&str>) {
        assert_eq!(parse_mise_toml(content).as_deref(), expected);
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version(" v20.1.0\n"), "20.1.0");
        assert_eq!(normalize_version("20"), "20");
        assert_eq!(normalize_version(""), "");
    }
}
