//! Node.js provider: package manager, runtime version, framework and native
//! dependency detection composed into a [`Plan`].

pub mod commands;
pub mod framework;
pub mod manifest;
pub mod native_deps;
pub mod package_manager;
pub mod version;
pub mod workspace;

pub use framework::{FrameworkInfo, OutputType};
pub use manifest::PackageJson;
pub use package_manager::{PackageManager, PackageManagerInfo};

use crate::provider::{Provider, ProviderError};
use commands::{resolve_commands, Commands};
use framework::{classify_framework, is_spa};
use native_deps::detect_native_dependencies;
use package_manager::resolve_package_manager;
use packplan_core::{EvidenceView, Plan};
use serde_json::json;
use tracing::{debug, info};
use version::{resolve_node_version, VERSION_FILES};
use workspace::resolve_workspaces;

pub const PROVIDER_NAME: &str = "node";

/// Config files recorded in `detected_files` when present
const CONFIG_FILES: &[&str] = &[
    ".yarnrc.yml",
    ".yarnrc.yaml",
    ".npmrc",
    ".pnpmrc",
    "tsconfig.json",
    "jsconfig.json",
    "vite.config.js",
    "vite.config.ts",
    "vite.config.mjs",
    "next.config.js",
    "next.config.mjs",
    "next.config.ts",
    "astro.config.mjs",
    "astro.config.js",
    "astro.config.ts",
    "angular.json",
    "remix.config.js",
    "nuxt.config.ts",
    "nuxt.config.js",
    "nuxt.config.mjs",
    "pnpm-workspace.yaml",
];

const MOON_WORKSPACE_FILE: &str = ".moon/workspace.yml";

/// Read-only inputs shared by every Node resolver during one plan
#[derive(Debug, Clone, Copy)]
pub struct NodeContext<'a> {
    pub evidence: &'a EvidenceView,
    pub manifest: &'a PackageJson,
}

impl<'a> NodeContext<'a> {
    pub fn new(evidence: &'a EvidenceView, manifest: &'a PackageJson) -> Self {
        Self { evidence, manifest }
    }
}

#[derive(Debug, Default)]
pub struct NodeProvider;

impl NodeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for NodeProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn detect(&self, evidence: &EvidenceView) -> Result<bool, ProviderError> {
        Ok(evidence.has_file(manifest::MANIFEST_FILE))
    }

    fn plan(&self, evidence: &EvidenceView) -> Result<Plan, ProviderError> {
        let manifest = PackageJson::load(evidence)?;
        let ctx = NodeContext::new(evidence, &manifest);

        let pm = resolve_package_manager(&ctx);
        let framework = classify_framework(&ctx);
        let commands = resolve_commands(&ctx, pm.manager, &framework);

        let mut plan = if pm.manager == PackageManager::Bun {
            let mut plan = Plan::new(PROVIDER_NAME, "bun");
            plan.language_version = pm.version.clone().unwrap_or_else(|| "latest".to_string());
            plan.set_metadata("runtime", "bun");
            plan.set_metadata(
                "runtime_note",
                "Bun runs the project directly; no Node.js runtime is installed",
            );
            plan
        } else {
            let mut plan = Plan::new(PROVIDER_NAME, "nodejs");
            plan.language_version = resolve_node_version(&ctx);
            plan
        };

        plan.package_manager = Some(pm.manager.as_str().to_string());
        plan.package_manager_version = pm.version.clone();

        if let Some(id) = framework.framework {
            plan.framework = Some(id.as_str().to_string());
            plan.framework_version = framework.version.clone();
        }
        if framework.output_type != OutputType::None {
            plan.set_metadata("output_type", framework.output_type.as_str());
        }
        if framework.output_type == OutputType::Static {
            plan.set_metadata("is_spa", is_spa(&ctx, &framework));
        }

        plan.detected_files = detected_files(evidence, &pm, &framework, &commands);
        plan.install_command = Some(commands.install);
        plan.build_command = commands.build;
        plan.start_command = commands.start;

        add_manifest_metadata(&mut plan, &ctx);
        add_override_metadata(&mut plan, evidence);

        info!(
            provider = PROVIDER_NAME,
            language = %plan.language,
            version = %plan.language_version,
            package_manager = pm.manager.as_str(),
            framework = plan.framework.as_deref().unwrap_or("none"),
            "Plan synthesized"
        );

        Ok(plan)
    }
}

fn add_manifest_metadata(plan: &mut Plan, ctx: &NodeContext<'_>) {
    let manifest = ctx.manifest;

    if let Some(name) = manifest.name.as_deref().filter(|n| !n.is_empty()) {
        plan.set_metadata("name", name);
    }
    if let Some(version) = manifest.version.as_deref().filter(|v| !v.is_empty()) {
        plan.set_metadata("version", version);
    }
    if let Some(module_type) = manifest.module_type.as_deref().filter(|t| !t.is_empty()) {
        plan.set_metadata("module_type", module_type);
    }

    if let Some(layout) = resolve_workspaces(ctx) {
        plan.set_metadata("is_monorepo", true);
        plan.set_metadata("workspaces", json!(layout.patterns));
        if !layout.packages.is_empty() {
            plan.set_metadata("workspace_packages", json!(layout.packages));
        }
    }

    let native = detect_native_dependencies(manifest);
    if !native.is_empty() {
        debug!(packages = ?native.packages, "Native dependencies require OS packages");
        plan.set_metadata("apt_packages", json!(native.os_packages));
        plan.set_metadata("native_packages", json!(native.packages));
    }

    if manifest.has_dependency("cypress") {
        plan.set_metadata("has_cypress", true);
    }
    if ctx.evidence.has_file(MOON_WORKSPACE_FILE) {
        plan.set_metadata("has_moon", true);
    }
    if !manifest.cache_directories.is_empty() {
        plan.set_metadata("cache_directories", json!(manifest.cache_directories));
    }
}

fn add_override_metadata(plan: &mut Plan, evidence: &EvidenceView) {
    let overrides = evidence.env();

    if let Some(image) = overrides.base_image() {
        plan.set_metadata("base_image", image);
    }
    if let Some(dir) = overrides.spa_output_dir() {
        plan.set_metadata("spa_output_dir", dir);
    }
    if let Some(server) = overrides.static_server() {
        plan.set_metadata("static_server", server.as_str());
    }
}

/// Manifest, lock file, version files, then config files, each only if
/// present. Any other file a resolver acted on follows, without duplicates.
fn detected_files(
    evidence: &EvidenceView,
    pm: &PackageManagerInfo,
    framework: &FrameworkInfo,
    commands: &Commands,
) -> Vec<String> {
    let mut files = vec![manifest::MANIFEST_FILE];

    let lock_file = pm.manager.lock_file();
    if evidence.has_file(lock_file) {
        files.push(lock_file);
    }

    for file in VERSION_FILES.iter().chain(CONFIG_FILES) {
        if evidence.has_file(file) {
            files.push(*file);
        }
    }

    let acted_on = pm
        .signal_file
        .into_iter()
        .chain(framework.config_files.iter().copied())
        .chain(commands.entry_point)
        .chain(evidence.has_file(MOON_WORKSPACE_FILE).then_some(MOON_WORKSPACE_FILE));
    for file in acted_on {
        if !files.contains(&file) {
            files.push(file);
        }
    }

    files.into_iter().map(str::to_string).collect()
}
