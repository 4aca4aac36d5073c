use super::framework::{default_build_command, default_start_command, FrameworkInfo};
use super::package_manager::PackageManager;
use super::NodeContext;
use tracing::debug;

/// Entry points tried in order when nothing else names a start command
pub const ENTRY_POINT_CANDIDATES: &[&str] = &[
    "dist/index.js",
    "build/index.js",
    "index.js",
    "server.js",
    "app.js",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commands {
    pub install: String,
    pub build: Option<String>,
    pub start: Option<String>,
    /// Entry point file the start command runs, when it came from
    /// [`ENTRY_POINT_CANDIDATES`]
    pub entry_point: Option<&'static str>,
}

/// Environment overrides win, then manifest scripts, then framework defaults.
pub fn resolve_commands(
    ctx: &NodeContext<'_>,
    pm: PackageManager,
    framework: &FrameworkInfo,
) -> Commands {
    let overrides = ctx.evidence.env();

    let install = overrides
        .install_command()
        .map(str::to_string)
        .unwrap_or_else(|| pm.install_command().to_string());

    let build = match overrides.build_command() {
        Some(command) => Some(command.to_string()),
        None => build_command(ctx, pm, framework),
    };

    let (start, entry_point) = match overrides.start_command() {
        Some(command) => (Some(command.to_string()), None),
        None => start_command(ctx, pm, framework),
    };

    Commands {
        install,
        build,
        start,
        entry_point,
    }
}

fn build_command(
    ctx: &NodeContext<'_>,
    pm: PackageManager,
    framework: &FrameworkInfo,
) -> Option<String> {
    if ctx.manifest.has_script("build") {
        return Some(pm.run_script("build"));
    }

    framework
        .framework
        .and_then(|id| default_build_command(id, pm))
}

fn start_command(
    ctx: &NodeContext<'_>,
    pm: PackageManager,
    framework: &FrameworkInfo,
) -> (Option<String>, Option<&'static str>) {
    for script in ["start", "serve"] {
        if ctx.manifest.has_script(script) {
            return (Some(pm.run_script(script)), None);
        }
    }

    if let Some(command) = framework
        .framework
        .and_then(|id| default_start_command(id, pm))
    {
        return (Some(command), None);
    }

    if let Some(main) = ctx.manifest.main.as_deref().filter(|m| !m.is_empty()) {
        return (Some(format!("node {}", main)), None);
    }

    let entry = ENTRY_POINT_CANDIDATES
        .iter()
        .copied()
        .find(|candidate| ctx.evidence.has_file(candidate));
    if entry.is_none() {
        debug!("No start command could be derived");
    }
    (entry.map(|entry| format!("node {}", entry)), entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework_id::FrameworkId;
    use crate::node::framework::OutputType;
    use crate::node::manifest::PackageJson;
    use packplan_core::config::keys;
    use packplan_core::{EnvOverrides, EvidenceView, MockFileSystem};
    use std::sync::Arc;

    struct Fixture {
        evidence: EvidenceView,
        manifest: PackageJson,
    }

    impl Fixture {
        fn new(manifest: &str, files: &[&str]) -> Self {
            let fs = MockFileSystem::new();
            for file in files {
                fs.add_file(file, "");
            }
            Self {
                evidence: EvidenceView::with_fs("/mock", Arc::new(fs)),
                manifest: PackageJson::parse(manifest.as_bytes()).unwrap(),
            }
        }

        fn with_env(mut self, pairs: &[(&str, &str)]) -> Self {
            self.evidence = self
                .evidence
                .with_env(EnvOverrides::from_pairs(pairs.iter().copied()));
            self
        }

        fn commands(&self, pm: PackageManager, framework: Option<FrameworkId>) -> Commands {
            let info = FrameworkInfo {
                framework,
                version: None,
                output_type: OutputType::None,
                config_files: Vec::new(),
            };
            resolve_commands(&NodeContext::new(&self.evidence, &self.manifest), pm, &info)
        }
    }

    #[test]
    fn test_scripts_beat_framework_defaults() {
        let fixture = Fixture::new(
            r#"{"scripts": {"build": "next build", "start": "next start -p 8080"}}"#,
            &[],
        );
        let commands = fixture.commands(PackageManager::Pnpm, Some(FrameworkId::NextJs));

        assert_eq!(commands.install, "pnpm install --frozen-lockfile");
        assert_eq!(commands.build.as_deref(), Some("pnpm build"));
        assert_eq!(commands.start.as_deref(), Some("pnpm start"));
    }

    #[test]
    fn test_serve_script_beats_framework_default() {
        let fixture = Fixture::new(r#"{"scripts": {"serve": "vite preview"}}"#, &[]);
        let commands = fixture.commands(PackageManager::Npm, Some(FrameworkId::Remix));
        assert_eq!(commands.start.as_deref(), Some("npm run serve"));
    }

    #[test]
    fn test_framework_defaults() {
        let fixture = Fixture::new("{}", &[]);

        let commands = fixture.commands(PackageManager::Yarn, Some(FrameworkId::Nuxt));
        assert_eq!(commands.build.as_deref(), Some("yarn build"));
        assert_eq!(
            commands.start.as_deref(),
            Some("node .output/server/index.mjs")
        );

        let commands = fixture.commands(PackageManager::Bun, Some(FrameworkId::Express));
        assert_eq!(commands.build, None);
        assert_eq!(commands.start.as_deref(), Some("bun run start"));
    }

    #[test]
    fn test_main_field_beats_entry_points() {
        let fixture = Fixture::new(r#"{"main": "lib/server.js"}"#, &["index.js"]);
        let commands = fixture.commands(PackageManager::Npm, None);
        assert_eq!(commands.start.as_deref(), Some("node lib/server.js"));
        assert_eq!(commands.entry_point, None);
    }

    #[test]
    fn test_entry_point_candidate_order() {
        let fixture = Fixture::new("{}", &["app.js", "server.js", "build/index.js"]);
        let commands = fixture.commands(PackageManager::Npm, None);
        assert_eq!(commands.start.as_deref(), Some("node build/index.js"));
        assert_eq!(commands.entry_point, Some("build/index.js"));
    }

    #[test]
    fn test_nothing_to_run_leaves_commands_empty() {
        let fixture = Fixture::new("{}", &[]);
        let commands = fixture.commands(PackageManager::Npm, None);

        assert_eq!(commands.install, "npm ci");
        assert_eq!(commands.build, None);
        assert_eq!(commands.start, None);
    }

    #[test]
    fn test_env_overrides_win() {
        let fixture = Fixture::new(
            r#"{"scripts": {"build": "tsc", "start": "node dist/main.js"}}"#,
            &[],
        )
        .with_env(&[
            (keys::INSTALL_CMD, "npm install --omit=dev"),
            (keys::BUILD_CMD, "make build"),
            (keys::START_CMD, "./bin/serve"),
        ]);

        let commands = fixture.commands(PackageManager::Npm, Some(FrameworkId::NestJs));
        assert_eq!(commands.install, "npm install --omit=dev");
        assert_eq!(commands.build.as_deref(), Some("make build"));
        assert_eq!(commands.start.as_deref(), Some("./bin/serve"));
    }
}
