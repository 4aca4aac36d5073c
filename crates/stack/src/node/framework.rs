//! Framework classification and static-vs-server output detection.
//!
//! [`FRAMEWORK_RULES`] is evaluated top to bottom and the first match wins, so
//! meta-frameworks sit above the bundlers and servers they are built on.

use super::package_manager::PackageManager;
use super::NodeContext;
use crate::framework_id::FrameworkId;
use crate::rules::{first_match, Rule};
use crate::syntax::{find_nested_property, find_property, SourceLanguage};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    #[default]
    None,
    Static,
    Server,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Static => "static",
            Self::Server => "server",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameworkInfo {
    pub framework: Option<FrameworkId>,
    pub version: Option<String>,
    pub output_type: OutputType,
    /// Trigger and marker files of the matched rule that exist in the project
    pub config_files: Vec<&'static str>,
}

/// What makes a rule apply
#[derive(Debug)]
pub enum Trigger {
    Dependency(&'static [&'static str]),
    DependencyOrFile {
        dependencies: &'static [&'static str],
        files: &'static [&'static str],
    },
    DependencyAndFile {
        dependencies: &'static [&'static str],
        files: &'static [&'static str],
    },
}

impl Trigger {
    fn dependencies(&self) -> &'static [&'static str] {
        match self {
            Self::Dependency(dependencies)
            | Self::DependencyOrFile { dependencies, .. }
            | Self::DependencyAndFile { dependencies, .. } => *dependencies,
        }
    }

    fn files(&self) -> &'static [&'static str] {
        match self {
            Self::Dependency(_) => &[],
            Self::DependencyOrFile { files, .. } | Self::DependencyAndFile { files, .. } => *files,
        }
    }

    fn matches(&self, ctx: &NodeContext<'_>) -> bool {
        let has_file = |files: &[&str]| files.iter().any(|file| ctx.evidence.has_file(file));

        match *self {
            Self::Dependency(dependencies) => ctx.manifest.has_any_dependency(dependencies),
            Self::DependencyOrFile {
                dependencies,
                files,
            } => ctx.manifest.has_any_dependency(dependencies) || has_file(files),
            Self::DependencyAndFile {
                dependencies,
                files,
            } => ctx.manifest.has_any_dependency(dependencies) && has_file(files),
        }
    }
}

/// Marker property in a framework config that flips the output type.
///
/// Files are checked in order and the first one holding a marker value
/// decides; `path` has one segment for a top-level key.
#[derive(Debug)]
pub struct ConfigMarker {
    pub files: &'static [&'static str],
    pub path: &'static [&'static str],
    pub values: &'static [&'static str],
    pub matched: OutputType,
    pub baseline: OutputType,
}

impl ConfigMarker {
    fn resolve(&self, ctx: &NodeContext<'_>) -> OutputType {
        for file in self.files {
            if !ctx.evidence.has_file(file) {
                continue;
            }

            let source = match ctx.evidence.read_to_string(file) {
                Ok(source) => source,
                Err(e) => {
                    debug!(file, error = %e, "Skipping unreadable framework config");
                    continue;
                }
            };

            let language = SourceLanguage::from_path(file);
            let value = match self.path {
                [name] => find_property(&source, language, name),
                path => find_nested_property(&source, language, path),
            };

            if let Some(value) = value {
                if self.values.contains(&value.as_str()) {
                    debug!(file, marker = %self.path.join("."), value = %value, "Config marker matched");
                    return self.matched;
                }
            }
        }

        self.baseline
    }
}

#[derive(Debug)]
pub enum OutputRule {
    Fixed(OutputType),
    /// One output type when a companion package (an adapter, an SSR add-on) is declared
    WithDependency {
        dependency: &'static str,
        present: OutputType,
        absent: OutputType,
    },
    Config(ConfigMarker),
}

impl OutputRule {
    fn files(&self) -> &'static [&'static str] {
        match self {
            Self::Config(marker) => marker.files,
            _ => &[],
        }
    }

    fn resolve(&self, ctx: &NodeContext<'_>) -> OutputType {
        match self {
            Self::Fixed(output) => *output,
            Self::WithDependency {
                dependency,
                present,
                absent,
            } => {
                if ctx.manifest.has_dependency(dependency) {
                    *present
                } else {
                    *absent
                }
            }
            Self::Config(marker) => marker.resolve(ctx),
        }
    }
}

#[derive(Debug)]
pub struct FrameworkRule {
    pub name: &'static str,
    pub framework: FrameworkId,
    pub trigger: Trigger,
    pub output: OutputRule,
}

impl Rule<NodeContext<'_>> for FrameworkRule {
    type Output = FrameworkInfo;

    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, ctx: &NodeContext<'_>) -> Option<FrameworkInfo> {
        if !self.trigger.matches(ctx) {
            return None;
        }

        let version = self
            .trigger
            .dependencies()
            .iter()
            .find_map(|dep| ctx.manifest.dependency_version(dep))
            .and_then(clean_version);

        let mut config_files: Vec<&'static str> = Vec::new();
        for file in self.trigger.files().iter().chain(self.output.files()) {
            if !config_files.contains(file) && ctx.evidence.has_file(file) {
                config_files.push(*file);
            }
        }

        Some(FrameworkInfo {
            framework: Some(self.framework),
            version,
            output_type: self.output.resolve(ctx),
            config_files,
        })
    }
}

const fn fixed(
    name: &'static str,
    framework: FrameworkId,
    dependencies: &'static [&'static str],
    output: OutputType,
) -> FrameworkRule {
    FrameworkRule {
        name,
        framework,
        trigger: Trigger::Dependency(dependencies),
        output: OutputRule::Fixed(output),
    }
}

pub static FRAMEWORK_RULES: &[FrameworkRule] = &[
    FrameworkRule {
        name: "nextjs",
        framework: FrameworkId::NextJs,
        trigger: Trigger::Dependency(&["next"]),
        output: OutputRule::Config(ConfigMarker {
            files: &["next.config.ts", "next.config.mjs", "next.config.js"],
            path: &["output"],
            values: &["export"],
            matched: OutputType::Static,
            baseline: OutputType::Server,
        }),
    },
    fixed(
        "remix",
        FrameworkId::Remix,
        &["@remix-run/react", "@remix-run/node"],
        OutputType::Server,
    ),
    FrameworkRule {
        name: "nuxt",
        framework: FrameworkId::Nuxt,
        trigger: Trigger::Dependency(&["nuxt", "nuxt3"]),
        output: OutputRule::Config(ConfigMarker {
            files: &["nuxt.config.ts", "nuxt.config.js", "nuxt.config.mjs"],
            path: &["ssr"],
            values: &["false"],
            matched: OutputType::Static,
            baseline: OutputType::Server,
        }),
    },
    FrameworkRule {
        name: "astro",
        framework: FrameworkId::Astro,
        trigger: Trigger::DependencyOrFile {
            dependencies: &["astro"],
            files: &["astro.config.mjs", "astro.config.js", "astro.config.ts"],
        },
        output: OutputRule::Config(ConfigMarker {
            files: &["astro.config.ts", "astro.config.mjs", "astro.config.js"],
            path: &["output"],
            values: &["server", "hybrid"],
            matched: OutputType::Server,
            baseline: OutputType::Static,
        }),
    },
    FrameworkRule {
        name: "sveltekit",
        framework: FrameworkId::SvelteKit,
        trigger: Trigger::Dependency(&["@sveltejs/kit"]),
        output: OutputRule::WithDependency {
            dependency: "@sveltejs/adapter-static",
            present: OutputType::Static,
            absent: OutputType::Server,
        },
    },
    FrameworkRule {
        name: "solid-start",
        framework: FrameworkId::SolidStart,
        trigger: Trigger::Dependency(&["@solidjs/start", "solid-start"]),
        output: OutputRule::Config(ConfigMarker {
            files: &["app.config.ts", "app.config.js"],
            path: &["ssr"],
            values: &["false"],
            matched: OutputType::Static,
            baseline: OutputType::Server,
        }),
    },
    FrameworkRule {
        name: "tanstack-start",
        framework: FrameworkId::TanStackStart,
        trigger: Trigger::Dependency(&["@tanstack/react-start", "@tanstack/start"]),
        output: OutputRule::Config(ConfigMarker {
            files: &["app.config.ts", "app.config.js"],
            path: &["server", "preset"],
            values: &["static"],
            matched: OutputType::Static,
            baseline: OutputType::Server,
        }),
    },
    // React Router v7 framework mode is the successor of Remix and builds the same way
    FrameworkRule {
        name: "react-router-framework",
        framework: FrameworkId::Remix,
        trigger: Trigger::DependencyAndFile {
            dependencies: &["react-router"],
            files: &["react-router.config.ts", "react-router.config.js"],
        },
        output: OutputRule::Config(ConfigMarker {
            files: &["react-router.config.ts", "react-router.config.js"],
            path: &["ssr"],
            values: &["false"],
            matched: OutputType::Static,
            baseline: OutputType::Server,
        }),
    },
    fixed("gatsby", FrameworkId::Gatsby, &["gatsby"], OutputType::Static),
    fixed(
        "eleventy",
        FrameworkId::Eleventy,
        &["@11ty/eleventy"],
        OutputType::Static,
    ),
    FrameworkRule {
        name: "angular",
        framework: FrameworkId::Angular,
        trigger: Trigger::DependencyOrFile {
            dependencies: &["@angular/core"],
            files: &["angular.json"],
        },
        output: OutputRule::WithDependency {
            dependency: "@angular/ssr",
            present: OutputType::Server,
            absent: OutputType::Static,
        },
    },
    fixed(
        "adonisjs",
        FrameworkId::AdonisJs,
        &["@adonisjs/core"],
        OutputType::Server,
    ),
    fixed("nestjs", FrameworkId::NestJs, &["@nestjs/core"], OutputType::Server),
    fixed("fastify", FrameworkId::Fastify, &["fastify"], OutputType::Server),
    fixed("express", FrameworkId::Express, &["express"], OutputType::Server),
    fixed(
        "create-react-app",
        FrameworkId::CreateReactApp,
        &["react-scripts"],
        OutputType::Static,
    ),
    FrameworkRule {
        name: "vite",
        framework: FrameworkId::Vite,
        trigger: Trigger::DependencyOrFile {
            dependencies: &["vite"],
            files: &["vite.config.js", "vite.config.ts", "vite.config.mjs"],
        },
        output: OutputRule::Fixed(OutputType::Static),
    },
];

/// Classify the project's framework. No match is `FrameworkInfo::default()`.
pub fn classify_framework(ctx: &NodeContext<'_>) -> FrameworkInfo {
    match first_match(FRAMEWORK_RULES, ctx) {
        Some((rule, info)) => {
            debug!(
                rule = rule.name,
                framework = %rule.framework,
                output_type = info.output_type.as_str(),
                "Classified framework"
            );
            info
        }
        None => {
            debug!("No framework detected");
            FrameworkInfo::default()
        }
    }
}

/// Strip leading range operators from a declared version: `^14.1.0` is `14.1.0`.
pub fn clean_version(range: &str) -> Option<String> {
    let cleaned = range.trim_start_matches(|c: char| matches!(c, '^' | '~' | '>' | '<' | '=' | ' '));
    let cleaned = cleaned.trim_end();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Client-side routers whose presence marks a static build as a single-page app
const SPA_ROUTERS: &[&str] = &[
    "vue-router",
    "react-router-dom",
    "react-router",
    "@reach/router",
    "wouter",
    "@tanstack/react-router",
    "svelte-navigator",
    "svelte-routing",
    "@roxi/routify",
    "@solidjs/router",
    "solid-app-router",
    "preact-router",
    "navigo",
    "page",
];

/// A static build is an SPA when it ships a client-side router and is not a
/// site generator that prerenders every route.
pub fn is_spa(ctx: &NodeContext<'_>, info: &FrameworkInfo) -> bool {
    if info.output_type != OutputType::Static {
        return false;
    }

    if matches!(
        info.framework,
        Some(
            FrameworkId::Gatsby
                | FrameworkId::Eleventy
                | FrameworkId::NextJs
                | FrameworkId::Nuxt
                | FrameworkId::Astro
        )
    ) {
        return false;
    }

    ctx.manifest.has_any_dependency(SPA_ROUTERS)
}

/// `<run> build` for frameworks with a bundling step.
pub fn default_build_command(framework: FrameworkId, pm: PackageManager) -> Option<String> {
    framework
        .has_build_step()
        .then(|| pm.run_script("build"))
}

pub fn default_start_command(framework: FrameworkId, pm: PackageManager) -> Option<String> {
    match framework {
        FrameworkId::NextJs
        | FrameworkId::Remix
        | FrameworkId::NestJs
        | FrameworkId::Express
        | FrameworkId::Fastify => Some(pm.run_script("start")),
        FrameworkId::Nuxt => Some("node .output/server/index.mjs".to_string()),
        FrameworkId::Astro => Some("node ./dist/server/entry.mjs".to_string()),
        _ => None,
    }
}
