use super::NodeContext;
use crate::rules::{first_match, Rule};
use tracing::debug;

crate::define_id_enum! {
    /// JavaScript package manager
    PackageManager {
        Npm => "npm" : "NPM",
        Yarn => "yarn" : "Yarn" | "yarn1",
        YarnBerry => "yarnberry" : "Yarn Berry" | "berry",
        Pnpm => "pnpm" : "PNPM",
        Bun => "bun" : "Bun",
    }
}

impl PackageManager {
    pub fn install_command(&self) -> &'static str {
        match self {
            Self::Npm => "npm ci",
            Self::Yarn => "yarn install --frozen-lockfile",
            Self::YarnBerry => "yarn install --immutable",
            Self::Pnpm => "pnpm install --frozen-lockfile",
            Self::Bun => "bun install --frozen-lockfile",
        }
    }

    /// Prefix for running a package script, e.g. `npm run` in `npm run build`
    pub fn run_prefix(&self) -> &'static str {
        match self {
            Self::Npm => "npm run",
            Self::Yarn | Self::YarnBerry => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun run",
        }
    }

    pub fn run_script(&self, script: &str) -> String {
        format!("{} {}", self.run_prefix(), script)
    }

    pub fn lock_file(&self) -> &'static str {
        match self {
            Self::Npm => "package-lock.json",
            Self::Yarn | Self::YarnBerry => "yarn.lock",
            Self::Pnpm => "pnpm-lock.yaml",
            Self::Bun => "bun.lockb",
        }
    }

    /// Map a `packageManager` field name; yarn versions 2 and up are Berry.
    fn from_declared(name: &str, version: Option<&str>) -> Option<Self> {
        match name {
            "npm" => Some(Self::Npm),
            "pnpm" => Some(Self::Pnpm),
            "bun" => Some(Self::Bun),
            "yarn" if version.is_some_and(is_berry_version) => Some(Self::YarnBerry),
            "yarn" => Some(Self::Yarn),
            _ => None,
        }
    }
}

fn is_berry_version(version: &str) -> bool {
    matches!(version.chars().next(), Some('2'..='9'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManagerInfo {
    pub manager: PackageManager,
    pub version: Option<String>,
    /// Lock or marker file that decided the manager, if any.
    pub signal_file: Option<&'static str>,
}

impl PackageManagerInfo {
    fn new(manager: PackageManager) -> Self {
        Self {
            manager,
            version: None,
            signal_file: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum EngineField {
    Pnpm,
    Bun,
    Yarn,
}

/// One row of the package manager decision table
#[derive(Debug)]
pub enum PackageManagerSignal {
    /// `"packageManager": "name@version"` in the manifest
    DeclaredField,
    LockFile {
        files: &'static [&'static str],
        manager: PackageManager,
    },
    Engine {
        field: EngineField,
        manager: PackageManager,
    },
}

pub const PACKAGE_MANAGER_SIGNALS: &[PackageManagerSignal] = &[
    PackageManagerSignal::DeclaredField,
    PackageManagerSignal::LockFile {
        files: &["pnpm-lock.yaml"],
        manager: PackageManager::Pnpm,
    },
    PackageManagerSignal::LockFile {
        files: &["bun.lockb", "bun.lock"],
        manager: PackageManager::Bun,
    },
    PackageManagerSignal::LockFile {
        files: &[".yarnrc.yml", ".yarnrc.yaml"],
        manager: PackageManager::YarnBerry,
    },
    PackageManagerSignal::LockFile {
        files: &["yarn.lock"],
        manager: PackageManager::Yarn,
    },
    PackageManagerSignal::LockFile {
        files: &["package-lock.json"],
        manager: PackageManager::Npm,
    },
    PackageManagerSignal::Engine {
        field: EngineField::Pnpm,
        manager: PackageManager::Pnpm,
    },
    PackageManagerSignal::Engine {
        field: EngineField::Bun,
        manager: PackageManager::Bun,
    },
    PackageManagerSignal::Engine {
        field: EngineField::Yarn,
        manager: PackageManager::Yarn,
    },
];

impl Rule<NodeContext<'_>> for PackageManagerSignal {
    type Output = PackageManagerInfo;

    fn name(&self) -> &str {
        match self {
            Self::DeclaredField => "packageManager",
            Self::LockFile { files, .. } => files.first().copied().unwrap_or("lockfile"),
            Self::Engine { field, .. } => match field {
                EngineField::Pnpm => "engines.pnpm",
                EngineField::Bun => "engines.bun",
                EngineField::Yarn => "engines.yarn",
            },
        }
    }

    fn evaluate(&self, ctx: &NodeContext<'_>) -> Option<PackageManagerInfo> {
        match self {
            Self::DeclaredField => {
                let field = ctx.manifest.package_manager_field()?;
                let manager = PackageManager::from_declared(&field.name, field.version.as_deref());
                if manager.is_none() {
                    debug!(name = %field.name, "Ignoring unknown packageManager");
                }
                Some(PackageManagerInfo {
                    manager: manager?,
                    version: field.version,
                    signal_file: None,
                })
            }
            Self::LockFile { files, manager } => {
                let file = files.iter().find(|file| ctx.evidence.has_file(file))?;
                Some(PackageManagerInfo {
                    signal_file: Some(*file),
                    ..PackageManagerInfo::new(*manager)
                })
            }
            Self::Engine { field, manager } => {
                let engines = &ctx.manifest.engines;
                let constraint = match field {
                    EngineField::Pnpm => engines.pnpm.as_deref(),
                    EngineField::Bun => engines.bun.as_deref(),
                    EngineField::Yarn => engines.yarn.as_deref(),
                };
                constraint
                    .filter(|c| !c.is_empty())
                    .map(|_| PackageManagerInfo::new(*manager))
            }
        }
    }
}

/// Resolve the package manager; npm when no signal is present.
pub fn resolve_package_manager(ctx: &NodeContext<'_>) -> PackageManagerInfo {
    match first_match(PACKAGE_MANAGER_SIGNALS, ctx) {
        Some((signal, info)) => {
            debug!(
                signal = signal.name(),
                manager = %info.manager,
                version = info.version.as_deref().unwrap_or(""),
                "Resolved package manager"
            );
            info
        }
        None => {
            debug!("No package manager signal, defaulting to npm");
            PackageManagerInfo::new(PackageManager::Npm)
        }
    }
}
