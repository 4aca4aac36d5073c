//! Catalog of npm packages that need OS libraries at build or run time.

use super::manifest::PackageJson;
use std::collections::HashSet;

#[derive(Debug)]
pub struct NativeDependencyRule {
    pub package: &'static str,
    pub os_packages: &'static [&'static str],
    pub description: &'static str,
}

const BROWSER_LIBS: &[&str] = &[
    "libnss3",
    "libatk1.0-0",
    "libatk-bridge2.0-0",
    "libcups2",
    "libdrm2",
    "libxkbcommon0",
    "libxcomposite1",
    "libxdamage1",
    "libxfixes3",
    "libxrandr2",
    "libgbm1",
    "libasound2",
    "libpango-1.0-0",
    "libcairo2",
];

const CHROMIUM_WITH_BROWSER_LIBS: &[&str] = &[
    "chromium",
    "libnss3",
    "libatk1.0-0",
    "libatk-bridge2.0-0",
    "libcups2",
    "libdrm2",
    "libxkbcommon0",
    "libxcomposite1",
    "libxdamage1",
    "libxfixes3",
    "libxrandr2",
    "libgbm1",
    "libasound2",
    "libpango-1.0-0",
    "libcairo2",
];

const NODE_GYP_TOOLCHAIN: &[&str] = &["build-essential", "python3"];

pub static NATIVE_DEPENDENCIES: &[NativeDependencyRule] = &[
    NativeDependencyRule {
        package: "sharp",
        os_packages: &["libvips-dev"],
        description: "Image processing via libvips",
    },
    NativeDependencyRule {
        package: "@prisma/client",
        os_packages: &["openssl"],
        description: "Prisma query engine links against OpenSSL",
    },
    NativeDependencyRule {
        package: "prisma",
        os_packages: &["openssl"],
        description: "Prisma CLI links against OpenSSL",
    },
    NativeDependencyRule {
        package: "puppeteer",
        os_packages: CHROMIUM_WITH_BROWSER_LIBS,
        description: "Headless Chromium",
    },
    NativeDependencyRule {
        package: "playwright",
        os_packages: BROWSER_LIBS,
        description: "Browser automation runtime libraries",
    },
    NativeDependencyRule {
        package: "canvas",
        os_packages: &[
            "libcairo2-dev",
            "libjpeg-dev",
            "libpango1.0-dev",
            "libgif-dev",
            "librsvg2-dev",
        ],
        description: "Cairo-backed canvas",
    },
    NativeDependencyRule {
        package: "bcrypt",
        os_packages: NODE_GYP_TOOLCHAIN,
        description: "Native bcrypt bindings built with node-gyp",
    },
    NativeDependencyRule {
        package: "argon2",
        os_packages: &["build-essential"],
        description: "Native argon2 bindings",
    },
    NativeDependencyRule {
        package: "sqlite3",
        os_packages: NODE_GYP_TOOLCHAIN,
        description: "SQLite bindings built with node-gyp",
    },
    NativeDependencyRule {
        package: "better-sqlite3",
        os_packages: NODE_GYP_TOOLCHAIN,
        description: "SQLite bindings built with node-gyp",
    },
    NativeDependencyRule {
        package: "node-gyp",
        os_packages: NODE_GYP_TOOLCHAIN,
        description: "Native addon build tool",
    },
    NativeDependencyRule {
        package: "cpu-features",
        os_packages: &["build-essential"],
        description: "CPU feature detection addon",
    },
    NativeDependencyRule {
        package: "ssh2",
        os_packages: &["build-essential"],
        description: "Optional native crypto for SSH",
    },
    NativeDependencyRule {
        package: "libsql",
        os_packages: &["build-essential"],
        description: "libSQL native bindings",
    },
    NativeDependencyRule {
        package: "@libsql/client",
        os_packages: &["build-essential"],
        description: "libSQL native bindings",
    },
];

/// Native dependencies found in a manifest, with the OS packages they need
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NativeRequirements {
    /// npm package names, in catalog order
    pub packages: Vec<&'static str>,
    /// OS packages, first-seen order, each listed once
    pub os_packages: Vec<&'static str>,
}

impl NativeRequirements {
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

pub fn detect_native_dependencies(manifest: &PackageJson) -> NativeRequirements {
    let mut requirements = NativeRequirements::default();
    let mut seen = HashSet::new();

    for rule in NATIVE_DEPENDENCIES {
        if !manifest.has_dependency(rule.package) {
            continue;
        }

        requirements.packages.push(rule.package);
        for os_package in rule.os_packages {
            if seen.insert(*os_package) {
                requirements.os_packages.push(*os_package);
            }
        }
    }

    requirements
}
