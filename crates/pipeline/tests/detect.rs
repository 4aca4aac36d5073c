use packplan_core::{EnvOverrides, EvidenceView, Plan};
use packplan_pipeline::{DetectError, Detector};
use serde_json::json;
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use yare::parameterized;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, content) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }
    dir
}

/// Detection without reading the ambient process environment
fn detect(dir: &Path) -> Option<Plan> {
    Detector::with_defaults()
        .detect_evidence(&EvidenceView::new(dir))
        .unwrap()
}

#[test]
fn test_empty_directory_has_no_plan() {
    let dir = project(&[]);
    assert_eq!(detect(dir.path()), None);
}

#[test]
fn test_foreign_project_has_no_plan() {
    let dir = project(&[("Cargo.toml", "[package]\nname = \"x\"\n"), ("go.mod", "module x\n")]);
    assert_eq!(detect(dir.path()), None);
}

#[test]
fn test_invalid_manifest_is_an_error() {
    let dir = project(&[("package.json", "{ \"name\": ")]);
    let err = Detector::with_defaults()
        .detect_evidence(&EvidenceView::new(dir.path()))
        .unwrap_err();
    assert!(matches!(err, DetectError::Provider { provider: "node", .. }));
}

#[test]
fn test_file_instead_of_directory() {
    let dir = project(&[("package.json", "{}")]);
    let err = Detector::with_defaults()
        .detect(&dir.path().join("package.json"))
        .unwrap_err();
    assert!(matches!(err, DetectError::NotADirectory(_)));
}

#[test]
fn test_package_manager_field_beats_lock_file() {
    let dir = project(&[
        ("package.json", r#"{"packageManager": "pnpm@8.6.0"}"#),
        ("yarn.lock", "# yarn lockfile v1\n"),
    ]);

    let plan = detect(dir.path()).unwrap();
    assert_eq!(plan.package_manager.as_deref(), Some("pnpm"));
    assert_eq!(plan.package_manager_version.as_deref(), Some("8.6.0"));
    assert_eq!(plan.install_command.as_deref(), Some("pnpm install --frozen-lockfile"));
    assert_eq!(plan.detected_files, vec!["package.json"]);
}

#[parameterized(
    next_export_ts = { "next.config.ts", "const nextConfig = { output: \"export\" };\nexport default nextConfig;\n", "static" },
    next_export_mjs = { "next.config.mjs", "/** @type {import('next').NextConfig} */\nexport default { output: 'export', images: { unoptimized: true } };\n", "static" },
    next_standalone = { "next.config.js", "module.exports = { output: 'standalone' };\n", "server" },
    next_plain = { "next.config.js", "module.exports = {};\n", "server" },
)]
fn test_next_output_mode(config_file: &str, config: &str, output_type: &str) {
    let dir = project(&[
        ("package.json", r#"{"dependencies": {"next": "14.2.3", "react": "18.3.1"}}"#),
        (config_file, config),
    ]);

    let plan = detect(dir.path()).unwrap();
    assert_eq!(plan.framework.as_deref(), Some("nextjs"));
    assert_eq!(plan.metadata_str("output_type"), Some(output_type));
    assert!(plan.detected_files.contains(&config_file.to_string()));
}

#[test]
fn test_astro_server_mode_from_config() {
    let dir = project(&[
        ("package.json", r#"{"dependencies": {"astro": "^4.5.0", "@astrojs/node": "^8.0.0"}}"#),
        (
            "astro.config.mjs",
            "import { defineConfig } from 'astro/config';\nimport node from '@astrojs/node';\n\nexport default defineConfig({\n  output: 'server',\n  adapter: node({ mode: 'standalone' }),\n});\n",
        ),
        ("package-lock.json", "{}"),
    ]);

    let plan = detect(dir.path()).unwrap();
    assert_eq!(plan.framework.as_deref(), Some("astro"));
    assert_eq!(plan.framework_version.as_deref(), Some("4.5.0"));
    assert_eq!(plan.metadata_str("output_type"), Some("server"));
    assert_eq!(plan.build_command.as_deref(), Some("npm run build"));
    assert_eq!(plan.start_command.as_deref(), Some("node ./dist/server/entry.mjs"));
    assert_eq!(
        plan.detected_files,
        vec!["package.json", "package-lock.json", "astro.config.mjs"]
    );
}

#[test]
fn test_yarn_workspaces_monorepo() {
    let dir = project(&[
        (
            "package.json",
            r#"{"name": "acme", "private": true, "workspaces": {"packages": ["apps/*", "packages/*"]}}"#,
        ),
        ("yarn.lock", ""),
        (".yarnrc.yml", "nodeLinker: node-modules\n"),
        ("apps/web/package.json", r#"{"name": "web"}"#),
        ("packages/ui/package.json", r#"{"name": "ui"}"#),
        ("node_modules/left-pad/package.json", "{}"),
        (".tool-versions", "nodejs 20.11.0\n"),
    ]);

    let plan = detect(dir.path()).unwrap();
    assert_eq!(plan.package_manager.as_deref(), Some("yarnberry"));
    assert_eq!(plan.install_command.as_deref(), Some("yarn install --immutable"));
    assert_eq!(plan.language_version, "20.11.0");
    assert!(plan.metadata_flag("is_monorepo"));
    assert_eq!(plan.metadata["workspaces"], json!(["apps/*", "packages/*"]));
    assert_eq!(
        plan.metadata["workspace_packages"],
        json!(["apps/web", "packages/ui"])
    );
    assert_eq!(
        plan.detected_files,
        vec!["package.json", "yarn.lock", ".tool-versions", ".yarnrc.yml"]
    );
}

#[test]
fn test_native_dependencies_and_entry_point() {
    let dir = project(&[
        (
            "package.json",
            r#"{"dependencies": {"sharp": "^0.33.0", "puppeteer": "^22.0.0", "bcrypt": "^5.1.0"}}"#,
        ),
        ("server.js", "require('http').createServer().listen(3000);\n"),
        (".node-version", "lts/hydrogen\n"),
    ]);

    let plan = detect(dir.path()).unwrap();
    assert_eq!(plan.language_version, "24");
    assert_eq!(plan.start_command.as_deref(), Some("node server.js"));
    assert_eq!(
        plan.detected_files,
        vec!["package.json", ".node-version", "server.js"]
    );
    assert_eq!(
        plan.metadata["native_packages"],
        json!(["sharp", "puppeteer", "bcrypt"])
    );

    let apt = plan.metadata["apt_packages"].as_array().unwrap();
    assert_eq!(apt[0], "libvips-dev");
    assert_eq!(apt[1], "chromium");
    assert_eq!(apt.last().unwrap(), "python3");
}

#[test]
fn test_env_overrides_are_applied() {
    let dir = project(&[(
        "package.json",
        r#"{"scripts": {"build": "tsc", "start": "node dist/main.js"}}"#,
    )]);
    let evidence = EvidenceView::new(dir.path()).with_env(EnvOverrides::from_pairs([
        ("PACKPLAN_BUILD_CMD", "npm run compile"),
        ("NODE_VERSION", "v18.19.1"),
    ]));

    let plan = Detector::with_defaults()
        .detect_evidence(&evidence)
        .unwrap()
        .unwrap();
    assert_eq!(plan.build_command.as_deref(), Some("npm run compile"));
    assert_eq!(plan.start_command.as_deref(), Some("npm run start"));
    assert_eq!(plan.language_version, "18.19.1");
}

#[test]
fn test_plan_survives_json_round_trip() {
    let dir = project(&[
        (
            "package.json",
            r#"{"name": "svc", "type": "module", "dependencies": {"@nestjs/core": "^10.3.0", "@prisma/client": "^5.0.0"}}"#,
        ),
        ("pnpm-lock.yaml", "lockfileVersion: '6.0'\n"),
        ("tsconfig.json", "{}"),
    ]);

    let plan = detect(dir.path()).unwrap();
    let parsed = Plan::from_json(&plan.to_json().unwrap()).unwrap();
    assert_eq!(parsed, plan);
    assert_eq!(parsed.framework.as_deref(), Some("nestjs"));
    assert_eq!(parsed.start_command.as_deref(), Some("pnpm start"));
}

struct EnvGuard {
    key: &'static str,
    old_value: Option<String>,
}

impl EnvGuard {
    fn set(key: &'static str, value: &str) -> Self {
        let old_value = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self { key, old_value }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.old_value {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
#[serial]
fn test_detect_reads_process_overrides() {
    let dir = project(&[("package.json", r#"{"scripts": {"start": "node index.js"}}"#)]);
    let _start = EnvGuard::set("PACKPLAN_START_CMD", "node --enable-source-maps index.js");
    let _image = EnvGuard::set("PACKPLAN_BASE_IMAGE", "node:22-slim");

    let plan = Detector::with_defaults().detect(dir.path()).unwrap().unwrap();
    assert_eq!(
        plan.start_command.as_deref(),
        Some("node --enable-source-maps index.js")
    );
    assert_eq!(plan.metadata_str("base_image"), Some("node:22-slim"));
}
