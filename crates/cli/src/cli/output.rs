//! Plan rendering for the `detect` command.
//!
//! JSON and YAML are the machine-readable forms of [`Plan`]; the human form
//! is a short summary meant for a terminal.

use anyhow::Result;
use packplan_core::Plan;
use serde_json::Value;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, plan: &Plan) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_json(plan),
            OutputFormat::Yaml => self.format_yaml(plan),
            OutputFormat::Human => self.format_human(plan),
        }
    }

    fn format_json(&self, plan: &Plan) -> Result<String> {
        plan.to_json()
    }

    fn format_yaml(&self, plan: &Plan) -> Result<String> {
        plan.to_yaml()
    }

    fn format_human(&self, plan: &Plan) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "\u{2713} Build Plan")?;
        writeln!(output, "{}\n", "\u{2501}".repeat(42))?;

        writeln!(output, "Provider:  {}", plan.provider)?;
        writeln!(
            output,
            "Runtime:   {} {}",
            plan.language, plan.language_version
        )?;
        if let Some(pm) = &plan.package_manager {
            match &plan.package_manager_version {
                Some(version) => writeln!(output, "Packages:  {} {}", pm, version)?,
                None => writeln!(output, "Packages:  {}", pm)?,
            }
        }
        if let Some(framework) = &plan.framework {
            match &plan.framework_version {
                Some(version) => writeln!(output, "Framework: {} {}", framework, version)?,
                None => writeln!(output, "Framework: {}", framework)?,
            }
        }
        output.push('\n');

        writeln!(output, "Commands:")?;
        let commands = [
            ("Install", &plan.install_command),
            ("Build", &plan.build_command),
            ("Start", &plan.start_command),
        ];
        for (i, (label, command)) in commands.iter().enumerate() {
            let connector = if i == commands.len() - 1 {
                "\u{2514}"
            } else {
                "\u{251C}"
            };
            let command = command.as_deref().unwrap_or("(not specified)");
            writeln!(
                output,
                "{}\u{2500} {:<8} {}",
                connector,
                format!("{}:", label),
                command
            )?;
        }

        if !plan.metadata.is_empty() {
            writeln!(output, "\nMetadata:")?;
            for (key, value) in &plan.metadata {
                writeln!(output, "  {}: {}", key, display_value(value))?;
            }
        }

        if !plan.detected_files.is_empty() {
            writeln!(output, "\nFiles: {}", plan.detected_files.join(", "))?;
        }

        Ok(output)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
