use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Zero-config build plan detection for container packaging
#[derive(Parser, Debug)]
#[command(
    name = "packplan",
    about = "Zero-config build plan detection for container packaging",
    version,
    author,
    long_about = "packplan inspects a project directory and emits a declarative build plan: \
                  runtime and version, package manager, framework, and the install, build \
                  and start commands a container image needs."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "text",
        help = "Log line format"
    )]
    pub log_format: LogFormat,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Detect the build plan of a project",
        long_about = "Inspects manifests, lock files, version files and framework configs to \
                      produce a build plan. Environment variables prefixed with PACKPLAN_ \
                      override the detected commands.\n\n\
                      Examples:\n  \
                      packplan detect\n  \
                      packplan detect /path/to/app\n  \
                      packplan detect --format yaml\n  \
                      packplan detect -o plan.json"
    )]
    Detect(DetectArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the project (defaults to current directory)"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "json",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Skip the check for a newer release")]
    pub no_update_check: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}
