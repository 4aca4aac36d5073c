use packplan_cli::cli::commands::{CliArgs, Commands, DetectArgs, LogFormat};
use packplan_cli::cli::output::{OutputFormat, OutputFormatter};
use packplan_cli::update::{self, TAGS_URL};
use packplan_cli::{NAME, VERSION};
use packplan_core::PackplanConfig;
use packplan_pipeline::{DetectError, Detector};

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::env;
use std::fs;
use std::process;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let config = PackplanConfig::default();
    init_logging_from_args(&args, &config);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);
    debug!("{}", config);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your PACKPLAN_* environment variables.");
        process::exit(1);
    }

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args, &config, args.quiet).await,
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs, config: &PackplanConfig) {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let level = if let Some(level_str) = &args.log_level {
            parse_level(level_str)
        } else if args.verbose {
            Level::DEBUG
        } else if args.quiet {
            Level::ERROR
        } else {
            parse_level(&config.log_level)
        };

        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!(
                "packplan={},h2=warn,hyper=warn,reqwest=warn",
                level
            ))
        };

        let registry = tracing_subscriber::registry().with(filter);
        match args.log_format {
            LogFormat::Text => registry
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init(),
        }
    });
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

async fn handle_detect(args: &DetectArgs, config: &PackplanConfig, quiet: bool) -> i32 {
    let update_check = spawn_update_check(args, config);

    if let Err(e) = run_detect(args, quiet) {
        if let Some(update_check) = update_check {
            update_check.abort();
        }
        match e.downcast_ref::<DetectError>() {
            Some(detect_error) => {
                error!("Detection failed: {}", detect_error);
                eprintln!("\n{}", detect_error.help_message());
            }
            None => {
                error!("{:#}", e);
                eprintln!("Error: {:#}", e);
            }
        }
        return 1;
    }

    if let Some(update_check) = update_check {
        if let Ok(Some(latest)) = update_check.await {
            eprintln!("\n{}", update::notice(&latest, VERSION));
        }
    }

    0
}

fn run_detect(args: &DetectArgs, quiet: bool) -> Result<()> {
    let path = match &args.path {
        Some(path) => path.clone(),
        None => env::current_dir().context("Failed to get current directory")?,
    };
    info!(path = %path.display(), "Detecting build plan");

    let detector = Detector::with_defaults();
    let Some(plan) = detector.detect(&path)? else {
        bail!(
            "No supported project found in {} (providers: {})",
            path.display(),
            detector.provider_names().join(", ")
        );
    };

    let format: OutputFormat = args.format.into();
    let output = OutputFormatter::new(format).format(&plan)?;

    match &args.output {
        Some(output_file) => {
            fs::write(output_file, &output).with_context(|| {
                format!("Failed to write output to {}", output_file.display())
            })?;
            info!("Output written to: {}", output_file.display());
            if !quiet {
                println!("Output written to: {}", output_file.display());
            }
        }
        None => println!("{}", output.trim_end()),
    }

    Ok(())
}

/// Starts the release check alongside detection when enabled and a person is
/// watching stderr.
fn spawn_update_check(
    args: &DetectArgs,
    config: &PackplanConfig,
) -> Option<JoinHandle<Option<String>>> {
    if args.no_update_check || !config.update_check || !atty::is(atty::Stream::Stderr) {
        debug!("Update check disabled");
        return None;
    }

    let timeout = Duration::from_secs(config.update_check_timeout_secs);
    Some(tokio::spawn(async move {
        update::check_for_update(TAGS_URL, VERSION, timeout).await
    }))
}
