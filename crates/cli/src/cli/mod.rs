pub mod commands;
pub mod output;

pub use commands::{CliArgs, Commands, DetectArgs, LogFormat};
pub use output::{OutputFormat, OutputFormatter};
