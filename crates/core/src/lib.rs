//! Shared foundations for packplan: filesystem access, the per-run evidence
//! view, environment overrides, and the plan schema every provider emits.

pub mod config;
pub mod error;
pub mod evidence;
pub mod fs;
pub mod output;

pub use config::{ConfigError, EnvOverrides, PackplanConfig, StaticServer};
pub use error::EvidenceError;
pub use evidence::EvidenceView;
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use output::schema::Plan;
