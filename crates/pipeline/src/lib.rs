//! Orchestration: an ordered provider registry that turns a project directory
//! into at most one plan.

pub mod detector;
pub mod error;

pub use detector::Detector;
pub use error::DetectError;
