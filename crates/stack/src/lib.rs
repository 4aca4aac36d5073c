//! Ecosystem detection for packplan.
//!
//! Providers turn an [`EvidenceView`](packplan_core::EvidenceView) into a
//! [`Plan`](packplan_core::Plan). Priority-ordered decisions (package manager,
//! runtime version, framework) are static rule tables evaluated by
//! [`rules::first_match`]; JS/TS config files are inspected through the
//! tree-sitter backed [`syntax`] resolver.

#[macro_use]
pub mod id_enum_macro;

pub mod framework_id;
pub mod node;
pub mod provider;
pub mod rules;
pub mod syntax;

pub use framework_id::FrameworkId;
pub use node::{FrameworkInfo, NodeProvider, OutputType, PackageManager, PackageManagerInfo};
pub use provider::{Provider, ProviderError};
