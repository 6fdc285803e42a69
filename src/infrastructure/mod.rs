//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - The cf CLI (every control-plane operation)
//! - Application manifests on disk

pub mod cf;
pub mod manifest;

// Re-export commonly used types
pub use cf::{CfExecutor, CommandExecutor};
pub use manifest::{ManifestProvider, ParsedManifest, YamlManifestProvider};
