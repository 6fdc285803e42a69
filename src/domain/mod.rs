//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod deployment;
pub mod manifest;
pub mod step;

// Re-export commonly used types
pub use deployment::{
    EnvVars, HealthCheckType, ResolvedConfiguration, VenerableAction, DEFAULT_TIMEOUT_SECS,
};
pub use manifest::{ApplicationDescriptor, ManifestDocument, NoRouteManifest};
pub use step::{DeployReport, DeployStep};
