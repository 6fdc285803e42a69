//! Deployment step domain types
//!
//! Names the individual cf operations of a push and records what happened.

use crate::error::StepWarning;

/// Individual steps in a zero-downtime push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStep {
    /// Look for a running previous version
    DetectVenerable,
    /// Move the previous version aside
    Rename,
    /// Create the application record
    Create,
    /// Upload bits without starting
    Push,
    /// Set dynamic environment variables
    SetEnv,
    /// Apply the manifest (routes, services, scaling)
    ApplyManifest,
    /// Configure the health check
    HealthCheck,
    /// Start the new version
    Start,
    /// Fetch recent logs after a failed start
    CrashLogs,
    /// Stop or delete the previous version
    RetireVenerable,
}

impl DeployStep {
    /// Get human-readable name for the step
    pub fn name(&self) -> &'static str {
        match self {
            Self::DetectVenerable => "Detect venerable",
            Self::Rename => "Rename",
            Self::Create => "Create",
            Self::Push => "Push",
            Self::SetEnv => "Set env",
            Self::ApplyManifest => "Apply manifest",
            Self::HealthCheck => "Health check",
            Self::Start => "Start",
            Self::CrashLogs => "Crash logs",
            Self::RetireVenerable => "Retire venerable",
        }
    }

    /// Get emoji for the step
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::DetectVenerable => "🔍",
            Self::Rename => "🏷️",
            Self::Create => "🆕",
            Self::Push => "📤",
            Self::SetEnv => "🔧",
            Self::ApplyManifest => "🛣️",
            Self::HealthCheck => "🩺",
            Self::Start => "🚀",
            Self::CrashLogs => "📜",
            Self::RetireVenerable => "🧹",
        }
    }
}

/// Outcome of a push that did not fail fatally
#[derive(Debug, Default)]
pub struct DeployReport {
    /// Steps that ran, in order
    pub completed: Vec<DeployStep>,
    /// Best-effort failures that did not abort the push
    pub warnings: Vec<StepWarning>,
    /// Name the previous version was running under, if one existed
    pub venerable: Option<String>,
}

impl DeployReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub(crate) fn record(&mut self, step: DeployStep) {
        if self.completed.last() != Some(&step) {
            self.completed.push(step);
        }
    }
}
