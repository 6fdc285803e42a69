//! Centralized error types for zero-downtime-push
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{DeployStep, VenerableAction};

/// Argument resolution errors
///
/// Every variant is terminal: resolution never retries and never hands back a
/// partially resolved configuration.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no valid argument found, use --help / -h for more information")]
    NoArgument,

    #[error("a application manifest is required to push an application")]
    NoManifest,

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("wildcard expressions within the path directive in the application manifest are not supported - delete this path directive and pass the artifact path by using the -p option")]
    NoWildcardSupport,

    #[error("--docker-username have to be used in combination with env CF_DOCKER_PASSWORD and --docker-image")]
    WrongPrivateDockerRepoCombination,

    #[error("--legacy-push and health check options couldn't be combined")]
    WrongCombination,

    #[error("environment variables passed in wrong format, pass the variables like key=value")]
    WrongEnvFormat,

    /// Rendered by clap; kept verbatim
    #[error("{0}")]
    FlagParse(#[from] clap::Error),
}

/// Application manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("could not read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("manifest {path} does not contain any application")]
    NoApplications { path: PathBuf },

    #[error("application #{index} in manifest {path} has no name")]
    MissingName { path: PathBuf, index: usize },

    #[error("could not load vars file {path}: {message}")]
    VarsFile { path: PathBuf, message: String },

    #[error("expected to find variables: {}", .names.join(", "))]
    UnresolvedVariables { names: Vec<String> },

    #[error("could not write no-route manifest: {0}")]
    WriteNoRoute(String),

    #[error("invalid variable placeholder pattern: {0}")]
    Pattern(String),
}

/// cf command execution errors
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("{tool} executable not found. Install it or set {env_var}")]
    ToolNotFound { tool: String, env_var: String },

    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("cf exited with {}", exit_description(.code))]
    ExitStatus { code: Option<i32> },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

/// Fatal orchestration errors
///
/// Each variant carries the exact argument list handed to cf so the failing
/// invocation can be reproduced by hand.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("could not create app: {source}")]
    CreateFailed { args: Vec<String>, source: ExecError },

    #[error("could not push application with passed args: [{}]: {source}", .args.join(" "))]
    PushFailed { args: Vec<String>, source: ExecError },

    #[error("{} failed with passed args: [{}]: {source}", .step.name(), .args.join(" "))]
    StepFailed {
        step: DeployStep,
        args: Vec<String>,
        source: ExecError,
    },

    #[error("{app} already exists from an earlier push; delete it or pass --venerable-action delete")]
    VenerableExists { app: String },
}

impl DeployError {
    /// Argument list of the invocation that failed; empty when cf was not called
    pub fn args(&self) -> &[String] {
        match self {
            Self::CreateFailed { args, .. }
            | Self::PushFailed { args, .. }
            | Self::StepFailed { args, .. } => args,
            Self::VenerableExists { .. } => &[],
        }
    }
}

/// Non-fatal orchestration failures, collected into the deploy report
#[derive(Error, Debug)]
pub enum StepWarning {
    #[error("could not set environment variable with key: {key} to application: {app}: {source}")]
    EnvSetFailed {
        app: String,
        key: String,
        source: ExecError,
    },

    #[error("could not {action} venerable application {app}: {source}")]
    VenerableActionFailed {
        app: String,
        action: VenerableAction,
        source: ExecError,
    },

    #[error("could not fetch recent logs of {app}: {source}")]
    CrashLogsUnavailable { app: String, source: ExecError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docker_combination_mentions_password_env() {
        let err = ResolveError::WrongPrivateDockerRepoCombination;
        assert!(err.to_string().contains("CF_DOCKER_PASSWORD"));
    }

    #[test]
    fn test_manifest_error_conversion() {
        let manifest_err = ManifestError::NoApplications {
            path: PathBuf::from("manifest.yml"),
        };
        let resolve_err: ResolveError = manifest_err.into();
        assert!(matches!(resolve_err, ResolveError::Manifest(_)));
        assert_eq!(
            resolve_err.to_string(),
            "manifest manifest.yml does not contain any application"
        );
    }

    #[test]
    fn test_push_failed_lists_args() {
        let err = DeployError::PushFailed {
            args: vec!["v3-push".into(), "myApp".into(), "--no-start".into()],
            source: ExecError::ExitStatus { code: Some(1) },
        };
        assert_eq!(
            err.to_string(),
            "could not push application with passed args: [v3-push myApp --no-start]: cf exited with code 1"
        );
        assert_eq!(err.args().len(), 3);
    }

    #[test]
    fn test_venerable_exists_names_the_app() {
        let err = DeployError::VenerableExists {
            app: "myApp-venerable".into(),
        };
        assert!(err.to_string().starts_with("myApp-venerable already exists"));
        assert!(err.args().is_empty());
    }

    #[test]
    fn test_create_failed_context() {
        let err = DeployError::CreateFailed {
            args: vec!["v3-create-app".into(), "myApp".into()],
            source: ExecError::ExitStatus { code: None },
        };
        assert!(err.to_string().starts_with("could not create app"));
        assert!(err.to_string().ends_with("a signal"));
    }

    #[test]
    fn test_unresolved_variables_display() {
        let err = ManifestError::UnresolvedVariables {
            names: vec!["instances".into(), "domain".into()],
        };
        assert_eq!(
            err.to_string(),
            "expected to find variables: instances, domain"
        );
    }
}
