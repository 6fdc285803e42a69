//! Deployment domain types
//!
//! The resolved configuration of a single zero-downtime push and the value
//! types it is built from.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;

use super::manifest::{ManifestDocument, NoRouteManifest};

/// Push timeout used when neither the command line nor the manifest sets one
pub const DEFAULT_TIMEOUT_SECS: u32 = 60;

/// Suffix appended to the app name while the previous version is kept aside
pub const VENERABLE_SUFFIX: &str = "-venerable";

/// Mechanism the platform uses to decide an instance is healthy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthCheckType {
    #[default]
    Port,
    Http,
    Process,
    None,
}

impl HealthCheckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Port => "port",
            Self::Http => "http",
            Self::Process => "process",
            Self::None => "none",
        }
    }
}

impl fmt::Display for HealthCheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to the previously running version once the new one is live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VenerableAction {
    #[default]
    Delete,
    Stop,
    None,
}

impl VenerableAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Stop => "stop",
            Self::None => "none",
        }
    }
}

impl fmt::Display for VenerableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered environment variable mapping
///
/// Keys are unique. Re-inserting a key replaces its value but keeps the
/// position of the first occurrence, so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    entries: Vec<(String, String)>,
}

impl EnvVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the mapping from `key=value` tokens, splitting at the first `=`
    ///
    /// Returns `None` if any token lacks a separator; no partial mapping is
    /// produced in that case.
    pub fn from_pairs<I, S>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vars = Self::new();
        for token in tokens {
            let (key, value) = token.as_ref().split_once('=')?;
            vars.insert(key, value);
        }
        Some(vars)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fully resolved arguments of one zero-downtime push
///
/// Built once by the argument resolver and only read afterwards.
#[derive(Debug, Clone)]
pub struct ResolvedConfiguration {
    pub app_name: String,
    pub manifest_path: PathBuf,
    /// Manifest variant without routes; only written in no-route mode
    pub no_route_manifest: Option<NoRouteManifest>,
    pub vars_file: Option<PathBuf>,
    pub app_path: Option<String>,
    pub stack_name: Option<String>,
    pub health_check_type: HealthCheckType,
    pub health_check_http_endpoint: Option<String>,
    pub timeout_secs: u32,
    /// `None` when the command line left the sentinel in place
    pub invocation_timeout: Option<u32>,
    pub process: Option<String>,
    pub env_vars: EnvVars,
    pub venerable_action: VenerableAction,
    pub show_crash_logs: bool,
    pub legacy_push: bool,
    pub no_route: bool,
    pub add_routes_only: bool,
    pub no_start: bool,
    pub docker_image: Option<String>,
    pub docker_username: Option<String>,
    pub manifest: ManifestDocument,
}

impl ResolvedConfiguration {
    /// Name the running version is renamed to during cutover
    pub fn venerable_app_name(&self) -> String {
        format!("{}{}", self.app_name, VENERABLE_SUFFIX)
    }
}
