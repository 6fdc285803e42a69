//! Process environment configuration
//!
//! Everything the push reads from the environment is read here, once, at the
//! process boundary. The rest of the crate receives plain values.

use std::env;

/// Docker registry password for private images (never accepted as a flag)
pub const DOCKER_PASSWORD_ENV: &str = "CF_DOCKER_PASSWORD";

/// Enables cf stdout forwarding and debug logging
pub const TRACE_ENV: &str = "CF_TRACE";

/// Log filter variables, checked in order
pub const LOG_FILTER_ENVS: [&str; 2] = ["LOGGING", "LOG_LEVEL"];

/// Values read from the process environment
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub docker_password: Option<String>,
    pub trace: bool,
    pub log_filter: Option<String>,
}

impl Environment {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let docker_password = lookup(DOCKER_PASSWORD_ENV).filter(|p| !p.is_empty());

        let trace = lookup(TRACE_ENV)
            .map(|v| {
                let val = v.to_lowercase();
                val == "true" || val == "1"
            })
            .unwrap_or(false);

        let log_filter = LOG_FILTER_ENVS
            .iter()
            .find_map(|&name| lookup(name))
            .filter(|f| !f.is_empty());

        Self {
            docker_password,
            trace,
            log_filter,
        }
    }

    /// tracing filter directive: explicit `LOGGING`/`LOG_LEVEL` wins
    pub fn log_level(&self) -> String {
        self.log_filter.clone().unwrap_or_else(|| {
            if self.trace {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        })
    }
}
