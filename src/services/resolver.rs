//! Argument resolver - turns raw CLI tokens into a resolved configuration
//!
//! Merges command-line flags with the first application of the manifest.
//! Precedence: explicit flag, then manifest value, then built-in default.

use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::debug;

use crate::cli::{self, ParsedFlags};
use crate::domain::{
    EnvVars, HealthCheckType, ResolvedConfiguration, VenerableAction, DEFAULT_TIMEOUT_SECS,
};
use crate::error::ResolveError;
use crate::infrastructure::ManifestProvider;

/// Tokens that look like a flag rather than an app name
static FLAG_LIKE: OnceLock<Option<Regex>> = OnceLock::new();

/// Resolves raw arguments against a manifest provider
pub struct ArgumentResolver<'a, M> {
    manifests: &'a M,
    docker_password: Option<String>,
}

impl<'a, M: ManifestProvider> ArgumentResolver<'a, M> {
    /// Create a resolver; the docker password comes from the process environment
    pub fn new(manifests: &'a M, docker_password: Option<String>) -> Self {
        Self {
            manifests,
            docker_password,
        }
    }

    /// Resolve `raw_args` (program name first) into a configuration
    pub fn resolve(&self, raw_args: &[String]) -> Result<ResolvedConfiguration, ResolveError> {
        if raw_args.len() < 2 {
            return Err(ResolveError::NoArgument);
        }

        // Without a positional app name the flags start right after the program
        let app_name_from_manifest = looks_like_flag(&raw_args[1]);
        let flag_start = if app_name_from_manifest { 1 } else { 2 };

        let ParsedFlags { flags, explicit } =
            cli::parse_flags(&raw_args[0], &raw_args[flag_start..])?;

        if flags.manifest_path.is_empty() {
            return Err(ResolveError::NoManifest);
        }

        let manifest_path = PathBuf::from(&flags.manifest_path);
        let vars_file = non_empty(&flags.vars_file).map(PathBuf::from);
        let parsed = self
            .manifests
            .parse(&manifest_path, vars_file.as_deref())?;

        let app = parsed
            .document
            .first()
            .cloned()
            .unwrap_or_default();

        if app.has_wildcard_path() && !flags.legacy_push {
            return Err(ResolveError::NoWildcardSupport);
        }

        let docker_username = non_empty(&flags.docker_username);
        let docker_image = non_empty(&flags.docker_image);
        if docker_username.is_some() && (self.docker_password.is_none() || docker_image.is_none()) {
            return Err(ResolveError::WrongPrivateDockerRepoCombination);
        }

        let timeout_secs = resolve_timeout(flags.timeout, app.timeout_secs());

        let app_name = if app_name_from_manifest {
            app.name.clone()
        } else {
            raw_args[1].clone()
        };
        if app_name.is_empty() {
            return Err(ResolveError::NoArgument);
        }

        if flags.legacy_push
            && (explicit.health_check_type
                || (explicit.health_check_http_endpoint
                    && !flags.health_check_http_endpoint.is_empty()))
        {
            return Err(ResolveError::WrongCombination);
        }

        let health_check_type = if explicit.health_check_type {
            flags.health_check_type
        } else {
            app.health_check_type.unwrap_or(HealthCheckType::Port)
        };
        let health_check_http_endpoint = non_empty(&flags.health_check_http_endpoint)
            .or_else(|| app.health_check_http_endpoint.clone().filter(|e| !e.is_empty()));

        let env_vars = EnvVars::from_pairs(&flags.envs).ok_or(ResolveError::WrongEnvFormat)?;

        let venerable_action = if (flags.no_route || flags.no_start) && !explicit.venerable_action {
            VenerableAction::None
        } else {
            flags.venerable_action
        };

        // Legacy push hands --no-route to cf push directly
        let no_route_manifest = if flags.no_route && !flags.legacy_push {
            Some(self.manifests.write_no_route(&parsed)?)
        } else {
            None
        };

        debug!(
            "Resolved {} (timeout {}s, health check {}, venerable action {})",
            app_name, timeout_secs, health_check_type, venerable_action
        );

        Ok(ResolvedConfiguration {
            app_name,
            manifest_path,
            no_route_manifest,
            vars_file,
            app_path: non_empty(&flags.app_path),
            stack_name: non_empty(&flags.stack_name),
            health_check_type,
            health_check_http_endpoint,
            timeout_secs,
            invocation_timeout: u32::try_from(flags.invocation_timeout).ok(),
            process: non_empty(&flags.process),
            env_vars,
            venerable_action,
            show_crash_logs: flags.show_crash_logs,
            legacy_push: flags.legacy_push,
            no_route: flags.no_route,
            add_routes_only: flags.add_routes_only,
            no_start: flags.no_start,
            docker_image,
            docker_username,
            manifest: parsed.document,
        })
    }
}

fn looks_like_flag(token: &str) -> bool {
    FLAG_LIKE
        .get_or_init(|| Regex::new("^-[a-z]{0,3}").ok())
        .as_ref()
        .map_or_else(|| token.starts_with('-'), |re| re.is_match(token))
}

/// Explicit CLI timeout wins; otherwise the manifest's; otherwise the default
fn resolve_timeout(cli_secs: i64, manifest_secs: i64) -> u32 {
    let positive = |secs: i64| u32::try_from(secs).ok().filter(|s| *s > 0);
    positive(cli_secs)
        .or_else(|| positive(manifest_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
