//! CLI definitions for zero-downtime-push
//!
//! The option schema is declared once with clap. The positional app name is
//! handled by the argument resolver, so this module only sees the flag window.

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use crate::domain::{HealthCheckType, VenerableAction};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "zero-downtime-push",
    version,
    about = "Zero-downtime application push for Cloud Foundry",
    override_usage = "zero-downtime-push [APP_NAME] -f <MANIFEST> [OPTIONS]"
)]
pub struct PushFlags {
    /// Path to an application manifest
    #[arg(short = 'f', value_name = "MANIFEST", default_value = "")]
    pub manifest_path: String,

    /// Path to application files
    #[arg(short = 'p', value_name = "PATH", default_value = "")]
    pub app_path: String,

    /// Name of the stack to use
    #[arg(short = 's', value_name = "STACK", default_value = "")]
    pub stack_name: String,

    /// Type of health check to perform
    #[arg(long = "health-check-type", value_enum, default_value_t = HealthCheckType::Port)]
    pub health_check_type: HealthCheckType,

    /// Endpoint for the 'http' health check type
    #[arg(long = "health-check-http-endpoint", default_value = "")]
    pub health_check_http_endpoint: String,

    /// Push timeout in seconds (default 60 seconds)
    #[arg(short = 't', value_name = "SECONDS", default_value_t = 0, allow_negative_numbers = true)]
    pub timeout: i64,

    /// Health check invocation timeout in seconds
    #[arg(
        long = "invocation-timeout",
        value_name = "SECONDS",
        default_value_t = -1,
        allow_negative_numbers = true
    )]
    pub invocation_timeout: i64,

    /// Process type the health check applies to
    #[arg(long = "process", default_value = "")]
    pub process: String,

    /// Show recent logs when the application crashes during the deployment
    #[arg(long = "show-crash-log")]
    pub show_crash_logs: bool,

    /// What to do with the previous version: delete, stop or none
    #[arg(long = "venerable-action", value_enum, default_value_t = VenerableAction::Delete)]
    pub venerable_action: VenerableAction,

    /// Environment variable for the new app (can be specified multiple times)
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub envs: Vec<String>,

    /// Use the legacy push instead of the v3 API
    #[arg(long = "legacy-push")]
    pub legacy_push: bool,

    /// Deploy the new application without adding routes
    #[arg(long = "no-route")]
    pub no_route: bool,

    /// Only add the routes from the manifest to the application
    #[arg(long = "route-only")]
    pub add_routes_only: bool,

    /// Don't start the application after deployment; venerable action is none
    #[arg(long = "no-start")]
    pub no_start: bool,

    /// Path to a variable substitution file for the manifest
    #[arg(long = "vars-file", value_name = "PATH", default_value = "")]
    pub vars_file: String,

    /// Docker image url
    #[arg(long = "docker-image", default_value = "")]
    pub docker_image: String,

    /// Docker repository username; used with the password from CF_DOCKER_PASSWORD
    #[arg(long = "docker-username", default_value = "")]
    pub docker_username: String,
}

/// Which defaulted flags the caller actually typed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplicitFlags {
    pub health_check_type: bool,
    pub health_check_http_endpoint: bool,
    pub venerable_action: bool,
}

impl ExplicitFlags {
    fn from_matches(matches: &ArgMatches) -> Self {
        let passed = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);
        Self {
            health_check_type: passed("health_check_type"),
            health_check_http_endpoint: passed("health_check_http_endpoint"),
            venerable_action: passed("venerable_action"),
        }
    }
}

/// Flag values plus their explicitness
#[derive(Debug, Clone)]
pub struct ParsedFlags {
    pub flags: PushFlags,
    pub explicit: ExplicitFlags,
}

/// Parse a flag window (everything after the optional app name)
///
/// `program` stands in for the binary name so clap renders usage correctly.
pub fn parse_flags(program: &str, window: &[String]) -> Result<ParsedFlags, clap::Error> {
    let matches = PushFlags::command()
        .try_get_matches_from(std::iter::once(program).chain(window.iter().map(String::as_str)))?;
    let flags = PushFlags::from_arg_matches(&matches)?;
    let explicit = ExplicitFlags::from_matches(&matches);
    Ok(ParsedFlags { flags, explicit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_schema_is_consistent() {
        PushFlags::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let parsed = parse_flags("cf", &tokens(&["-f", "manifest.yml"])).unwrap();
        assert_eq!(parsed.flags.manifest_path, "manifest.yml");
        assert_eq!(parsed.flags.timeout, 0);
        assert_eq!(parsed.flags.invocation_timeout, -1);
        assert_eq!(parsed.flags.health_check_type, HealthCheckType::Port);
        assert_eq!(parsed.flags.venerable_action, VenerableAction::Delete);
        assert!(parsed.flags.envs.is_empty());
        assert_eq!(parsed.explicit, ExplicitFlags::default());
    }

    #[test]
    fn test_all_flags() {
        let parsed = parse_flags(
            "cf",
            &tokens(&[
                "-f",
                "manifest.yml",
                "-p",
                "app.jar",
                "-s",
                "cflinuxfs4",
                "-t",
                "120",
                "--invocation-timeout",
                "5",
                "--health-check-type",
                "http",
                "--health-check-http-endpoint",
                "/health",
                "--process",
                "web",
                "--show-crash-log",
                "--venerable-action",
                "stop",
                "--env",
                "FOO=bar",
                "--env=BAZ=qux",
                "--no-route",
                "--no-start",
                "--route-only",
                "--vars-file",
                "vars.yml",
                "--docker-image",
                "registry/app:1",
                "--docker-username",
                "bot",
            ]),
        )
        .unwrap();
        let flags = &parsed.flags;
        assert_eq!(flags.app_path, "app.jar");
        assert_eq!(flags.stack_name, "cflinuxfs4");
        assert_eq!(flags.timeout, 120);
        assert_eq!(flags.invocation_timeout, 5);
        assert_eq!(flags.health_check_type, HealthCheckType::Http);
        assert_eq!(flags.health_check_http_endpoint, "/health");
        assert_eq!(flags.process, "web");
        assert!(flags.show_crash_logs);
        assert_eq!(flags.venerable_action, VenerableAction::Stop);
        assert_eq!(flags.envs, vec!["FOO=bar", "BAZ=qux"]);
        assert!(flags.no_route && flags.no_start && flags.add_routes_only);
        assert!(!flags.legacy_push);
        assert_eq!(flags.vars_file, "vars.yml");
        assert_eq!(flags.docker_image, "registry/app:1");
        assert_eq!(flags.docker_username, "bot");
        assert!(parsed.explicit.health_check_type);
        assert!(parsed.explicit.health_check_http_endpoint);
        assert!(parsed.explicit.venerable_action);
    }

    #[test]
    fn test_explicit_default_value_counts_as_passed() {
        let parsed = parse_flags(
            "cf",
            &tokens(&["-f", "m.yml", "--venerable-action", "delete"]),
        )
        .unwrap();
        assert!(parsed.explicit.venerable_action);
        assert!(!parsed.explicit.health_check_type);
    }

    #[test]
    fn test_unknown_flag() {
        let err = parse_flags("cf", &tokens(&["-f", "m.yml", "--bogus"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_invalid_venerable_action() {
        let err = parse_flags("cf", &tokens(&["--venerable-action", "archive"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_non_numeric_timeout() {
        let err = parse_flags("cf", &tokens(&["-t", "soon"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}
