//! Push service - orchestrates a zero-downtime push
//!
//! Drives cf through the deployment sequence. Structural steps (rename,
//! create, push, manifest, health check, start) stop the push on failure.
//! Environment variables and retiring the previous version are best effort:
//! their failures are logged and collected in the report.

use colored::Colorize;
use std::path::Path;
use tracing::{info, warn};

use crate::domain::{
    DeployReport, DeployStep, HealthCheckType, NoRouteManifest, ResolvedConfiguration,
    VenerableAction,
};
use crate::error::{DeployError, ExecError, StepWarning};
use crate::infrastructure::CommandExecutor;

/// Service for orchestrating pushes
pub struct PushService<'a, E> {
    executor: &'a E,
}

impl<'a, E: CommandExecutor> PushService<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    /// Execute the push described by `config`
    pub async fn deploy(
        &self,
        config: &ResolvedConfiguration,
    ) -> Result<DeployReport, DeployError> {
        let mut report = DeployReport::default();

        if config.add_routes_only {
            info!("Adding routes to {} only", config.app_name);
            self.apply_manifest(config, &config.manifest_path, &mut report)
                .await?;
            return Ok(report);
        }

        let venerable = self.move_venerable_aside(config, &mut report).await?;

        if config.legacy_push {
            self.legacy_push(config, &mut report).await?;
            self.set_env_vars(config, "set-env", &mut report).await;
            self.start(config, "start", &mut report).await?;
        } else {
            self.create_app(config, &mut report).await?;
            self.push_app(config, &mut report).await?;
            self.set_env_vars(config, "v3-set-env", &mut report).await;
            let manifest = config
                .no_route_manifest
                .as_ref()
                .map_or(config.manifest_path.as_path(), NoRouteManifest::path);
            self.apply_manifest(config, manifest, &mut report).await?;
            self.set_health_check(config, &mut report).await?;
            self.start(config, "v3-start", &mut report).await?;
        }

        if let Some(venerable) = venerable {
            self.retire_venerable(&venerable, config.venerable_action, &mut report)
                .await;
            report.venerable = Some(venerable);
        }

        Ok(report)
    }

    async fn run(&self, step: DeployStep, args: &[String]) -> Result<(), ExecError> {
        info!("{} {}: cf {}", step.emoji(), step.name(), args.join(" "));
        self.executor.execute(args).await
    }

    /// `cf app` exiting non-zero means the app does not exist
    async fn app_exists(&self, app_name: &str) -> Result<bool, DeployError> {
        let args = command(["app", app_name]);
        let probed = self.run(DeployStep::DetectVenerable, &args).await;
        match probed {
            Ok(()) => Ok(true),
            Err(ExecError::ExitStatus { .. }) => Ok(false),
            Err(source) => Err(DeployError::StepFailed {
                step: DeployStep::DetectVenerable,
                args,
                source,
            }),
        }
    }

    /// Rename a running previous version; returns its new name
    async fn move_venerable_aside(
        &self,
        config: &ResolvedConfiguration,
        report: &mut DeployReport,
    ) -> Result<Option<String>, DeployError> {
        if !self.app_exists(&config.app_name).await? {
            info!("No running version of {} found", config.app_name);
            return Ok(None);
        }
        report.record(DeployStep::DetectVenerable);

        let venerable = config.venerable_app_name();
        if self.app_exists(&venerable).await? {
            self.clear_leftover_venerable(&venerable, config.venerable_action)
                .await?;
        }

        let args = command(["rename", config.app_name.as_str(), venerable.as_str()]);
        self.run(DeployStep::Rename, &args)
            .await
            .map_err(|source| DeployError::StepFailed {
                step: DeployStep::Rename,
                args: args.clone(),
                source,
            })?;
        report.record(DeployStep::Rename);
        Ok(Some(venerable))
    }

    /// A venerable kept by an earlier push blocks the rename
    async fn clear_leftover_venerable(
        &self,
        venerable: &str,
        action: VenerableAction,
    ) -> Result<(), DeployError> {
        if action != VenerableAction::Delete {
            return Err(DeployError::VenerableExists {
                app: venerable.to_string(),
            });
        }

        info!("Deleting {} left over from an earlier push", venerable);
        let args = command(["delete", venerable, "-f"]);
        self.run(DeployStep::RetireVenerable, &args)
            .await
            .map_err(|source| DeployError::StepFailed {
                step: DeployStep::RetireVenerable,
                args: args.clone(),
                source,
            })
    }

    async fn create_app(
        &self,
        config: &ResolvedConfiguration,
        report: &mut DeployReport,
    ) -> Result<(), DeployError> {
        let mut args = command(["v3-create-app", config.app_name.as_str()]);
        if config.docker_image.is_some() {
            args.extend(command(["--app-type", "docker"]));
        }

        self.run(DeployStep::Create, &args)
            .await
            .map_err(|source| DeployError::CreateFailed {
                args: args.clone(),
                source,
            })?;
        report.record(DeployStep::Create);
        Ok(())
    }

    async fn push_app(
        &self,
        config: &ResolvedConfiguration,
        report: &mut DeployReport,
    ) -> Result<(), DeployError> {
        // Always push stopped; start is a separate step after configuration
        let mut args = command(["v3-push", config.app_name.as_str(), "--no-start"]);
        if let Some(path) = &config.app_path {
            args.extend(command(["-p", path.as_str()]));
        }
        if config.no_route {
            args.push("--no-route".to_string());
        }
        push_docker_args(config, &mut args);

        self.run(DeployStep::Push, &args)
            .await
            .map_err(|source| DeployError::PushFailed {
                args: args.clone(),
                source,
            })?;
        report.record(DeployStep::Push);
        Ok(())
    }

    async fn legacy_push(
        &self,
        config: &ResolvedConfiguration,
        report: &mut DeployReport,
    ) -> Result<(), DeployError> {
        let mut args = vec![
            "push".to_string(),
            config.app_name.clone(),
            "-f".to_string(),
            config.manifest_path.display().to_string(),
            "--no-start".to_string(),
        ];
        if let Some(path) = &config.app_path {
            args.extend(command(["-p", path.as_str()]));
        }
        if let Some(stack) = &config.stack_name {
            args.extend(command(["-s", stack.as_str()]));
        }
        args.extend(["-t".to_string(), config.timeout_secs.to_string()]);
        if config.no_route {
            args.push("--no-route".to_string());
        }
        if let Some(vars_file) = &config.vars_file {
            args.extend(["--vars-file".to_string(), vars_file.display().to_string()]);
        }
        push_docker_args(config, &mut args);

        self.run(DeployStep::Push, &args)
            .await
            .map_err(|source| DeployError::PushFailed {
                args: args.clone(),
                source,
            })?;
        report.record(DeployStep::Push);
        Ok(())
    }

    /// Set every variable; a failed key is reported and the loop continues
    async fn set_env_vars(
        &self,
        config: &ResolvedConfiguration,
        subcommand: &str,
        report: &mut DeployReport,
    ) {
        for (key, value) in config.env_vars.iter() {
            info!("set environment-variable {}", key);
            let args = command([subcommand, config.app_name.as_str(), key, value]);
            // Never log values
            match self.executor.execute(&args).await {
                Ok(()) => report.record(DeployStep::SetEnv),
                Err(source) => {
                    let warning = StepWarning::EnvSetFailed {
                        app: config.app_name.clone(),
                        key: key.to_string(),
                        source,
                    };
                    warn!("{} {}", "⚠️".yellow(), warning);
                    report.warnings.push(warning);
                }
            }
        }
    }

    async fn apply_manifest(
        &self,
        config: &ResolvedConfiguration,
        manifest: &Path,
        report: &mut DeployReport,
    ) -> Result<(), DeployError> {
        let mut args = vec![
            "v3-apply-manifest".to_string(),
            "-f".to_string(),
            manifest.display().to_string(),
        ];
        // The no-route manifest is already rendered
        if manifest == config.manifest_path.as_path() {
            if let Some(vars_file) = &config.vars_file {
                args.extend(["--vars-file".to_string(), vars_file.display().to_string()]);
            }
        }

        self.run(DeployStep::ApplyManifest, &args)
            .await
            .map_err(|source| DeployError::StepFailed {
                step: DeployStep::ApplyManifest,
                args: args.clone(),
                source,
            })?;
        report.record(DeployStep::ApplyManifest);
        Ok(())
    }

    async fn set_health_check(
        &self,
        config: &ResolvedConfiguration,
        report: &mut DeployReport,
    ) -> Result<(), DeployError> {
        let mut args = command([
            "v3-set-health-check",
            config.app_name.as_str(),
            config.health_check_type.as_str(),
        ]);
        if config.health_check_type == HealthCheckType::Http {
            if let Some(endpoint) = &config.health_check_http_endpoint {
                args.extend(command(["--endpoint", endpoint.as_str()]));
            }
        }
        if let Some(invocation_timeout) = config.invocation_timeout {
            args.extend([
                "--invocation-timeout".to_string(),
                invocation_timeout.to_string(),
            ]);
        }
        if let Some(process) = &config.process {
            args.extend(command(["--process", process.as_str()]));
        }

        self.run(DeployStep::HealthCheck, &args)
            .await
            .map_err(|source| DeployError::StepFailed {
                step: DeployStep::HealthCheck,
                args: args.clone(),
                source,
            })?;
        report.record(DeployStep::HealthCheck);
        Ok(())
    }

    async fn start(
        &self,
        config: &ResolvedConfiguration,
        subcommand: &str,
        report: &mut DeployReport,
    ) -> Result<(), DeployError> {
        if config.no_start {
            info!("⏭️  Skipping start of {} (--no-start)", config.app_name);
            return Ok(());
        }

        let args = command([subcommand, config.app_name.as_str()]);
        let started = self.run(DeployStep::Start, &args).await;
        if let Err(source) = started {
            if config.show_crash_logs {
                self.show_crash_logs(&config.app_name, report).await;
            }
            return Err(DeployError::StepFailed {
                step: DeployStep::Start,
                args,
                source,
            });
        }
        report.record(DeployStep::Start);
        Ok(())
    }

    async fn show_crash_logs(&self, app_name: &str, report: &mut DeployReport) {
        let args = command(["logs", app_name, "--recent"]);
        match self.run(DeployStep::CrashLogs, &args).await {
            Ok(()) => report.record(DeployStep::CrashLogs),
            Err(source) => {
                let warning = StepWarning::CrashLogsUnavailable {
                    app: app_name.to_string(),
                    source,
                };
                warn!("{} {}", "⚠️".yellow(), warning);
                report.warnings.push(warning);
            }
        }
    }

    /// The new version is live at this point, so failures never fail the push
    async fn retire_venerable(
        &self,
        venerable: &str,
        action: VenerableAction,
        report: &mut DeployReport,
    ) {
        let args = match action {
            VenerableAction::Delete => command(["delete", venerable, "-f"]),
            VenerableAction::Stop => command(["stop", venerable]),
            VenerableAction::None => {
                info!("Leaving {} untouched (venerable action none)", venerable);
                return;
            }
        };

        match self.run(DeployStep::RetireVenerable, &args).await {
            Ok(()) => report.record(DeployStep::RetireVenerable),
            Err(source) => {
                let warning = StepWarning::VenerableActionFailed {
                    app: venerable.to_string(),
                    action,
                    source,
                };
                warn!("{} {}", "⚠️".yellow(), warning);
                report.warnings.push(warning);
            }
        }
    }
}

fn command<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn push_docker_args(config: &ResolvedConfiguration, args: &mut Vec<String>) {
    if let Some(image) = &config.docker_image {
        args.extend(command(["--docker-image", image.as_str()]));
        if let Some(username) = &config.docker_username {
            args.extend(command(["--docker-username", username.as_str()]));
        }
    }
}
