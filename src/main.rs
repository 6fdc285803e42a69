use anyhow::Result;

// Core modules
mod cli;
mod config;
mod tools;

// Architecture modules
mod domain;
mod error;
mod infrastructure;
mod services;
mod ui;

use config::Environment;
use error::ResolveError;
use infrastructure::{CfExecutor, YamlManifestProvider};
use services::{ArgumentResolver, PushService};

#[tokio::main]
async fn main() -> Result<()> {
    let environment = Environment::from_env();

    // LOGGING=debug,info,warn,error or just LOGGING=debug; CF_TRACE=true implies debug
    tracing_subscriber::fmt()
        .with_env_filter(environment.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false) // Disable ANSI escape codes for cleaner output
        .init();

    let raw_args: Vec<String> = std::env::args().collect();

    let manifests = YamlManifestProvider;
    let resolver = ArgumentResolver::new(&manifests, environment.docker_password.clone());
    let config = match resolver.resolve(&raw_args) {
        Ok(config) => config,
        // clap renders its own usage, help and version output
        Err(ResolveError::FlagParse(err)) => err.exit(),
        Err(err) => {
            ui::print_error("Invalid arguments");
            return Err(err.into());
        }
    };

    ui::print_header(&format!("Zero-downtime push: {}", config.app_name));
    let app_count = config.manifest.applications.len();
    if app_count > 1 {
        ui::print_warning(&format!(
            "Manifest lists {} applications; only {} is pushed",
            app_count, config.app_name
        ));
    }

    let executor = CfExecutor::new(environment.trace);
    let report = match PushService::new(&executor).deploy(&config).await {
        Ok(report) => report,
        Err(err) => {
            ui::print_error(&format!("Push of {} failed", config.app_name));
            return Err(err.into());
        }
    };

    ui::print_report(&config.app_name, &report);

    Ok(())
}
