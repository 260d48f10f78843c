//! tbgwd - Tenant Gateway Daemon
//!
//! Loads the tenant configuration, starts every tenant through the
//! supervisor, and tears them down again on Ctrl-C.
//!
//! Usage:
//!   tbgwd [OPTIONS] [gateway.toml|gateway.yaml|gateway.json]
//!
//! If no config file is provided, a built-in demo configuration is used.

mod demo;

use std::sync::Arc;

use tbgw_core::{GatewayConfig, TenantConfig};
use tbgw_supervisor::{ExtensionFactory, TenantManager};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parsed command-line arguments
struct Args {
    /// Gateway config file
    config_path: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args { config_path: None };

    for arg in &args {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = Some(arg.to_string());
            }
            _ => {
                tracing::warn!("Unknown argument: {}", arg);
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"tbgwd - Tenant Gateway Daemon

Usage: tbgwd [OPTIONS] [config]

Arguments:
  [config]    Gateway configuration (.toml, .yaml/.yml or .json)

Options:
  -h, --help  Print this help message

Examples:
  # Run the built-in demo tenants
  tbgwd

  # Run with a config file
  tbgwd gateway.toml

  # More detail from the supervisor
  RUST_LOG=tbgw_supervisor=debug tbgwd gateway.yaml
"#
    );
}

fn load_tenants(args: &Args) -> anyhow::Result<Vec<TenantConfig>> {
    let Some(path) = &args.config_path else {
        tracing::info!("No config file provided, using demo tenants");
        return Ok(demo::demo_tenants());
    };

    tracing::info!("Loading config from: {}", path);
    let config = GatewayConfig::load(path)?;

    for issue in config.validate() {
        tracing::warn!(%issue, "Configuration problem, affected tenant will not start");
    }

    Ok(config.tenants)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tbgwd=info,tbgw_supervisor=info,tbgw_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting tbgwd (Tenant Gateway Daemon)");

    let args = parse_args();
    let tenants = load_tenants(&args)?;

    let mut manager = TenantManager::new(
        Arc::new(demo::LoggingGateways),
        ExtensionFactory::new(Arc::new(demo::LoggingExtensions)),
    );
    manager.init(&tenants).await;

    if manager.tenant_count() < tenants.len() {
        tracing::warn!(
            running = manager.tenant_count(),
            configured = tenants.len(),
            "Some tenants failed to start, see log above"
        );
    }

    tracing::info!("Running, press Ctrl-C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C, stopping now");
    }

    tracing::info!("Shutting down");
    let report = manager.stop().await;
    tracing::info!(failed_steps = report.failures().len(), "Shutdown complete");

    Ok(())
}
