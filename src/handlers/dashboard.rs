//! Handler for the `dashboard` command.

use crate::config::types::Config;
use crate::error::{AppError, Result};
use crate::platform::api::{DynatraceClient, MonitoringApi};
use crate::workload::{Dashboard, EntityResolver, build_dashboard};
use colored::Colorize;
use log::error;

/// Handle the `dashboard` command.
pub fn handle_dashboard(
    config: &Config,
    cluster: &str,
    namespace: &str,
    include_heap: bool,
    dry_run: bool,
) -> Result<()> {
    let client = DynatraceClient::new(&config.dynatrace)?;

    eprintln!(
        "{} deployments for cluster '{}' in namespace '{}'...",
        "Fetching".cyan(),
        cluster,
        namespace
    );
    let Some(dashboard) = prepare_dashboard(&client, config, cluster, namespace, include_heap)
    else {
        println!(
            "No deployments found in cluster '{}' namespace '{}'",
            cluster, namespace
        );
        return Ok(());
    };

    let payload = dashboard.to_value()?;
    if dry_run {
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let id = publish_dashboard(&client, &dashboard)?;
    println!("{}", "Dashboard created successfully!".green().bold());
    println!("  ID:  {}", id);
    println!("  URL: {}", client.dashboard_url(&id));
    Ok(())
}

/// Resolve deployments and lay out their tiles; `None` when nothing matched.
pub fn prepare_dashboard<A: MonitoringApi + ?Sized>(
    api: &A,
    config: &Config,
    cluster: &str,
    namespace: &str,
    include_heap: bool,
) -> Option<Dashboard> {
    let resolver = EntityResolver::new(api, &config.workload, config.dynatrace.page_size);
    let deployments = resolver.resolve_deployments(cluster, namespace);
    if deployments.is_empty() {
        return None;
    }

    eprintln!("Found {} deployments", deployments.len());
    for deployment in &deployments {
        eprintln!("  - {}", deployment.name());
    }
    Some(build_dashboard(
        &config.workload,
        cluster,
        namespace,
        &deployments,
        include_heap,
    ))
}

/// Submit the dashboard once; any failure is surfaced, never retried.
pub fn publish_dashboard<A: MonitoringApi + ?Sized>(api: &A, dashboard: &Dashboard) -> Result<String> {
    let payload = dashboard.to_value()?;
    api.create_dashboard(&payload).map_err(|e| {
        error!("Dashboard creation failed: {}", e);
        AppError::DashboardFailed(e.to_string())
    })
}
