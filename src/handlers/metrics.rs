//! Handler for the `metrics` command.
//!
//! Resolves the deployments of a cluster/namespace, aggregates their pod
//! metrics one deployment at a time and renders the reports.
//!
//! Progress and the time window go to stderr so JSON on stdout stays
//! machine-readable.

use crate::config::types::Config;
use crate::error::Result;
use crate::platform::api::{DynatraceClient, MonitoringApi};
use crate::workload::formatter::{default_csv_path, format_reports_to_string, write_csv};
use crate::workload::types::TIMESTAMP_FORMAT;
use crate::workload::{
    DeploymentReport, EntityResolver, ExtraMetric, MetricAggregator, OutputFormat, TimeWindow,
};
use chrono::Local;
use colored::Colorize;
use log::info;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

/// Configuration for the metrics command
#[derive(Debug, Clone)]
pub struct MetricsOptions {
    /// Kubernetes cluster name
    pub cluster: String,
    /// Kubernetes namespace
    pub namespace: String,
    /// Look-back window in hours
    pub hours: u32,
    /// Output format
    pub format: OutputFormat,
    /// Output file
    pub output: Option<PathBuf>,
    /// Heap or container memory column
    pub extra: Option<ExtraMetric>,
    /// Restrict to one deployment by display name
    pub deployment: Option<String>,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            cluster: String::new(),
            namespace: String::new(),
            hours: 24,
            format: OutputFormat::Table,
            output: None,
            extra: None,
            deployment: None,
        }
    }
}

/// Handle the `metrics` command.
pub fn handle_metrics(config: &Config, options: MetricsOptions) -> Result<()> {
    let client = DynatraceClient::new(&config.dynatrace)?;
    let window = TimeWindow::last_hours(options.hours);

    eprintln!(
        "{} deployments for cluster '{}' in namespace '{}'...",
        "Fetching".cyan(),
        options.cluster,
        options.namespace
    );

    let reports = collect_reports(&client, config, &options, &window);
    if reports.is_empty() {
        println!(
            "No deployments found in cluster '{}' namespace '{}'",
            options.cluster, options.namespace
        );
        return Ok(());
    }

    render(&reports, &options)?;

    eprintln!(
        "\nTime range: {} to {}",
        window.from.format(TIMESTAMP_FORMAT),
        window.to.format(TIMESTAMP_FORMAT)
    );
    Ok(())
}

/// Resolve the deployments and build one report each, in discovery order.
pub fn collect_reports<A: MonitoringApi + ?Sized>(
    api: &A,
    config: &Config,
    options: &MetricsOptions,
    window: &TimeWindow,
) -> Vec<DeploymentReport> {
    let page_size = config.dynatrace.page_size;
    let resolver = EntityResolver::new(api, &config.workload, page_size);
    let aggregator = MetricAggregator::new(api, &config.workload, page_size);

    let mut deployments = resolver.resolve_deployments(&options.cluster, &options.namespace);
    if let Some(name) = &options.deployment {
        deployments.retain(|d| d.name() == name.as_str());
        info!("Filtered to {} deployment(s) named '{}'", deployments.len(), name);
    }

    if !deployments.is_empty() {
        eprintln!("Found {} deployments", deployments.len());
    }

    deployments
        .iter()
        .map(|deployment| {
            let name = deployment.name();
            eprintln!("  {} metrics for: {}", "Fetching".cyan(), name);
            let metrics =
                aggregator.fetch_workload_metrics(&deployment.entity_id, window, options.extra);
            DeploymentReport::new(
                name,
                &options.cluster,
                &options.namespace,
                &metrics,
                options.extra,
            )
        })
        .collect()
}

fn render(reports: &[DeploymentReport], options: &MetricsOptions) -> Result<()> {
    match options.format {
        OutputFormat::Csv => {
            let path = options.output.clone().unwrap_or_else(|| {
                default_csv_path(&options.cluster, &options.namespace, Local::now())
            });
            let file = File::create(&path)?;
            write_csv(BufWriter::new(file), reports, options.extra)?;
            println!("{} {}", "CSV file saved to:".green(), path.display());
        }
        format => {
            let rendered = format_reports_to_string(reports, format, options.extra)?;
            match &options.output {
                Some(path) => {
                    fs::write(path, &rendered)?;
                    println!("{} {}", "Output saved to:".green(), path.display());
                }
                None => println!("{}", rendered),
            }
        }
    }
    Ok(())
}
