//! # Dynatrace Kubernetes workload metrics
//!
//! Discovers the deployments of a Kubernetes cluster/namespace in a Dynatrace
//! environment, aggregates their CPU and memory usage across pods and renders
//! the results as a table, JSON, CSV or a Dynatrace dashboard.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dynatrace_k8s_metrics::config::load_config;
//! use dynatrace_k8s_metrics::platform::DynatraceClient;
//! use dynatrace_k8s_metrics::workload::{EntityResolver, MetricAggregator, TimeWindow};
//!
//! # fn main() -> dynatrace_k8s_metrics::Result<()> {
//! let config = load_config(None)?;
//! config.dynatrace.validate()?;
//! let client = DynatraceClient::new(&config.dynatrace)?;
//!
//! let resolver = EntityResolver::new(&client, &config.workload, config.dynatrace.page_size);
//! let aggregator = MetricAggregator::new(&client, &config.workload, config.dynatrace.page_size);
//! let window = TimeWindow::last_hours(24);
//!
//! for deployment in resolver.resolve_deployments("aks-playground", "astroshop") {
//!     let metrics = aggregator.fetch_workload_metrics(&deployment.entity_id, &window, None);
//!     println!("{}: {} pods", deployment.name(), metrics.pod_count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod platform;
pub mod workload;

// Re-export commonly used types and functions
pub use error::{AppError, Result};
pub use platform::{DynatraceClient, MonitoringApi};
use cli::Commands;
use config::types::Config;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Metrics {
            cluster,
            namespace,
            hours,
            format,
            output,
            include_heap,
            include_container_memory,
            deployment,
        } => handlers::handle_metrics(
            config,
            handlers::MetricsOptions {
                cluster,
                namespace,
                hours,
                format,
                output,
                extra: cli::extra_metric(include_heap, include_container_memory),
                deployment,
            },
        ),
        Commands::Dashboard {
            cluster,
            namespace,
            include_heap,
            dry_run,
        } => handlers::handle_dashboard(config, &cluster, &namespace, include_heap, dry_run),
        Commands::Inspect {
            cluster,
            namespace,
            entity_type,
            show_all_apps,
        } => handlers::handle_inspect(
            config,
            handlers::InspectOptions {
                cluster,
                namespace,
                entity_type,
                show_all_apps,
            },
        ),
    }
}
