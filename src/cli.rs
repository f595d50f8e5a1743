use crate::workload::{ExtraMetric, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dtk-ctl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kubernetes deployment metrics from Dynatrace")]
#[command(long_about = "Discovers the deployments of a Kubernetes cluster and namespace in Dynatrace, aggregates their CPU and memory usage across pods, and renders the results as a table, JSON, CSV or a Dynatrace dashboard.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch CPU and memory statistics for every deployment in a namespace
    Metrics {
        /// Kubernetes cluster name
        #[arg(long, env = "DTK_CLUSTER")]
        cluster: String,

        /// Kubernetes namespace
        #[arg(long, env = "DTK_NAMESPACE")]
        namespace: String,

        /// Number of hours to look back for metrics
        #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..))]
        hours: u32,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Output file path (CSV defaults to an auto-generated name)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Include JVM heap memory metrics (for Spring Boot microservices)
        #[arg(long)]
        include_heap: bool,

        /// Include container memory metrics
        #[arg(long, conflicts_with = "include_heap")]
        include_container_memory: bool,

        /// Only report the deployment with this display name
        #[arg(long, value_name = "NAME")]
        deployment: Option<String>,
    },

    /// Create a Dynatrace dashboard with CPU and memory tiles per deployment
    Dashboard {
        /// Kubernetes cluster name
        #[arg(long, env = "DTK_CLUSTER")]
        cluster: String,

        /// Kubernetes namespace
        #[arg(long, env = "DTK_NAMESPACE")]
        namespace: String,

        /// Include JVM heap memory tiles
        #[arg(long)]
        include_heap: bool,

        /// Print the dashboard payload instead of creating it
        #[arg(long)]
        dry_run: bool,
    },

    /// Check API connectivity and show the entity types and tags of the environment
    Inspect {
        /// Kubernetes cluster name used for test queries
        #[arg(long)]
        cluster: Option<String>,

        /// Kubernetes namespace used for test queries
        #[arg(long, requires = "cluster")]
        namespace: Option<String>,

        /// Test a specific entity type
        #[arg(long, value_name = "TYPE")]
        entity_type: Option<String>,

        /// Show all workload entities and their tags
        #[arg(long)]
        show_all_apps: bool,
    },
}

/// Which extra memory metric the flags ask for
pub fn extra_metric(include_heap: bool, include_container_memory: bool) -> Option<ExtraMetric> {
    if include_heap {
        Some(ExtraMetric::Heap)
    } else if include_container_memory {
        Some(ExtraMetric::ContainerMemory)
    } else {
        None
    }
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
