//! Kubernetes workload metrics from Dynatrace
//!
//! Resolves the deployments of a cluster/namespace pair, aggregates their
//! CPU and memory statistics across pods and renders the results.
//!
//! # Example
//!
//! ```rust,ignore
//! use dynatrace_k8s_metrics::workload::{EntityResolver, MetricAggregator, TimeWindow};
//!
//! let resolver = EntityResolver::new(&client, &config.workload, config.dynatrace.page_size);
//! let aggregator = MetricAggregator::new(&client, &config.workload, config.dynatrace.page_size);
//!
//! let window = TimeWindow::last_hours(24);
//! for deployment in resolver.resolve_deployments("aks-playground", "astroshop") {
//!     let metrics = aggregator.fetch_workload_metrics(&deployment.entity_id, &window, None);
//!     println!("{}: {} pods, CPU max {}m", deployment.name(), metrics.pod_count, metrics.cpu.max);
//! }
//! ```

pub mod dashboard;
pub mod formatter;
pub mod metrics;
pub mod report;
pub mod resolver;
pub mod selector;
pub mod types;

pub use dashboard::{Dashboard, build_dashboard};
pub use formatter::OutputFormat;
pub use metrics::{MetricAggregator, aggregate_envelope, aggregate_pods, stat_from_response};
pub use report::{DeploymentReport, format_cpu, format_memory};
pub use resolver::{EntityMatcher, EntityResolver};
pub use selector::TagConvention;
pub use types::{DeploymentMetrics, ExtraMetric, MetricStat, TimeWindow};
