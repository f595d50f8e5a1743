//! Presentation rows built from aggregated metrics.

use super::types::{DeploymentMetrics, ExtraMetric, MetricStat};
use serde::{Deserialize, Serialize};

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;

/// Human-readable memory size (e.g. "512.50 MB")
pub fn format_memory(bytes: f64) -> String {
    if bytes >= GB {
        format!("{:.2} GB", bytes / GB)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes / KB)
    } else {
        format!("{:.2} B", bytes)
    }
}

/// Human-readable CPU amount (e.g. "1.50 cores")
pub fn format_cpu(millicores: f64) -> String {
    if millicores >= 1000.0 {
        format!("{:.2} cores", millicores / 1000.0)
    } else {
        format!("{:.2} millicores", millicores)
    }
}

/// A stat with its rendered bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedStat {
    pub min: f64,
    pub max: f64,
    pub min_formatted: String,
    pub max_formatted: String,
}

impl FormattedStat {
    pub fn cpu(stat: MetricStat) -> Self {
        Self::with(stat, format_cpu)
    }

    pub fn memory(stat: MetricStat) -> Self {
        Self::with(stat, format_memory)
    }

    fn with(stat: MetricStat, render: fn(f64) -> String) -> Self {
        Self {
            min: stat.min,
            max: stat.max,
            min_formatted: render(stat.min),
            max_formatted: render(stat.max),
        }
    }
}

/// One deployment's results as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub deployment_name: String,
    pub namespace: String,
    pub cluster: String,
    pub pod_count: usize,
    pub cpu: FormattedStat,
    pub memory: FormattedStat,
    /// Which extra memory statistic `extra` holds
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extra_metric: Option<ExtraMetric>,
    /// Heap or container memory, when requested
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extra: Option<FormattedStat>,
}

impl DeploymentReport {
    pub fn new(
        deployment_name: &str,
        cluster: &str,
        namespace: &str,
        metrics: &DeploymentMetrics,
        extra_metric: Option<ExtraMetric>,
    ) -> Self {
        Self {
            deployment_name: deployment_name.to_string(),
            namespace: namespace.to_string(),
            cluster: cluster.to_string(),
            pod_count: metrics.pod_count,
            cpu: FormattedStat::cpu(metrics.cpu),
            memory: FormattedStat::memory(metrics.memory),
            extra_metric: metrics.extra.and(extra_metric),
            extra: metrics.extra.map(FormattedStat::memory),
        }
    }
}
