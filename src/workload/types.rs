//! Core types for workload metric aggregation.

use chrono::{DateTime, Duration, Local};
use log::warn;
use serde::{Deserialize, Serialize};

/// Timestamp format accepted by the metrics query endpoint
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ============================================================================
// Metric statistics
// ============================================================================

/// Minimum and maximum of a metric over a time window.
///
/// Units depend on the metric (millicores for CPU, bytes for memory).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStat {
    pub min: f64,
    pub max: f64,
}

impl MetricStat {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True when either bound carries a value
    pub fn has_signal(&self) -> bool {
        self.min > 0.0 || self.max > 0.0
    }

    pub fn is_zero(&self) -> bool {
        self.min == 0.0 && self.max == 0.0
    }

    /// Enforce `min <= max` when both bounds are non-zero.
    ///
    /// Inverted bounds are swapped and reported.
    pub fn sanitized(self) -> Self {
        if self.min != 0.0 && self.max != 0.0 && self.min > self.max {
            warn!(
                "Inverted metric bounds (min {} > max {}), swapping",
                self.min, self.max
            );
            Self::new(self.max, self.min)
        } else {
            self
        }
    }
}

/// Aggregated metrics for one deployment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentMetrics {
    pub cpu: MetricStat,
    pub memory: MetricStat,
    /// Heap or container memory, present only when requested
    pub extra: Option<MetricStat>,
    pub pod_count: usize,
}

impl DeploymentMetrics {
    /// All-zero metrics, with a zero extra stat when one was requested
    pub fn empty(extra: Option<ExtraMetric>) -> Self {
        Self {
            extra: extra.map(|_| MetricStat::default()),
            ..Default::default()
        }
    }
}

/// Optional secondary memory metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraMetric {
    /// JVM heap of the process groups running the deployment
    Heap,
    /// Memory of the container-group instances of the deployment's pods
    ContainerMemory,
}

impl ExtraMetric {
    /// Short column label for tables
    pub fn label(&self) -> &'static str {
        match self {
            ExtraMetric::Heap => "Heap",
            ExtraMetric::ContainerMemory => "Ctr Mem",
        }
    }

    /// CSV column prefix
    pub fn column_prefix(&self) -> &'static str {
        match self {
            ExtraMetric::Heap => "heap_usage",
            ExtraMetric::ContainerMemory => "container_memory_usage",
        }
    }

    /// Name of the entities the metric is read from
    pub fn source(&self) -> &'static str {
        match self {
            ExtraMetric::Heap => "process group",
            ExtraMetric::ContainerMemory => "container",
        }
    }
}

// ============================================================================
// Time window
// ============================================================================

/// Query window for metric statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Local>,
    pub to: DateTime<Local>,
}

impl TimeWindow {
    pub fn new(from: DateTime<Local>, to: DateTime<Local>) -> Self {
        Self { from, to }
    }

    /// Window ending now and reaching `hours` back
    pub fn last_hours(hours: u32) -> Self {
        let to = Local::now();
        Self {
            from: to - Duration::hours(i64::from(hours)),
            to,
        }
    }

    pub fn from_param(&self) -> String {
        self.from.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format(TIMESTAMP_FORMAT).to_string()
    }
}
