use crate::error::ConfigError;
use crate::workload::selector::TagConvention;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dynatrace: DynatraceConfig,
    #[serde(default)]
    pub workload: WorkloadConfig,
}

/// Connection settings for one Dynatrace environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynatraceConfig {
    /// Environment URL (e.g. https://abc12345.live.dynatrace.com)
    pub url: String,
    /// API token with entities.read, metrics.read and WriteConfig scopes
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_token: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Page size cap for entity searches
    pub page_size: u32,
}

impl Default for DynatraceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_token: String::new(),
            timeout_secs: 30,
            page_size: 500,
        }
    }
}

impl DynatraceConfig {
    /// Check that credentials are present and the URL is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.url.trim().is_empty() {
            missing.push("DYNATRACE_URL");
        }
        if self.api_token.trim().is_empty() {
            missing.push("DYNATRACE_API_TOKEN");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials(missing.join(", ")));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }
        Ok(())
    }
}

/// Entity types and metric keys used for workload discovery and aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Entity type of Kubernetes workloads
    pub entity_type: String,
    /// Entity type of pods
    pub pod_entity_type: String,
    /// Entity type of containers
    pub container_entity_type: String,
    /// Metric query resolution
    pub resolution: String,
    pub cpu_metric: String,
    pub memory_metric: String,
    pub heap_metric: String,
    pub heap_fallback_metric: String,
    pub container_memory_metric: String,
    pub container_memory_fallback_metric: String,
    /// Workload-level keys charted by the dashboard
    pub dashboard_cpu_metric: String,
    pub dashboard_memory_metric: String,
    /// Lookup order for workloads. The single unfiltered fetch is the
    /// default; server-side tag conventions can be tried before it.
    pub conventions: Vec<TagConvention>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            entity_type: "CLOUD_APPLICATION".to_string(),
            pod_entity_type: "CLOUD_APPLICATION_INSTANCE".to_string(),
            container_entity_type: "CONTAINER_GROUP_INSTANCE".to_string(),
            resolution: "1h".to_string(),
            cpu_metric: "builtin:cloud.kubernetes.pod.cpu.usage".to_string(),
            memory_metric: "builtin:cloud.kubernetes.pod.memory.usage".to_string(),
            heap_metric: "builtin:tech.generic.mem.usedHeap".to_string(),
            heap_fallback_metric: "builtin:tech.jvm.memory.pool.used".to_string(),
            container_memory_metric: "builtin:containers.memory.residentSnapshotBytes".to_string(),
            container_memory_fallback_metric: "builtin:containers.memory.memoryWorkingSetBytes"
                .to_string(),
            dashboard_cpu_metric: "builtin:cloud.kubernetes.workload.cpu.usage".to_string(),
            dashboard_memory_metric: "builtin:cloud.kubernetes.workload.memory.usage".to_string(),
            conventions: TagConvention::DEFAULT.to_vec(),
        }
    }
}
