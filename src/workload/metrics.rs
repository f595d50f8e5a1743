//! Per-deployment CPU/memory statistics aggregated across pods.
//!
//! Every request is a single attempt. A failed request contributes an empty
//! stat (or an empty entity list) and aggregation carries on, so callers
//! always get a well-formed result.

use super::selector::{entity_id, entity_ids, from_relationship, to_relationship};
use super::types::{DeploymentMetrics, ExtraMetric, MetricStat, TimeWindow};
use crate::config::types::WorkloadConfig;
use crate::platform::api::{ApiError, Entity, MetricQueryResponse, MonitoringApi};
use log::{debug, info, warn};

/// Pod → deployment edge
const INSTANCE_OF: &str = "isInstanceOf";
/// Process group → host/workload edge
const RUNS_ON: &str = "runsOn";
/// Container group instance → pod edge
const CGI_OF_POD: &str = "isCgiOfCai";
/// Pod ids per relationship selector; keeps request URLs short
const POD_IDS_PER_SELECTOR: usize = 10;

// ============================================================================
// Reductions
// ============================================================================

/// Reduce a metric query answer to a min/max pair.
///
/// `min` comes from the series whose id ends in `:min`, `max` from `:max`.
/// Null points are dropped; a missing or empty series yields 0.0.
pub fn stat_from_response(response: &MetricQueryResponse) -> MetricStat {
    let mut stat = MetricStat::default();

    for collection in &response.result {
        let values = collection
            .data
            .iter()
            .flat_map(|series| series.values.iter().flatten().copied());

        if collection.metric_id.ends_with(":min") {
            stat.min = values.reduce(f64::min).unwrap_or(0.0);
        } else if collection.metric_id.ends_with(":max") {
            stat.max = values.reduce(f64::max).unwrap_or(0.0);
        }
    }

    stat
}

/// Combine per-pod stats into a deployment stat.
///
/// `min` is the smallest strictly-positive pod minimum, so idle pods do not
/// mask the smallest real footprint. `max` is the sum of pod maxima, the peak
/// capacity consumed by the whole deployment.
pub fn aggregate_pods(stats: &[MetricStat]) -> MetricStat {
    let min = stats
        .iter()
        .map(|s| s.min)
        .filter(|min| *min > 0.0)
        .reduce(f64::min)
        .unwrap_or(0.0);
    let max = stats.iter().map(|s| s.max).sum();

    MetricStat::new(min, max).sanitized()
}

/// Envelope of per-entity stats: min of minima, max of maxima
pub fn aggregate_envelope(stats: &[MetricStat]) -> MetricStat {
    let min = stats.iter().map(|s| s.min).reduce(f64::min).unwrap_or(0.0);
    let max = stats.iter().map(|s| s.max).reduce(f64::max).unwrap_or(0.0);

    MetricStat::new(min, max).sanitized()
}

// ============================================================================
// Aggregator
// ============================================================================

/// Fetches and aggregates workload statistics
pub struct MetricAggregator<'a, A: MonitoringApi + ?Sized> {
    api: &'a A,
    workload: WorkloadConfig,
    page_size: u32,
}

impl<'a, A: MonitoringApi + ?Sized> MetricAggregator<'a, A> {
    pub fn new(api: &'a A, workload: &WorkloadConfig, page_size: u32) -> Self {
        Self {
            api,
            workload: workload.clone(),
            page_size,
        }
    }

    /// Query min/max of `metric_key` for the entities of `entity_selector`
    pub fn try_metric_stat(
        &self,
        metric_key: &str,
        entity_selector: &str,
        window: &TimeWindow,
    ) -> Result<MetricStat, ApiError> {
        let metric_selector = format!("{key}:min,{key}:max", key = metric_key);
        let response = self.api.query_metrics(
            &metric_selector,
            entity_selector,
            &window.from_param(),
            &window.to_param(),
            &self.workload.resolution,
        )?;
        Ok(stat_from_response(&response))
    }

    /// Like [`try_metric_stat`](Self::try_metric_stat), with failures logged
    /// and reported as an empty stat
    pub fn get_metric_stat(
        &self,
        metric_key: &str,
        entity_selector: &str,
        window: &TimeWindow,
    ) -> MetricStat {
        self.try_metric_stat(metric_key, entity_selector, window)
            .unwrap_or_else(|e| {
                warn!("Error fetching metric {} for {}: {}", metric_key, entity_selector, e);
                MetricStat::default()
            })
    }

    /// Pods belonging to a deployment; empty on failure
    pub fn find_pods(&self, deployment_id: &str) -> Vec<Entity> {
        let selector = from_relationship(
            &self.workload.pod_entity_type,
            INSTANCE_OF,
            &entity_id(deployment_id),
        );
        self.entities_or_empty(&selector, "pods")
    }

    /// CPU, memory and optional extra memory statistics for a deployment
    pub fn fetch_workload_metrics(
        &self,
        deployment_id: &str,
        window: &TimeWindow,
        extra: Option<ExtraMetric>,
    ) -> DeploymentMetrics {
        let pods = self.find_pods(deployment_id);
        if pods.is_empty() {
            info!("No pods found for deployment {}", deployment_id);
            return DeploymentMetrics::empty(extra);
        }
        debug!("Deployment {} has {} pods", deployment_id, pods.len());

        let mut cpu = Vec::with_capacity(pods.len());
        let mut memory = Vec::with_capacity(pods.len());
        for pod in &pods {
            let selector = entity_id(&pod.entity_id);
            cpu.push(self.get_metric_stat(&self.workload.cpu_metric, &selector, window));
            memory.push(self.get_metric_stat(&self.workload.memory_metric, &selector, window));
        }

        let extra = extra.map(|kind| self.extra_metric(kind, deployment_id, &pods, window));

        DeploymentMetrics {
            cpu: aggregate_pods(&cpu),
            memory: aggregate_pods(&memory),
            extra,
            pod_count: pods.len(),
        }
    }

    fn extra_metric(
        &self,
        kind: ExtraMetric,
        deployment_id: &str,
        pods: &[Entity],
        window: &TimeWindow,
    ) -> MetricStat {
        let (entities, primary, fallback) = match kind {
            ExtraMetric::Heap => (
                self.process_groups(deployment_id, pods),
                &self.workload.heap_metric,
                &self.workload.heap_fallback_metric,
            ),
            ExtraMetric::ContainerMemory => (
                self.container_groups(pods),
                &self.workload.container_memory_metric,
                &self.workload.container_memory_fallback_metric,
            ),
        };

        if entities.is_empty() {
            info!(
                "No {} entities found for deployment {}",
                kind.source(),
                deployment_id
            );
            return MetricStat::default();
        }

        let stats = self.signal_stats(&entities, primary, window);
        let stats = if stats.is_empty() {
            debug!("No signal from {}, trying {}", primary, fallback);
            self.signal_stats(&entities, fallback, window)
        } else {
            stats
        };

        aggregate_envelope(&stats)
    }

    /// Per-entity stats for `metric_key`, keeping only entities with data
    fn signal_stats(&self, entities: &[Entity], metric_key: &str, window: &TimeWindow) -> Vec<MetricStat> {
        entities
            .iter()
            .map(|e| self.get_metric_stat(metric_key, &entity_id(&e.entity_id), window))
            .filter(MetricStat::has_signal)
            .collect()
    }

    /// Process groups running a deployment, directly or via its first pods
    fn process_groups(&self, deployment_id: &str, pods: &[Entity]) -> Vec<Entity> {
        let direct = from_relationship("PROCESS_GROUP", RUNS_ON, &entity_id(deployment_id));
        let groups = self.entities_or_empty(&direct, "process groups");
        if !groups.is_empty() {
            return groups;
        }

        let pod_ids = pods
            .iter()
            .take(POD_IDS_PER_SELECTOR)
            .map(|p| p.entity_id.as_str());
        let via_pods = to_relationship("PROCESS_GROUP", RUNS_ON, &entity_ids(pod_ids));
        self.entities_or_empty(&via_pods, "process groups")
    }

    /// Container-group instances of the given pods, looked up in batches of
    /// pod ids to keep selectors short
    fn container_groups(&self, pods: &[Entity]) -> Vec<Entity> {
        pods.chunks(POD_IDS_PER_SELECTOR)
            .flat_map(|batch| {
                let pod_ids = batch.iter().map(|p| p.entity_id.as_str());
                let selector = from_relationship(
                    &self.workload.container_entity_type,
                    CGI_OF_POD,
                    &entity_ids(pod_ids),
                );
                self.entities_or_empty(&selector, "containers")
            })
            .collect()
    }

    fn entities_or_empty(&self, selector: &str, what: &str) -> Vec<Entity> {
        match self.api.list_entities(selector, None, Some(self.page_size)) {
            Ok(response) => response
                .entities
                .into_iter()
                .filter(|e| !e.entity_id.is_empty())
                .collect(),
            Err(e) => {
                warn!("Error fetching {}: {}", what, e);
                Vec::new()
            }
        }
    }
}
