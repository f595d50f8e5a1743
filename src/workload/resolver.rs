//! Workload discovery by cluster and namespace.
//!
//! By default the whole workload entity type is fetched once and matched
//! locally. Matching is case-insensitive and by substring since tag spelling
//! differs between platform versions.

use super::selector::TagConvention;
use crate::config::types::WorkloadConfig;
use crate::platform::api::{Entity, MonitoringApi};
use log::{debug, info, warn};

/// Fields requested for workload entities
pub const ENTITY_FIELDS: &str = "+properties,+tags";

/// Local cluster/namespace matcher for entities fetched without a full
/// server-side filter.
#[derive(Debug, Clone)]
pub struct EntityMatcher {
    cluster: String,
    namespace: String,
}

impl EntityMatcher {
    pub fn new(cluster: &str, namespace: &str) -> Self {
        Self {
            cluster: cluster.to_lowercase(),
            namespace: namespace.to_lowercase(),
        }
    }

    /// Cluster name appears in any tag whose key mentions "cluster"
    pub fn matches_cluster(&self, entity: &Entity) -> bool {
        entity.tags.iter().any(|tag| {
            tag.key.to_lowercase().contains("cluster")
                && tag.effective_value().to_lowercase().contains(&self.cluster)
        })
    }

    /// Whether the entity says anything about its namespace
    pub fn has_namespace_info(entity: &Entity) -> bool {
        entity
            .tags
            .iter()
            .any(|tag| tag.key.to_lowercase().contains("namespace"))
            || namespace_properties(entity).next().is_some()
    }

    /// Namespace appears in a namespace tag value, or in a namespace
    /// property such as `namespaceName`
    pub fn matches_namespace(&self, entity: &Entity) -> bool {
        let by_tag = entity.tags.iter().any(|tag| {
            tag.key.to_lowercase().contains("namespace")
                && tag.effective_value().to_lowercase().contains(&self.namespace)
        });

        by_tag
            || namespace_properties(entity)
                .any(|value| value.to_lowercase().contains(&self.namespace))
    }

    /// Apply local matching for `convention` to an already-fetched set.
    ///
    /// When no fetched entity carries namespace information at all, every
    /// cluster-matched entity is returned.
    pub fn filter(&self, entities: Vec<Entity>, convention: TagConvention) -> Vec<Entity> {
        let namespace_known = entities.iter().any(Self::has_namespace_info);

        let in_cluster: Vec<Entity> = if convention.matches_cluster_locally() {
            entities
                .into_iter()
                .filter(|e| self.matches_cluster(e))
                .collect()
        } else {
            entities
        };

        if !convention.matches_namespace_locally() {
            return in_cluster;
        }

        if !namespace_known {
            if !in_cluster.is_empty() {
                warn!(
                    "No entity carries a namespace tag or property; returning all {} cluster-matched entities",
                    in_cluster.len()
                );
            }
            return in_cluster;
        }

        in_cluster
            .into_iter()
            .filter(|e| self.matches_namespace(e))
            .collect()
    }
}

/// String-valued properties whose key mentions "namespace"
fn namespace_properties(entity: &Entity) -> impl Iterator<Item = &str> {
    entity
        .properties
        .iter()
        .filter(|(key, _)| key.to_lowercase().contains("namespace"))
        .filter_map(|(_, value)| value.as_str())
}

/// Resolves the deployments of a cluster/namespace pair
pub struct EntityResolver<'a, A: MonitoringApi + ?Sized> {
    api: &'a A,
    entity_type: String,
    page_size: u32,
    conventions: Vec<TagConvention>,
}

impl<'a, A: MonitoringApi + ?Sized> EntityResolver<'a, A> {
    pub fn new(api: &'a A, workload: &WorkloadConfig, page_size: u32) -> Self {
        Self {
            api,
            entity_type: workload.entity_type.clone(),
            page_size,
            conventions: workload.conventions.clone(),
        }
    }

    /// Replace the configured lookup order
    pub fn with_conventions(mut self, conventions: Vec<TagConvention>) -> Self {
        self.conventions = conventions;
        self
    }

    /// Return the workloads of `cluster`/`namespace`.
    ///
    /// Conventions are tried in order and the first non-empty result wins;
    /// with the default single unfiltered fetch that is the exact
    /// cluster/namespace-matched subset of the entity type.
    /// Request failures skip to the next convention; an empty list means
    /// nothing was found.
    pub fn resolve_deployments(&self, cluster: &str, namespace: &str) -> Vec<Entity> {
        let matcher = EntityMatcher::new(cluster, namespace);

        for convention in &self.conventions {
            debug!("Trying strategy: {}", convention.description());
            let selector = convention.selector(&self.entity_type, cluster, namespace);

            let entities = match self.api.list_entities(
                &selector,
                Some(ENTITY_FIELDS),
                Some(self.page_size),
            ) {
                Ok(response) => response.entities,
                Err(e) => {
                    match e.status() {
                        Some(status) => debug!(
                            "HTTP error {} for strategy: {}",
                            status,
                            convention.description()
                        ),
                        None => warn!("Strategy '{}' failed: {}", convention.description(), e),
                    }
                    continue;
                }
            };
            debug!("Retrieved {} entities", entities.len());

            let entities = drop_anonymous(entities);
            let selected = matcher.filter(entities, *convention);

            if !selected.is_empty() {
                info!(
                    "Found {} deployments using: {}",
                    selected.len(),
                    convention.description()
                );
                return selected;
            }
        }

        warn!(
            "Could not find deployments for cluster '{}' namespace '{}' using any strategy",
            cluster, namespace
        );
        warn!("Run `dtk-ctl inspect --show-all-apps` to see the entity tags in your environment");
        Vec::new()
    }
}

/// Entities are identified by id; anything without one is unusable
fn drop_anonymous(entities: Vec<Entity>) -> Vec<Entity> {
    entities
        .into_iter()
        .filter(|entity| {
            let keep = !entity.entity_id.is_empty();
            if !keep {
                warn!("Ignoring entity '{}' without an entityId", entity.name());
            }
            keep
        })
        .collect()
}
