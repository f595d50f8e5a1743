//! Entity selector construction.
//!
//! The selector language quotes string arguments; `~` escapes quotes and
//! itself inside them.

use serde::{Deserialize, Serialize};

/// Quote a string argument of the selector language
pub fn quote(value: &str) -> String {
    let escaped = value.replace('~', "~~").replace('"', "~\"");
    format!("\"{}\"", escaped)
}

/// `type("T")`
pub fn entity_type(type_name: &str) -> String {
    format!("type({})", quote(type_name))
}

/// `entityId("ID")`
pub fn entity_id(id: &str) -> String {
    entity_ids(std::iter::once(id))
}

/// `entityId("A","B",...)`
pub fn entity_ids<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let quoted: Vec<String> = ids.into_iter().map(quote).collect();
    format!("entityId({})", quoted.join(","))
}

/// `type("CHILD"),fromRelationships.<relation>(<target>)`
pub fn from_relationship(child_type: &str, relation: &str, target: &str) -> String {
    format!(
        "{},fromRelationships.{}({})",
        entity_type(child_type),
        relation,
        target
    )
}

/// `type("CHILD"),toRelationships.<relation>(<target>)`
pub fn to_relationship(child_type: &str, relation: &str, target: &str) -> String {
    format!(
        "{},toRelationships.{}({})",
        entity_type(child_type),
        relation,
        target
    )
}

/// `tag("KEY:VALUE")`
fn tag(key: &str, value: &str) -> String {
    format!("tag({})", quote(&format!("{}:{}", key, value)))
}

// ============================================================================
// Tag conventions
// ============================================================================

/// One way of locating a cluster/namespace's workloads.
///
/// `Unfiltered` fetches the whole entity type and matches both tags locally,
/// which tolerates every tag spelling. The server-side conventions are only
/// used when configured; the resolver walks them in order until one yields
/// entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagConvention {
    /// `[Kubernetes]cluster:C` and `[Kubernetes]namespace:N`, matched server-side
    Bracketed,
    /// `Kubernetes:cluster:C` and `Kubernetes:namespace:N`, matched server-side
    ColonSeparated,
    /// Cluster tag server-side, namespace matched on tags/properties
    ClusterOnly,
    /// Whole entity type fetched once, both matched by substring
    Unfiltered,
}

impl TagConvention {
    /// Default lookup: one unfiltered fetch, matched locally
    pub const DEFAULT: [TagConvention; 1] = [TagConvention::Unfiltered];

    /// Server-side narrowing first, ending with the unfiltered fetch
    pub const CHAIN: [TagConvention; 4] = [
        TagConvention::Bracketed,
        TagConvention::ColonSeparated,
        TagConvention::ClusterOnly,
        TagConvention::Unfiltered,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            TagConvention::Bracketed => "[Kubernetes]cluster and [Kubernetes]namespace tags",
            TagConvention::ColonSeparated => "Kubernetes:cluster and Kubernetes:namespace tags",
            TagConvention::ClusterOnly => "cluster tag only, namespace matched locally",
            TagConvention::Unfiltered => "no server-side filter, matched locally",
        }
    }

    /// Build the entity selector for this convention
    pub fn selector(&self, type_name: &str, cluster: &str, namespace: &str) -> String {
        let base = entity_type(type_name);
        match self {
            TagConvention::Bracketed => format!(
                "{},{},{}",
                base,
                tag("[Kubernetes]cluster", cluster),
                tag("[Kubernetes]namespace", namespace)
            ),
            TagConvention::ColonSeparated => format!(
                "{},{},{}",
                base,
                tag("Kubernetes:cluster", cluster),
                tag("Kubernetes:namespace", namespace)
            ),
            TagConvention::ClusterOnly => {
                format!("{},{}", base, tag("[Kubernetes]cluster", cluster))
            }
            TagConvention::Unfiltered => base,
        }
    }

    /// Whether returned entities still need a local cluster check
    pub fn matches_cluster_locally(&self) -> bool {
        matches!(self, TagConvention::Unfiltered)
    }

    /// Whether returned entities still need a local namespace check
    pub fn matches_namespace_locally(&self) -> bool {
        matches!(self, TagConvention::ClusterOnly | TagConvention::Unfiltered)
    }
}
