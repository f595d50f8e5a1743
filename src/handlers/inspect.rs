//! Handler for the `inspect` command.
//!
//! Connectivity check plus a look at how the environment names and tags its
//! Kubernetes entities, for when `metrics` finds nothing.

use crate::config::types::Config;
use crate::error::Result;
use crate::platform::api::{ApiError, DynatraceClient, Entity, MonitoringApi};
use crate::workload::TagConvention;
use crate::workload::selector;
use colored::Colorize;
use std::collections::BTreeSet;
use std::io::{self, Write};

/// Entity types queried when none is given
pub const COMMON_TYPES: &[&str] = &[
    "CLOUD_APPLICATION",
    "CLOUD_APPLICATION_WORKLOAD",
    "WORKLOAD",
    "CLOUD_APPLICATION_INSTANCE",
    "KUBERNETES_CLUSTER",
    "KUBERNETES_NODE",
];

const SAMPLE_PAGE_SIZE: u32 = 10;
const SHOW_ALL_PAGE_SIZE: u32 = 50;
const ENTITY_FIELDS: &str = "+properties,+tags";

/// Configuration for the inspect command
#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    pub cluster: Option<String>,
    pub namespace: Option<String>,
    /// Query only this entity type
    pub entity_type: Option<String>,
    /// Dump every workload entity with its tags
    pub show_all_apps: bool,
}

/// Handle the `inspect` command.
pub fn handle_inspect(config: &Config, options: InspectOptions) -> Result<()> {
    let client = DynatraceClient::new(&config.dynatrace)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", "=".repeat(80))?;
    writeln!(out, "{}", "Dynatrace API Inspector".bold())?;
    writeln!(out, "{}", "=".repeat(80))?;
    writeln!(out, "Dynatrace URL: {}", client.base_url())?;
    writeln!(out, "API Token: {}\n", mask_token(&config.dynatrace.api_token))?;

    run_inspect(&client, config, &options, &mut out)
}

/// Run the inspection against any API, writing the report to `out`.
pub fn run_inspect<A, W>(api: &A, config: &Config, options: &InspectOptions, out: &mut W) -> Result<()>
where
    A: MonitoringApi + ?Sized,
    W: Write,
{
    writeln!(out, "Testing API connection...")?;
    let types = match api.entity_types() {
        Ok(response) => {
            writeln!(out, "{} API connection successful!\n", "✓".green())?;
            response
                .types
                .iter()
                .map(|t| t.name().to_string())
                .collect::<BTreeSet<_>>()
        }
        Err(e) => {
            writeln!(out, "{} API connection failed: {}\n", "✗".red(), e)?;
            return Err(e.into());
        }
    };

    if options.show_all_apps {
        return show_all_apps(api, &config.workload.entity_type, out);
    }

    list_entity_types(&types, out)?;

    let cluster = options.cluster.as_deref();
    let namespace = options.namespace.as_deref();
    match &options.entity_type {
        Some(entity_type) => sample_entity_type(api, entity_type, cluster, namespace, out)?,
        None => {
            writeln!(out, "\n{}", "=".repeat(80))?;
            writeln!(out, "Testing common Kubernetes entity types:")?;
            writeln!(out, "{}", "=".repeat(80))?;
            for entity_type in COMMON_TYPES.iter().filter(|t| types.contains(**t)) {
                sample_entity_type(api, entity_type, cluster, namespace, out)?;
            }
        }
    }

    writeln!(out, "\n{}", "Inspection complete!".green())?;
    Ok(())
}

/// Whether an entity type name looks Kubernetes-related
pub fn is_kubernetes_type(type_name: &str) -> bool {
    ["CLOUD", "KUBERNETES", "WORKLOAD", "K8S"]
        .iter()
        .any(|marker| type_name.contains(marker))
}

fn list_entity_types<W: Write>(types: &BTreeSet<String>, out: &mut W) -> io::Result<()> {
    writeln!(out, "Found {} entity types:", types.len())?;
    writeln!(out, "{}", "=".repeat(80))?;

    let k8s: Vec<&String> = types.iter().filter(|t| is_kubernetes_type(t)).collect();
    if !k8s.is_empty() {
        writeln!(out, "\nKubernetes/Cloud related entity types:")?;
        for type_name in k8s {
            writeln!(out, "  - {}", type_name.cyan())?;
        }
    }

    writeln!(out, "\nAll entity types:")?;
    for type_name in types {
        writeln!(out, "  - {}", type_name)?;
    }
    Ok(())
}

/// Selector used to sample a type, narrowed by the bracketed tags when given
pub fn sample_selector(entity_type: &str, cluster: Option<&str>, namespace: Option<&str>) -> String {
    match (cluster, namespace) {
        (Some(c), Some(n)) => TagConvention::Bracketed.selector(entity_type, c, n),
        (Some(c), None) => TagConvention::ClusterOnly.selector(entity_type, c, ""),
        _ => selector::entity_type(entity_type),
    }
}

fn sample_entity_type<A, W>(
    api: &A,
    entity_type: &str,
    cluster: Option<&str>,
    namespace: Option<&str>,
    out: &mut W,
) -> io::Result<()>
where
    A: MonitoringApi + ?Sized,
    W: Write,
{
    writeln!(out, "\nTesting query for entity type: {}", entity_type.bold())?;
    writeln!(out, "{}", "-".repeat(80))?;

    let selector = sample_selector(entity_type, cluster, namespace);
    let response = match api.list_entities(&selector, Some(ENTITY_FIELDS), Some(SAMPLE_PAGE_SIZE)) {
        Ok(response) => response,
        Err(ApiError::Http { status: 404, .. }) => {
            return writeln!(out, "{} Entity type '{}' not found (404)", "✗".red(), entity_type);
        }
        Err(ApiError::Http { status: 400, body }) => {
            writeln!(
                out,
                "{} Bad request (400) - entity type may not exist or the query is invalid",
                "✗".red()
            )?;
            return writeln!(out, "   Response: {}", body);
        }
        Err(e) => return writeln!(out, "{} Error querying entity type: {}", "✗".red(), e),
    };

    writeln!(out, "{} Query successful!", "✓".green())?;
    writeln!(
        out,
        "  Total entities: {}",
        response.total_count.unwrap_or(response.entities.len() as u64)
    )?;
    writeln!(out, "  Returned entities: {}", response.entities.len())?;

    if let Some(entity) = response.entities.first() {
        writeln!(out, "\nFirst entity details:")?;
        write_entity(entity, out)?;
        if !entity.properties.is_empty() {
            writeln!(out, "  Properties:")?;
            let mut keys: Vec<&String> = entity.properties.keys().collect();
            keys.sort();
            for key in keys {
                writeln!(out, "    - {}: {}", key, entity.properties[key])?;
            }
        }
    }
    Ok(())
}

fn write_entity<W: Write>(entity: &Entity, out: &mut W) -> io::Result<()> {
    writeln!(out, "  Display Name: {}", entity.name())?;
    writeln!(out, "  Entity ID: {}", entity.entity_id)?;
    if let Some(entity_type) = &entity.entity_type {
        writeln!(out, "  Type: {}", entity_type)?;
    }
    writeln!(out, "  Tags:")?;
    for tag in &entity.tags {
        writeln!(out, "    - {}: {}", tag.key, tag.effective_value())?;
    }
    Ok(())
}

/// Tag keys seen across entities, with the cluster and namespace pairs
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TagSummary {
    pub keys: BTreeSet<String>,
    pub cluster_tags: BTreeSet<String>,
    pub namespace_tags: BTreeSet<String>,
}

impl TagSummary {
    pub fn from_entities(entities: &[Entity]) -> Self {
        let mut summary = Self::default();
        for tag in entities.iter().flat_map(|e| &e.tags) {
            summary.keys.insert(tag.key.clone());
            let key = tag.key.to_lowercase();
            let pair = format!("{}={}", tag.key, tag.effective_value());
            if key.contains("cluster") {
                summary.cluster_tags.insert(pair.clone());
            }
            if key.contains("namespace") {
                summary.namespace_tags.insert(pair);
            }
        }
        summary
    }
}

fn show_all_apps<A, W>(api: &A, entity_type: &str, out: &mut W) -> Result<()>
where
    A: MonitoringApi + ?Sized,
    W: Write,
{
    writeln!(out, "{}", "=".repeat(80))?;
    writeln!(out, "Fetching ALL {} entities to analyze tags...", entity_type)?;
    writeln!(out, "{}", "=".repeat(80))?;

    let response = api.list_entities(
        &selector::entity_type(entity_type),
        Some(ENTITY_FIELDS),
        Some(SHOW_ALL_PAGE_SIZE),
    )?;
    let entities = response.entities;
    writeln!(
        out,
        "Found {} {} entities (showing first {})",
        response.total_count.unwrap_or(entities.len() as u64),
        entity_type,
        entities.len()
    )?;

    if entities.is_empty() {
        writeln!(out, "No {} entities found!", entity_type)?;
        return Ok(());
    }

    for entity in &entities {
        writeln!(out, "\n{}", "=".repeat(80))?;
        write_entity(entity, out)?;
    }

    let summary = TagSummary::from_entities(&entities);
    writeln!(out, "\n{}", "=".repeat(80))?;
    writeln!(out, "SUMMARY - All unique tag keys found:")?;
    writeln!(out, "{}", "=".repeat(80))?;
    for key in &summary.keys {
        writeln!(out, "  - {}", key)?;
    }
    if !summary.cluster_tags.is_empty() {
        writeln!(out, "\nCluster tags found:")?;
        for tag in &summary.cluster_tags {
            writeln!(out, "  - {}", tag.cyan())?;
        }
    }
    if !summary.namespace_tags.is_empty() {
        writeln!(out, "\nNamespace tags found:")?;
        for tag in &summary.namespace_tags {
            writeln!(out, "  - {}", tag.cyan())?;
        }
    }
    Ok(())
}

/// Show only the last four characters of a token
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}{}", "*".repeat(20), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::api::Tag;

    #[test]
    fn test_kubernetes_type_detection() {
        assert!(is_kubernetes_type("CLOUD_APPLICATION"));
        assert!(is_kubernetes_type("KUBERNETES_NODE"));
        assert!(is_kubernetes_type("CLOUD_APPLICATION_WORKLOAD"));
        assert!(!is_kubernetes_type("PROCESS_GROUP"));
        assert!(!is_kubernetes_type("HOST"));
    }

    #[test]
    fn test_sample_selector() {
        assert_eq!(sample_selector("HOST", None, None), "type(\"HOST\")");
        assert_eq!(
            sample_selector("CLOUD_APPLICATION", Some("aks"), None),
            "type(\"CLOUD_APPLICATION\"),tag(\"[Kubernetes]cluster:aks\")"
        );
        assert_eq!(
            sample_selector("CLOUD_APPLICATION", Some("aks"), Some("shop")),
            "type(\"CLOUD_APPLICATION\"),tag(\"[Kubernetes]cluster:aks\"),tag(\"[Kubernetes]namespace:shop\")"
        );
    }

    #[test]
    fn test_tag_summary() {
        let entities = vec![
            Entity {
                entity_id: "A".to_string(),
                tags: vec![
                    Tag::new("[Kubernetes]cluster", "aks"),
                    Tag::new("[Kubernetes]namespace", "shop"),
                    Tag::new("team", "core"),
                ],
                ..Default::default()
            },
            Entity {
                entity_id: "B".to_string(),
                tags: vec![Tag::new("Kubernetes:Cluster", "aks")],
                ..Default::default()
            },
        ];
        let summary = TagSummary::from_entities(&entities);
        assert_eq!(summary.keys.len(), 4);
        assert!(summary.cluster_tags.contains("[Kubernetes]cluster=aks"));
        assert!(summary.cluster_tags.contains("Kubernetes:Cluster=aks"));
        assert_eq!(
            summary.namespace_tags.iter().collect::<Vec<_>>(),
            vec!["[Kubernetes]namespace=shop"]
        );
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("dt0c01.ABCDEFGH"), format!("{}EFGH", "*".repeat(20)));
        assert_eq!(mask_token("ab"), format!("{}ab", "*".repeat(20)));
    }
}
