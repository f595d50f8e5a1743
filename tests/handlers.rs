//! Dashboard and inspect commands against an in-memory API.

mod common;

use common::FakeApi;
use dynatrace_k8s_metrics::AppError;
use dynatrace_k8s_metrics::config::Config;
use dynatrace_k8s_metrics::handlers::{InspectOptions, prepare_dashboard, publish_dashboard, run_inspect};
use dynatrace_k8s_metrics::workload::TagConvention;
use serde_json::json;

fn bracketed(cluster: &str, namespace: &str) -> String {
    TagConvention::Bracketed.selector("CLOUD_APPLICATION", cluster, namespace)
}

/// Workloads of cluster "aks", served by the single unfiltered fetch
fn aks_workloads(api: FakeApi, entities: &[(&'static str, &'static str)]) -> FakeApi {
    let tagged = entities
        .iter()
        .map(|(id, name)| (*id, *name, vec![("[Kubernetes]cluster", "aks")]))
        .collect();
    api.tagged_entities("type(\"CLOUD_APPLICATION\")", tagged)
}

fn inspect(api: &FakeApi, options: InspectOptions) -> (dynatrace_k8s_metrics::Result<()>, String) {
    colored::control::set_override(false);
    let mut out = Vec::new();
    let result = run_inspect(api, &Config::default(), &options, &mut out);
    (result, String::from_utf8(out).unwrap())
}

// ============================================================================
// Dashboard
// ============================================================================

#[test]
fn test_dashboard_created_once() {
    let api = aks_workloads(FakeApi::new(), &[("CA-1", "frontend"), ("CA-2", "cart")]).dashboard(Ok(json!({"id": "abc-123", "name": "K8s Deployments - aks/shop"})));

    let dashboard = prepare_dashboard(&api, &Config::default(), "aks", "shop", true).unwrap();
    assert_eq!(dashboard.tiles.len(), 6);

    let id = publish_dashboard(&api, &dashboard).unwrap();
    assert_eq!(id, "abc-123");

    let posted = api.posted.borrow();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0]["dashboardMetadata"]["name"], "K8s Deployments - aks/shop");
    assert_eq!(posted[0]["tiles"][3]["name"], "cart - CPU");
}

#[test]
fn test_dashboard_charts_configured_metric_keys() {
    let mut config = Config::default();
    config.workload.dashboard_memory_metric = "custom:workload.memory".to_string();
    let api = aks_workloads(FakeApi::new(), &[("CA-1", "frontend")]);

    let dashboard = prepare_dashboard(&api, &config, "aks", "shop", false).unwrap();
    let value = dashboard.to_value().unwrap();
    assert_eq!(value["tiles"][1]["queries"][0]["metric"], "custom:workload.memory");
    assert_eq!(
        value["tiles"][0]["queries"][0]["metric"],
        "builtin:cloud.kubernetes.workload.cpu.usage"
    );
}

#[test]
fn test_dashboard_without_deployments() {
    let api = FakeApi::new();
    assert!(prepare_dashboard(&api, &Config::default(), "aks", "shop", false).is_none());
    assert!(api.posted.borrow().is_empty());
}

#[test]
fn test_dashboard_rejection_is_reported() {
    let api = aks_workloads(FakeApi::new(), &[("CA-1", "frontend")]).dashboard(Err(403));

    let dashboard = prepare_dashboard(&api, &Config::default(), "aks", "shop", false).unwrap();
    let err = publish_dashboard(&api, &dashboard).unwrap_err();
    assert!(matches!(err, AppError::DashboardFailed(_)));
    assert!(err.to_string().contains("403"));
}

#[test]
fn test_dashboard_response_without_id_fails() {
    let api = aks_workloads(FakeApi::new(), &[("CA-1", "frontend")])
        .dashboard(Ok(json!({"name": "nameless"})));

    let dashboard = prepare_dashboard(&api, &Config::default(), "aks", "shop", false).unwrap();
    assert!(matches!(
        publish_dashboard(&api, &dashboard),
        Err(AppError::DashboardFailed(_))
    ));
}

// ============================================================================
// Inspect
// ============================================================================

#[test]
fn test_inspect_lists_and_queries_types() {
    let api = FakeApi::new()
        .entity_types(Ok(json!({"types": ["HOST", "CLOUD_APPLICATION", "KUBERNETES_NODE"]})))
        .entities(&bracketed("aks", "shop"), &[("CA-1", "frontend")])
        .entity_error("type(\"KUBERNETES_NODE\"),tag(\"[Kubernetes]cluster:aks\"),tag(\"[Kubernetes]namespace:shop\")", 400);

    let (result, out) = inspect(
        &api,
        InspectOptions {
            cluster: Some("aks".to_string()),
            namespace: Some("shop".to_string()),
            ..Default::default()
        },
    );

    assert!(result.is_ok());
    assert!(out.contains("API connection successful"));
    assert!(out.contains("Found 3 entity types"));
    assert!(out.contains("Kubernetes/Cloud related entity types"));
    assert!(out.contains("Display Name: frontend"));
    assert!(out.contains("Bad request (400)"));
    // Only common types that exist in the environment are queried
    assert_eq!(api.entity_calls.borrow().len(), 2);
}

#[test]
fn test_inspect_single_type() {
    let api = FakeApi::new()
        .entity_types(Ok(json!({"types": [{"type": "PROCESS_GROUP"}]})))
        .entities("type(\"PROCESS_GROUP\")", &[("PG-1", "jvm")]);

    let (result, out) = inspect(
        &api,
        InspectOptions {
            entity_type: Some("PROCESS_GROUP".to_string()),
            ..Default::default()
        },
    );

    assert!(result.is_ok());
    assert!(out.contains("Testing query for entity type: PROCESS_GROUP"));
    assert!(out.contains("Returned entities: 1"));
    assert!(out.contains("Entity ID: PG-1"));
}

#[test]
fn test_inspect_connection_failure() {
    let api = FakeApi::new().entity_types(Err(401));

    let (result, out) = inspect(&api, InspectOptions::default());

    assert!(matches!(result, Err(AppError::Api(_))));
    assert!(out.contains("API connection failed"));
}

#[test]
fn test_inspect_show_all_apps_summary() {
    let api = FakeApi::new()
        .entity_types(Ok(json!({"types": ["CLOUD_APPLICATION"]})))
        .tagged_entities(
            "type(\"CLOUD_APPLICATION\")",
            vec![
                (
                    "CA-1",
                    "frontend",
                    vec![("[Kubernetes]cluster", "aks"), ("[Kubernetes]namespace", "shop")],
                ),
                ("CA-2", "cart", vec![("[Kubernetes]namespace", "shop")]),
            ],
        );

    let (result, out) = inspect(
        &api,
        InspectOptions {
            show_all_apps: true,
            ..Default::default()
        },
    );

    assert!(result.is_ok());
    assert!(out.contains("Found 2 CLOUD_APPLICATION entities"));
    assert!(out.contains("Cluster tags found:"));
    assert!(out.contains("  - [Kubernetes]cluster=aks"));
    assert!(out.contains("  - [Kubernetes]namespace=shop"));
    // Listing mode skips the type listing
    assert!(!out.contains("All entity types"));
}
