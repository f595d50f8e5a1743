//! Dashboard payload for the Config API.
//!
//! One CPU tile and one memory tile per deployment, plus an optional heap
//! tile, laid out left to right on a 4-wide grid of 304-unit squares.
//! Tiles chart the workload-level keys of [`WorkloadConfig`] since they are
//! filtered by the deployment entity, not its pods.

use crate::config::types::WorkloadConfig;
use crate::platform::api::Entity;
use serde::Serialize;
use serde_json::{Map, Value};

/// Edge length of a tile in grid units
pub const TILE_SIZE: u32 = 304;
/// Tiles per dashboard row
pub const TILES_PER_ROW: u32 = 4;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub dashboard_metadata: DashboardMetadata,
    pub tiles: Vec<Tile>,
}

impl Dashboard {
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetadata {
    pub name: String,
    pub shared: bool,
    pub owner: String,
    pub sharing_details: SharingDetails,
    pub dashboard_filter: DashboardFilter,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharingDetails {
    pub link_shared: bool,
    pub published: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardFilter {
    pub timeframe: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub top: u32,
    pub left: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub name: String,
    pub tile_type: String,
    pub configured: bool,
    pub bounds: Bounds,
    pub tile_filter: Map<String, Value>,
    pub custom_name: String,
    pub queries: Vec<TileQuery>,
    pub visual_config: VisualConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileQuery {
    pub id: String,
    pub metric: String,
    pub space_aggregation: String,
    pub time_aggregation: String,
    pub split_by: Vec<String>,
    pub filter_by: FilterBy,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterBy {
    pub filter_operator: String,
    pub nested_filters: Vec<Value>,
    pub criteria: Vec<Criterion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Criterion {
    pub value: String,
    pub evaluator: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisualConfig {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub global: Map<String, Value>,
    pub rules: Vec<VisualRule>,
    pub axes: Axes,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualRule {
    pub matcher: String,
    pub properties: Map<String, Value>,
    pub series_overrides: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axes {
    pub x_axis: XAxis,
    pub y_axes: Vec<YAxis>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XAxis {
    pub display_name: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YAxis {
    pub display_name: String,
    pub visible: bool,
    pub min: String,
    pub max: String,
    pub position: String,
    pub query_ids: Vec<String>,
}

// ============================================================================
// Layout
// ============================================================================

/// Running position on the dashboard grid
#[derive(Debug, Default)]
pub struct GridCursor {
    placed: u32,
}

impl GridCursor {
    /// Bounds for the next tile, advancing the cursor
    pub fn next_bounds(&mut self) -> Bounds {
        let row = self.placed / TILES_PER_ROW;
        let col = self.placed % TILES_PER_ROW;
        self.placed += 1;
        Bounds {
            top: row * TILE_SIZE,
            left: col * TILE_SIZE,
            width: TILE_SIZE,
            height: TILE_SIZE,
        }
    }
}

/// What a tile charts
struct TileSpec<'a> {
    name: String,
    custom_name: String,
    metric: &'a str,
    axis_label: &'a str,
    split_by: Vec<String>,
    entity_filter: Option<&'a str>,
}

impl TileSpec<'_> {
    fn into_tile(self, bounds: Bounds) -> Tile {
        let criteria = self
            .entity_filter
            .map(|id| Criterion {
                value: id.to_string(),
                evaluator: "IN".to_string(),
            })
            .into_iter()
            .collect();

        let mut color = Map::new();
        color.insert("color".to_string(), Value::String("DEFAULT".to_string()));

        Tile {
            name: self.name,
            tile_type: "DATA_EXPLORER".to_string(),
            configured: true,
            bounds,
            tile_filter: Map::new(),
            custom_name: self.custom_name,
            queries: vec![TileQuery {
                id: "A".to_string(),
                metric: self.metric.to_string(),
                space_aggregation: "AVG".to_string(),
                time_aggregation: "DEFAULT".to_string(),
                split_by: self.split_by,
                filter_by: FilterBy {
                    filter_operator: "AND".to_string(),
                    nested_filters: Vec::new(),
                    criteria,
                },
                enabled: true,
            }],
            visual_config: VisualConfig {
                chart_type: "GRAPH_CHART".to_string(),
                global: Map::new(),
                rules: vec![VisualRule {
                    matcher: "A:".to_string(),
                    properties: color,
                    series_overrides: Vec::new(),
                }],
                axes: Axes {
                    x_axis: XAxis {
                        display_name: String::new(),
                        visible: true,
                    },
                    y_axes: vec![YAxis {
                        display_name: self.axis_label.to_string(),
                        visible: true,
                        min: "AUTO".to_string(),
                        max: "AUTO".to_string(),
                        position: "LEFT".to_string(),
                        query_ids: vec!["A".to_string()],
                    }],
                },
            },
        }
    }
}

/// Build the dashboard for a cluster/namespace's deployments
pub fn build_dashboard(
    workload: &WorkloadConfig,
    cluster: &str,
    namespace: &str,
    deployments: &[Entity],
    include_heap: bool,
) -> Dashboard {
    let mut cursor = GridCursor::default();
    let mut tiles = Vec::with_capacity(deployments.len() * if include_heap { 3 } else { 2 });

    for deployment in deployments {
        let name = deployment.name();
        let id = deployment.entity_id.as_str();

        let mut specs = vec![
            TileSpec {
                name: format!("{} - CPU", name),
                custom_name: format!("{} - CPU Usage", name),
                metric: &workload.dashboard_cpu_metric,
                axis_label: "CPU (millicores)",
                split_by: Vec::new(),
                entity_filter: Some(id),
            },
            TileSpec {
                name: format!("{} - Memory", name),
                custom_name: format!("{} - Memory Usage", name),
                metric: &workload.dashboard_memory_metric,
                axis_label: "Memory (bytes)",
                split_by: Vec::new(),
                entity_filter: Some(id),
            },
        ];
        if include_heap {
            specs.push(TileSpec {
                name: format!("{} - JVM Heap", name),
                custom_name: format!("{} - JVM Heap Memory", name),
                metric: &workload.heap_metric,
                axis_label: "Heap Memory (bytes)",
                split_by: vec!["dt.entity.process_group".to_string()],
                entity_filter: None,
            });
        }

        tiles.extend(specs.into_iter().map(|spec| spec.into_tile(cursor.next_bounds())));
    }

    Dashboard {
        dashboard_metadata: DashboardMetadata {
            name: format!("K8s Deployments - {}/{}", cluster, namespace),
            shared: true,
            owner: "Dynatrace API".to_string(),
            sharing_details: SharingDetails {
                link_shared: true,
                published: false,
            },
            dashboard_filter: DashboardFilter {
                timeframe: "-2h".to_string(),
            },
        },
        tiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployments(n: usize) -> Vec<Entity> {
        (0..n)
            .map(|i| Entity {
                entity_id: format!("CLOUD_APPLICATION-{}", i),
                display_name: format!("svc-{}", i),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_tile_count() {
        let w = WorkloadConfig::default();
        assert_eq!(build_dashboard(&w, "c", "n", &deployments(3), false).tiles.len(), 6);
        assert_eq!(build_dashboard(&w, "c", "n", &deployments(3), true).tiles.len(), 9);
        assert!(build_dashboard(&w, "c", "n", &[], true).tiles.is_empty());
    }

    #[test]
    fn test_grid_layout() {
        let w = WorkloadConfig::default();
        let dashboard = build_dashboard(&w, "c", "n", &deployments(3), false);
        for (i, tile) in dashboard.tiles.iter().enumerate() {
            let i = i as u32;
            assert_eq!(tile.bounds.top, (i / 4) * 304);
            assert_eq!(tile.bounds.left, (i % 4) * 304);
            assert_eq!((tile.bounds.width, tile.bounds.height), (304, 304));
        }
        // Third deployment's CPU tile wraps to the second row
        assert_eq!(dashboard.tiles[4].bounds, Bounds { top: 304, left: 0, width: 304, height: 304 });
    }

    #[test]
    fn test_tiles_filter_by_deployment() {
        let w = WorkloadConfig::default();
        let dashboard = build_dashboard(&w, "aks", "shop", &deployments(1), true);
        assert_eq!(dashboard.dashboard_metadata.name, "K8s Deployments - aks/shop");

        let cpu = &dashboard.tiles[0];
        assert_eq!(cpu.name, "svc-0 - CPU");
        assert_eq!(cpu.queries[0].filter_by.criteria[0].value, "CLOUD_APPLICATION-0");

        let heap = &dashboard.tiles[2];
        assert!(heap.queries[0].filter_by.criteria.is_empty());
        assert_eq!(heap.queries[0].split_by, vec!["dt.entity.process_group"]);
        assert_eq!(cpu.queries[0].metric, "builtin:cloud.kubernetes.workload.cpu.usage");
        assert_eq!(heap.queries[0].metric, "builtin:tech.generic.mem.usedHeap");
    }

    #[test]
    fn test_configured_metric_keys_reach_tiles() {
        let w = WorkloadConfig {
            dashboard_cpu_metric: "custom:workload.cpu".to_string(),
            dashboard_memory_metric: "custom:workload.memory".to_string(),
            heap_metric: "custom:heap".to_string(),
            ..Default::default()
        };
        let dashboard = build_dashboard(&w, "aks", "shop", &deployments(1), true);
        let metrics: Vec<&str> = dashboard
            .tiles
            .iter()
            .map(|tile| tile.queries[0].metric.as_str())
            .collect();
        assert_eq!(metrics, vec!["custom:workload.cpu", "custom:workload.memory", "custom:heap"]);
    }

    #[test]
    fn test_payload_shape() {
        let w = WorkloadConfig::default();
        let value = build_dashboard(&w, "aks", "shop", &deployments(1), false).to_value().unwrap();
        assert_eq!(value["dashboardMetadata"]["dashboardFilter"]["timeframe"], "-2h");
        assert_eq!(value["dashboardMetadata"]["sharingDetails"]["linkShared"], true);
        let tile = &value["tiles"][0];
        assert_eq!(tile["tileType"], "DATA_EXPLORER");
        assert_eq!(tile["visualConfig"]["type"], "GRAPH_CHART");
        assert_eq!(tile["visualConfig"]["axes"]["yAxes"][0]["queryIds"][0], "A");
        assert_eq!(tile["tileFilter"], serde_json::json!({}));
    }
}
