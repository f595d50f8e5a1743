//! Wire types for the Dynatrace Environment API v2 and Config API v1
//!
//! Only the fields this client reads are modelled; everything else in the
//! payloads is ignored by serde.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Entities
// =============================================================================

/// A monitored object in the platform's topology graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(default)]
    pub entity_id: String,
    #[serde(default)]
    pub display_name: String,
    /// Entity type, only present when requested via `fields`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl Entity {
    /// Display name, or a placeholder for unnamed entities
    pub fn name(&self) -> &str {
        if self.display_name.is_empty() {
            "Unknown"
        } else {
            &self.display_name
        }
    }
}

/// A `key[:value]` tag attached to an entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_representation: Option<String>,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            string_representation: None,
        }
    }

    /// Tag value, falling back to the string representation when the tag is
    /// value-less
    pub fn effective_value(&self) -> &str {
        self.value
            .as_deref()
            .or(self.string_representation.as_deref())
            .unwrap_or("")
    }
}

/// Response of `GET /api/v2/entities`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitiesResponse {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// One entry of `GET /api/v2/entityTypes`
///
/// Older environments answer with bare strings, newer ones with objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntityTypeInfo {
    Name(String),
    Described {
        #[serde(rename = "type")]
        type_name: String,
    },
}

impl EntityTypeInfo {
    pub fn name(&self) -> &str {
        match self {
            EntityTypeInfo::Name(name) => name,
            EntityTypeInfo::Described { type_name } => type_name,
        }
    }
}

/// Response of `GET /api/v2/entityTypes`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityTypesResponse {
    #[serde(default)]
    pub types: Vec<EntityTypeInfo>,
}

// =============================================================================
// Metrics
// =============================================================================

/// Response of `GET /api/v2/metrics/query`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricQueryResponse {
    #[serde(default)]
    pub result: Vec<MetricSeriesCollection>,
}

/// All series returned for one entry of the metric selector
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeriesCollection {
    #[serde(default)]
    pub metric_id: String,
    #[serde(default)]
    pub data: Vec<MetricSeries>,
}

/// A single time series; gaps are reported as `null`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricSeries {
    #[serde(default)]
    pub values: Vec<Option<f64>>,
}

// =============================================================================
// Dashboards
// =============================================================================

/// Response of `POST /api/config/v1/dashboards`
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardCreated {
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
