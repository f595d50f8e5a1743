//! In-memory Dynatrace API used by the integration tests.
//!
//! Answers are keyed on the exact entity and metric selectors the library
//! builds; anything unknown gets an empty but well-formed answer.

#![allow(dead_code)]

use dynatrace_k8s_metrics::platform::api::client::{DASHBOARDS_PATH, ENTITIES_PATH, ENTITY_TYPES_PATH, METRICS_QUERY_PATH};
use dynatrace_k8s_metrics::platform::api::{ApiError, MonitoringApi, QueryParams, Result};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashMap;

type Answer = std::result::Result<Value, u16>;

#[derive(Default)]
pub struct FakeApi {
    entities: HashMap<String, Answer>,
    metrics: HashMap<(String, String), Answer>,
    entity_types: Option<Answer>,
    dashboard: Option<Answer>,
    /// Entity selectors in request order
    pub entity_calls: RefCell<Vec<String>>,
    /// Dashboard payloads received
    pub posted: RefCell<Vec<Value>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `selector` with untagged entities given as `(id, name)`
    pub fn entities(self, selector: &str, entities: &[(&str, &str)]) -> Self {
        let tagged = entities.iter().map(|(id, name)| (*id, *name, Vec::new())).collect();
        self.tagged_entities(selector, tagged)
    }

    /// Answer `selector` with entities given as `(id, name, tags)`
    pub fn tagged_entities(
        mut self,
        selector: &str,
        entities: Vec<(&str, &str, Vec<(&str, &str)>)>,
    ) -> Self {
        let entities: Vec<Value> = entities
            .into_iter()
            .map(|(id, name, tags)| {
                let tags: Vec<Value> = tags
                    .into_iter()
                    .map(|(key, value)| json!({"key": key, "value": value}))
                    .collect();
                json!({"entityId": id, "displayName": name, "tags": tags})
            })
            .collect();
        let answer = json!({"totalCount": entities.len(), "entities": entities});
        self.entities.insert(selector.to_string(), Ok(answer));
        self
    }

    pub fn entities_json(mut self, selector: &str, answer: Value) -> Self {
        self.entities.insert(selector.to_string(), Ok(answer));
        self
    }

    pub fn entity_error(mut self, selector: &str, status: u16) -> Self {
        self.entities.insert(selector.to_string(), Err(status));
        self
    }

    /// Answer `metric_key` for `entity_selector` with a single min and max point
    pub fn metric(mut self, metric_key: &str, entity_selector: &str, min: f64, max: f64) -> Self {
        let answer = json!({"result": [
            {"metricId": format!("{}:min", metric_key), "data": [{"values": [min, null]}]},
            {"metricId": format!("{}:max", metric_key), "data": [{"values": [null, max]}]},
        ]});
        self.metrics
            .insert((metric_selector(metric_key), entity_selector.to_string()), Ok(answer));
        self
    }

    pub fn metric_error(mut self, metric_key: &str, entity_selector: &str, status: u16) -> Self {
        self.metrics
            .insert((metric_selector(metric_key), entity_selector.to_string()), Err(status));
        self
    }

    pub fn entity_types(mut self, answer: Answer) -> Self {
        self.entity_types = Some(answer);
        self
    }

    pub fn dashboard(mut self, answer: Answer) -> Self {
        self.dashboard = Some(answer);
        self
    }

    pub fn was_queried(&self, selector: &str) -> bool {
        self.entity_calls.borrow().iter().any(|s| s == selector)
    }
}

fn metric_selector(key: &str) -> String {
    format!("{key}:min,{key}:max")
}

fn param<'q>(query: &'q QueryParams<'_>, name: &str) -> &'q str {
    query
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

fn respond(answer: Option<&Answer>, empty: Value) -> Result<Value> {
    match answer {
        Some(Ok(value)) => Ok(value.clone()),
        Some(Err(status)) => Err(ApiError::Http {
            status: *status,
            body: format!("{{\"error\":{{\"code\":{}}}}}", status),
        }),
        None => Ok(empty),
    }
}

impl MonitoringApi for FakeApi {
    fn get(&self, path: &str, query: &QueryParams<'_>) -> Result<Value> {
        match path {
            ENTITIES_PATH => {
                let selector = param(query, "entitySelector").to_string();
                self.entity_calls.borrow_mut().push(selector.clone());
                respond(self.entities.get(&selector), json!({"totalCount": 0, "entities": []}))
            }
            METRICS_QUERY_PATH => {
                let key = (
                    param(query, "metricSelector").to_string(),
                    param(query, "entitySelector").to_string(),
                );
                respond(self.metrics.get(&key), json!({"result": []}))
            }
            ENTITY_TYPES_PATH => respond(self.entity_types.as_ref(), json!({"types": []})),
            other => Err(ApiError::Http {
                status: 404,
                body: format!("no route for {}", other),
            }),
        }
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value> {
        assert_eq!(path, DASHBOARDS_PATH);
        self.posted.borrow_mut().push(body.clone());
        respond(self.dashboard.as_ref(), json!({}))
    }
}
