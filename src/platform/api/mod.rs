//! Dynatrace API gateway module
//!
//! Provides authenticated access to the Dynatrace Environment API for entity
//! search, metric queries and dashboard creation.
//!
//! # Example
//!
//! ```rust,ignore
//! use dynatrace_k8s_metrics::platform::api::{DynatraceClient, MonitoringApi};
//!
//! let client = DynatraceClient::new(&config.dynatrace)?;
//! let types = client.entity_types()?;
//! for entity_type in types.types {
//!     println!("{}", entity_type.name());
//! }
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use client::{DynatraceClient, MonitoringApi, QueryParams};
pub use error::{ApiError, Result};
pub use types::{
    EntitiesResponse, Entity, EntityTypeInfo, EntityTypesResponse, MetricQueryResponse, Tag,
};
