//! Platform module for Dynatrace integration
//!
//! This module provides the API gateway used by the workload resolver, the
//! metric aggregator and the dashboard publisher.

pub mod api;

pub use api::{ApiError, DynatraceClient, MonitoringApi};
