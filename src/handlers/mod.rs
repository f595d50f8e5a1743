// Handler modules
pub mod dashboard;
pub mod inspect;
pub mod metrics;

// Re-export all handler functions
pub use dashboard::{handle_dashboard, prepare_dashboard, publish_dashboard};
pub use inspect::{InspectOptions, handle_inspect, run_inspect};
pub use metrics::{MetricsOptions, collect_reports, handle_metrics};
