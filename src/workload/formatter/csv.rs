//! CSV export with a fixed column order.

use crate::workload::report::DeploymentReport;
use crate::workload::types::ExtraMetric;
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::PathBuf;

/// Column names in output order
pub fn csv_header(extra: Option<ExtraMetric>) -> Vec<String> {
    let mut header: Vec<String> = [
        "cluster",
        "deployment",
        "cpu_usage_min",
        "cpu_usage_max",
        "memory_usage_min",
        "memory_usage_max",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if let Some(kind) = extra {
        header.push(format!("{}_min", kind.column_prefix()));
        header.push(format!("{}_max", kind.column_prefix()));
    }

    header.push("number_of_pods".to_string());
    header
}

/// Write reports as CSV; extra columns stay empty for rows without a value
pub fn write_csv<W: Write>(
    writer: W,
    reports: &[DeploymentReport],
    extra: Option<ExtraMetric>,
) -> Result<(), ::csv::Error> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    csv_writer.write_record(csv_header(extra))?;

    for report in reports {
        let mut row = vec![
            report.cluster.clone(),
            report.deployment_name.clone(),
            report.cpu.min.to_string(),
            report.cpu.max.to_string(),
            report.memory.min.to_string(),
            report.memory.max.to_string(),
        ];
        if extra.is_some() {
            match &report.extra {
                Some(stat) => {
                    row.push(stat.min.to_string());
                    row.push(stat.max.to_string());
                }
                None => row.extend([String::new(), String::new()]),
            }
        }
        row.push(report.pod_count.to_string());
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// `deployment_metrics_<cluster>_<namespace>_<YYYYmmdd_HHMMSS>.csv`
pub fn default_csv_path(cluster: &str, namespace: &str, now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!(
        "deployment_metrics_{}_{}_{}.csv",
        cluster,
        namespace,
        now.format("%Y%m%d_%H%M%S")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::types::{DeploymentMetrics, MetricStat};
    use chrono::TimeZone;

    #[test]
    fn test_header_order() {
        assert_eq!(
            csv_header(None).join(","),
            "cluster,deployment,cpu_usage_min,cpu_usage_max,memory_usage_min,memory_usage_max,number_of_pods"
        );
        assert_eq!(
            csv_header(Some(ExtraMetric::Heap)).join(","),
            "cluster,deployment,cpu_usage_min,cpu_usage_max,memory_usage_min,memory_usage_max,heap_usage_min,heap_usage_max,number_of_pods"
        );
    }

    #[test]
    fn test_write_rows_and_quoting() {
        let metrics = DeploymentMetrics {
            cpu: MetricStat::new(12.5, 40.0),
            memory: MetricStat::new(100.0, 200.0),
            extra: None,
            pod_count: 2,
        };
        let reports = vec![DeploymentReport::new("api, v2", "aks", "shop", &metrics, None)];

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &reports, Some(ExtraMetric::Heap)).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "aks,\"api, v2\",12.5,40,100,200,,,2");
    }

    #[test]
    fn test_default_csv_path() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            default_csv_path("aks", "shop", now),
            PathBuf::from("deployment_metrics_aks_shop_20240309_140507.csv")
        );
    }
}
