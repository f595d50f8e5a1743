//! Output formatting for deployment metrics.
//!
//! Supports multiple output formats: table, JSON and CSV.

use super::csv::write_csv;
use crate::error::Result;
use crate::workload::report::DeploymentReport;
use crate::workload::types::ExtraMetric;
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};

// ============================================================================
// Output Format
// ============================================================================

/// Output format for deployment metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Fixed-width table (default)
    #[default]
    Table,
    /// JSON document
    Json,
    /// CSV file
    Csv,
}

// ============================================================================
// Formatting Functions
// ============================================================================

/// Format reports to string.
///
/// CSV is rendered in memory here; use [`write_csv`] to stream to a file.
pub fn format_reports_to_string(
    reports: &[DeploymentReport],
    format: OutputFormat,
    extra: Option<ExtraMetric>,
) -> Result<String> {
    let rendered = match format {
        OutputFormat::Table => format_table(reports, extra),
        OutputFormat::Json => format_json(reports)?,
        OutputFormat::Csv => {
            let mut buffer = Vec::new();
            write_csv(&mut buffer, reports, extra)?;
            String::from_utf8_lossy(&buffer).into_owned()
        }
    };
    Ok(rendered)
}

// ============================================================================
// Table Format
// ============================================================================

const NAME_WIDTH: usize = 30;
const PODS_WIDTH: usize = 6;
const CELL_WIDTH: usize = 15;
const RULE_WIDTH: usize = 120;
const RULE_WIDTH_EXTRA: usize = 152;

fn format_table(reports: &[DeploymentReport], extra: Option<ExtraMetric>) -> String {
    let rule = "=".repeat(if extra.is_some() {
        RULE_WIDTH_EXTRA
    } else {
        RULE_WIDTH
    });

    let mut header = format!(
        "{:<nw$} | {:<pw$} | {:<cw$} | {:<cw$} | {:<cw$} | {:<cw$}",
        "Deployment",
        "Pods",
        "CPU Min",
        "CPU Max",
        "Memory Min",
        "Memory Max",
        nw = NAME_WIDTH,
        pw = PODS_WIDTH,
        cw = CELL_WIDTH,
    );
    if let Some(kind) = extra {
        header.push_str(&format!(
            " | {:<cw$} | {:<cw$}",
            format!("{} Min", kind.label()),
            format!("{} Max", kind.label()),
            cw = CELL_WIDTH,
        ));
    }

    let mut output = String::new();
    output.push_str(&format!("\n{}\n", rule.bright_blue()));
    output.push_str(&format!("{}\n", header.bold()));
    output.push_str(&format!("{}\n", rule.bright_blue()));

    for report in reports {
        output.push_str(&format!(
            "{:<nw$} | {:<pw$} | {:<cw$} | {:<cw$} | {:<cw$} | {:<cw$}",
            report.deployment_name,
            report.pod_count,
            report.cpu.min_formatted,
            report.cpu.max_formatted,
            report.memory.min_formatted,
            report.memory.max_formatted,
            nw = NAME_WIDTH,
            pw = PODS_WIDTH,
            cw = CELL_WIDTH,
        ));
        if let (Some(_), Some(stat)) = (extra, &report.extra) {
            output.push_str(&format!(
                " | {:<cw$} | {:<cw$}",
                stat.min_formatted,
                stat.max_formatted,
                cw = CELL_WIDTH,
            ));
        }
        output.push('\n');
    }

    output.push_str(&format!("{}\n", rule.bright_blue()));
    output
}

// ============================================================================
// JSON Format
// ============================================================================

fn format_json(reports: &[DeploymentReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

// ============================================================================
// Tests
// ============================================================================
