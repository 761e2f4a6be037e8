//! Chart.js payload built from a pipeline report.

use super::EmitError;
use crate::pipeline::ChartReport;
use serde::Serialize;

/// Line colours, assigned by rank.
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Decimal places kept in the emitted values.
const VALUE_DECIMALS: i32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    pub datasets: Vec<LineDataset>,
    pub y_title: String,
}

/// One Chart.js line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDataset {
    pub label: String,
    pub border_color: &'static str,
    pub background_color: &'static str,
    pub fill: bool,
    /// Always false: a gap is drawn as a break, not bridged.
    pub span_gaps: bool,
    pub data: Vec<XyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XyPoint {
    pub x: String,
    pub y: Option<f64>,
}

fn round_value(v: f64) -> f64 {
    let scale = 10f64.powi(VALUE_DECIMALS);
    (v * scale).round() / scale
}

/// Build the payload: one line per dataset column in rank order.
pub fn build_payload(report: &ChartReport) -> ChartPayload {
    let axis: Vec<String> = report
        .dataset
        .dates
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    let datasets = report
        .dataset
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let color = PALETTE[i % PALETTE.len()];
            LineDataset {
                label: column.label.clone(),
                border_color: color,
                background_color: color,
                fill: false,
                span_gaps: false,
                data: axis
                    .iter()
                    .zip(&column.values)
                    .map(|(x, y)| XyPoint {
                        x: x.clone(),
                        y: y.map(round_value),
                    })
                    .collect(),
            }
        })
        .collect();

    ChartPayload {
        datasets,
        y_title: format!(
            "Relative Price ({} = 1.0)",
            report.baseline.format("%-d %b %Y")
        ),
    }
}

/// Pretty-printed JSON for inlining into the page.
pub fn payload_json(payload: &ChartPayload) -> Result<String, EmitError> {
    Ok(serde_json::to_string_pretty(payload)?)
}
