//! Self-contained HTML page: Chart.js from a CDN plus the inlined payload.

use super::payload::{build_payload, payload_json};
use super::EmitError;
use crate::pipeline::ChartReport;
use chrono::{DateTime, FixedOffset};
use std::fmt::Write as _;
use std::path::Path;

const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";
const LUXON: &str = "https://cdn.jsdelivr.net/npm/luxon@3.4.4/build/global/luxon.min.js";
const LUXON_ADAPTER: &str =
    "https://cdn.jsdelivr.net/npm/chartjs-adapter-luxon@1.3.1/dist/chartjs-adapter-luxon.umd.min.js";

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the full page for `report`.
///
/// `updated_at` is shown verbatim in its own offset, so callers pass the
/// exchange-local time. Faulty symbols are listed beneath the chart.
pub fn render_html(
    report: &ChartReport,
    title: &str,
    updated_at: DateTime<FixedOffset>,
) -> Result<String, EmitError> {
    // `</` inside an inline script would close the tag early.
    let data = payload_json(&build_payload(report))?.replace("</", "<\\/");
    let title = escape_html(title);
    let stamp = updated_at.format("%d %b %Y %H:%M (UTC%:z)");

    let mut notes = String::new();
    if report.is_partial() {
        notes.push_str("  <ul class=\"faults\">\n");
        for fault in &report.faults {
            let _ = writeln!(
                notes,
                "    <li>{}: {}</li>",
                escape_html(&fault.symbol),
                escape_html(&fault.error.to_string())
            );
        }
        notes.push_str("  </ul>\n");
    }

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <script src="{CHART_JS}"></script>
  <script src="{LUXON}"></script>
  <script src="{LUXON_ADAPTER}"></script>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; }}
    .chart {{ position: relative; height: 70vh; }}
    .updated {{ color: #555; font-size: 0.9rem; }}
    .faults {{ color: #a00; font-size: 0.85rem; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <p class="updated">Last updated: {stamp}</p>
  <div class="chart"><canvas id="chart"></canvas></div>
{notes}  <script>
    const payload = {data};
    new Chart(document.getElementById("chart"), {{
      type: "line",
      data: {{ datasets: payload.datasets }},
      options: {{
        maintainAspectRatio: false,
        parsing: {{ xAxisKey: "x", yAxisKey: "y" }},
        elements: {{ point: {{ radius: 0 }} }},
        interaction: {{ mode: "nearest", axis: "x", intersect: false }},
        scales: {{
          x: {{ type: "time", time: {{ unit: "month" }}, title: {{ display: true, text: "Date" }} }},
          y: {{
            title: {{ display: true, text: payload.yTitle }},
            ticks: {{ callback: (value) => value.toFixed(2) }}
          }}
        }},
        plugins: {{ legend: {{ position: "bottom" }} }}
      }}
    }});
  </script>
</body>
</html>
"#
    ))
}

/// Write `html` to `path`, creating parent directories.
///
/// The page is staged in a sibling temp file and renamed into place, so a
/// reader never sees a half-written chart.
pub fn write_html(path: &Path, html: &str) -> Result<(), EmitError> {
    let io = |source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io)?;
    }
    let tmp = path.with_extension("html.tmp");
    std::fs::write(&tmp, html).map_err(io)?;
    std::fs::rename(&tmp, path).map_err(io)?;
    Ok(())
}
