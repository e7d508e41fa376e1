// src/chart.rs
//
// Presentation boundary: renders the normalized project table as a
// horizontal bar chart. Bars are colored by infrastructure type; projects
// with a signed decision are drawn in outline to distinguish them from
// still-pending ones.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::Path;
use tracing::{info, warn};

use crate::normalize::ProjectRecord;

const BAR_HEIGHT_PX: u32 = 36;
const CHART_WIDTH_PX: u32 = 1280;

/// Render the "days taken so far" chart to `out_path` as a PNG.
///
/// Expects the table already sorted by `time_taken` descending; the longest
/// running project ends up as the top bar. `today` is the same anchor date
/// the normalization ran with, shown in the footer annotation.
pub fn plot_time_taken(
    records: &[ProjectRecord],
    today: NaiveDate,
    out_path: &Path,
) -> Result<()> {
    if records.is_empty() {
        warn!("no records to chart; skipping render");
        return Ok(());
    }

    let n = records.len();
    let height = 160 + BAR_HEIGHT_PX * n as u32;
    let x_max = records
        .iter()
        .map(|r| r.time_taken)
        .max()
        .unwrap_or(1)
        .max(1)
        * 21
        / 20;

    let root = BitMapBackend::new(out_path, (CHART_WIDTH_PX, height)).into_drawing_area();
    root.fill(&WHITE).context("filling chart background")?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Days Taken So Far by An Bord Pleanála on Public Transport Projects",
            ("sans-serif", 24),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(320)
        .build_cartesian_2d(0i64..x_max, (0..n).into_segmented())
        .context("building chart axes")?;

    // Segment s on the y axis holds record n-1-s, so the table's first
    // (longest-running) record is the top bar.
    let names: Vec<String> = records.iter().map(|r| r.project_name.clone()).collect();
    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Days Taken So Far")
        .y_desc("Project")
        .y_labels(n)
        .y_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(s) if *s < n => names[n - 1 - s].clone(),
            _ => String::new(),
        })
        .draw()
        .context("drawing chart mesh")?;

    let categories: Vec<String> = {
        let mut seen = Vec::new();
        for r in records {
            if !seen.contains(&r.infrastructure_type) {
                seen.push(r.infrastructure_type.clone());
            }
        }
        seen
    };

    for (ci, category) in categories.iter().enumerate() {
        let color = Palette99::pick(ci).to_rgba();
        let bars = records
            .iter()
            .enumerate()
            .filter(|(_, r)| &r.infrastructure_type == category)
            .map(|(i, r)| {
                let seg = n - 1 - i;
                // Outline-only bars mark decided cases.
                let style = if r.date_signed.is_some() {
                    color.stroke_width(3)
                } else {
                    color.filled()
                };
                Rectangle::new(
                    [
                        (0, SegmentValue::Exact(seg)),
                        (r.time_taken.max(0), SegmentValue::Exact(seg + 1)),
                    ],
                    style,
                )
            });
        chart
            .draw_series(bars)
            .with_context(|| format!("drawing {} bars", category))?
            .label(category.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .position(SeriesLabelPosition::LowerRight)
        .draw()
        .context("drawing chart legend")?;

    root.draw(&Text::new(
        format!("Accurate as of {}", today),
        (20, height as i32 - 24),
        ("sans-serif", 16),
    ))
    .context("drawing chart annotation")?;

    root.present()
        .with_context(|| format!("writing chart to {:?}", out_path))?;
    info!(path = %out_path.display(), projects = n, "chart rendered");
    Ok(())
}
