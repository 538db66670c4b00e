// src/chart.rs

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use plotters::prelude::*;
use std::{fs, path::Path};
use tracing::info;

use crate::forecast::ForecastSet;
use crate::vintage::{LatestSeries, RevisionPoint};

const SIZE: (u32, u32) = (1000, 450);
const Y_DESC: &str = "Vacancies (thousands)";

type Line = (String, Vec<(NaiveDate, f64)>);

/// Last 12 history points plus every forecast column, each anchored at the
/// last observed value so the lines join up.
pub fn plot_forecast(path: &Path, y: &LatestSeries, fc: &ForecastSet) -> Result<()> {
    let points = y.points();
    let history: Vec<(NaiveDate, f64)> = points
        .iter()
        .skip(points.len().saturating_sub(12))
        .map(|p| (p.date, p.value))
        .collect();
    let anchor = *history.last().context("no history to plot")?;

    let mut lines: Vec<Line> = vec![(y.name.clone(), history)];
    for (name, values) in &fc.columns {
        let mut pts = vec![anchor];
        pts.extend(fc.dates().into_iter().zip(values.iter().copied()));
        lines.push((name.clone(), pts));
    }

    draw_lines(path, "Vacancies forecast (latest vintage baseline)", "Date", &lines)?;
    info!(path = %path.display(), "saved forecasts plot");
    Ok(())
}

/// How the estimate for one observation month moved across releases.
pub fn plot_revision_path(path: &Path, month: NaiveDate, revisions: &[RevisionPoint]) -> Result<()> {
    let pts: Vec<(NaiveDate, f64)> = revisions
        .iter()
        .filter_map(|r| r.value.map(|v| (r.vintage_date, v)))
        .collect();
    let caption = format!("Revision path for observation {}", month.format("%Y-%m"));
    draw_lines(path, &caption, "Vintage (Release date)", &[(caption.clone(), pts)])?;
    info!(path = %path.display(), "saved revision path plot");
    Ok(())
}

fn draw_lines(path: &Path, caption: &str, x_desc: &str, lines: &[Line]) -> Result<()> {
    let all: Vec<(NaiveDate, f64)> = lines.iter().flat_map(|(_, pts)| pts.iter().copied()).collect();
    let origin = all
        .iter()
        .map(|(d, _)| *d)
        .min()
        .with_context(|| format!("nothing to plot for {}", path.display()))?;
    let x_of = |d: NaiveDate| (d - origin).num_days() as f64;

    let x_max = all.iter().map(|(d, _)| x_of(*d)).fold(1.0, f64::max);
    let y_min = all.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let y_max = all.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let pad = ((y_max - y_min) * 0.05).max(1.0);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, (y_min - pad)..(y_max + pad))?;

    let month_label = |x: &f64| {
        origin
            .checked_add_days(Days::new(x.max(0.0).round() as u64))
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(Y_DESC)
        .x_label_formatter(&month_label)
        .draw()?;

    for (i, (name, pts)) in lines.iter().enumerate().filter(|(_, (_, p))| !p.is_empty()) {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(
                pts.iter().map(|(d, v)| (x_of(*d), *v)),
                color.stroke_width(2),
            ))?
            .label(name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(
            pts.iter()
                .map(|(d, v)| Circle::new((x_of(*d), *v), 3, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

pub fn revision_chart_name(month: NaiveDate) -> String {
    format!("revision_path_{}.svg", month.format("%Y-%m"))
}
