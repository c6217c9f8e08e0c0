use crate::config::{MapConfig, TrendConfig};
use crate::encode;
use crate::projection::Mercator;
use crate::scale::format_percent;
use crate::types::{Borough, BoroughWeek, HospitalMark};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub const MAP_FILE: &str = "map.svg";
pub const TREND_FILE: &str = "trend.svg";
pub const INDEX_FILE: &str = "index.html";

// Pixel values rounded to 2 decimals, trailing zeros trimmed, so the SVG
// stays diff-friendly.
fn fmt(value: f64) -> String {
    if value.is_nan() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

fn svg_open(width: f64, height: f64) -> String {
    format!(
        r#"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"#,
        fmt(width),
        fmt(height),
        fmt(width),
        fmt(height)
    )
}

/// One path string per borough: every polygon ring projected point by point
/// and closed, straight segments only.
pub fn borough_path(borough: &Borough, projection: &Mercator) -> String {
    let mut d = String::new();
    for polygon in &borough.geometry.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors().iter()) {
            for (i, coord) in ring.coords().enumerate() {
                let (x, y) = projection.project(coord.x, coord.y);
                let command = if i == 0 { 'M' } else { 'L' };
                let _ = write!(d, "{}{},{}", command, fmt(x), fmt(y));
            }
            d.push('Z');
        }
    }
    d
}

fn polyline_path(points: &[(f64, f64)]) -> String {
    let mut d = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{}{},{}", command, fmt(*x), fmt(*y));
    }
    d
}

pub fn render_map(
    map: &MapConfig,
    boroughs: &[Borough],
    marks: &[HospitalMark],
    projection: &Mercator,
) -> String {
    let mut svg = String::new();
    svg.push_str(&svg_open(map.width, map.height));
    let _ = writeln!(
        svg,
        "\n<g transform=\"translate({},{})\">",
        fmt(map.margin.left),
        fmt(map.margin.top)
    );

    for borough in boroughs {
        let _ = writeln!(
            svg,
            r#"<path class="borough" d="{}" fill="lightgrey" stroke="grey"/>"#,
            borough_path(borough, projection)
        );
    }

    let _ = writeln!(
        svg,
        r#"<text x="{}" y="0" text-anchor="middle" font-size="18" font-weight="bold">NYC Hospitals by Percent of ICU Beds Filled</text>"#,
        fmt(map.inner_width() / 2.0)
    );

    // one circle per hospital reporting in the target week
    for mark in marks {
        let _ = writeln!(
            svg,
            r#"<circle r="{}" opacity="0.7" fill="{}" transform="translate({},{})"/>"#,
            fmt(mark.radius),
            mark.fill,
            fmt(mark.x),
            fmt(mark.y)
        );
    }

    svg.push_str("</g>\n</svg>\n");
    svg
}

fn x_axis(trend: &TrendConfig, rows: &[BoroughWeek]) -> String {
    let x = encode::time_scale(rows, trend);
    let (d0, d1) = x.domain();

    let mut group = format!(
        "<g class=\"axis x-axis\" transform=\"translate(0,{})\">\n",
        fmt(trend.inner_height())
    );
    let _ = writeln!(
        group,
        r#"<path class="domain" d="M0,0H{}" stroke="currentColor" fill="none"/>"#,
        fmt(trend.inner_width())
    );

    // nine evenly spaced dates across the domain
    let count = 9usize;
    for i in 0..count {
        let day = d0 + (d1 - d0) * i as f64 / (count - 1) as f64;
        let label = NaiveDate::from_num_days_from_ce_opt(day.round() as i32)
            .map(|date| date.format("%b %d, %Y").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            group,
            "<g transform=\"translate({},0)\"><line y2=\"6\" stroke=\"currentColor\"/><text y=\"9\" dy=\"0.71em\" text-anchor=\"middle\" font-size=\"10\">{}</text></g>",
            fmt(x.scale(day)),
            label
        );
    }

    group.push_str("</g>\n");
    group
}

fn y_axis(trend: &TrendConfig) -> String {
    let y = encode::percent_scale(trend);

    let mut group = String::from("<g class=\"axis y-axis\">\n");
    let _ = writeln!(
        group,
        r#"<path class="domain" d="M0,0V{}" stroke="currentColor" fill="none"/>"#,
        fmt(trend.inner_height())
    );

    for tick in y.ticks(10) {
        let _ = writeln!(
            group,
            "<g transform=\"translate(0,{})\"><line x2=\"-6\" stroke=\"currentColor\"/><text x=\"-9\" dy=\"0.32em\" text-anchor=\"end\" font-size=\"10\">{}</text></g>",
            fmt(y.scale(tick)),
            format_percent(tick)
        );
    }

    group.push_str("</g>\n");
    group
}

pub fn render_trend(trend: &TrendConfig, rows: &[BoroughWeek]) -> String {
    let series = encode::build_borough_series(rows, trend);

    let mut svg = String::new();
    svg.push_str(&svg_open(trend.width, trend.height));
    let _ = writeln!(
        svg,
        "\n<g transform=\"translate({},{})\">",
        fmt(trend.margin.left),
        fmt(trend.margin.top)
    );

    let _ = writeln!(
        svg,
        r#"<text class="title" x="{}" y="-40" dx="40" text-anchor="middle" font-size="24">Percent of Beds Filled, by Borough</text>"#,
        fmt(trend.inner_width() / 2.0)
    );

    for s in &series {
        let _ = writeln!(
            svg,
            r#"<path class="lines {}" d="{}" stroke="{}" stroke-width="2" fill="none"/>"#,
            s.key,
            polyline_path(&s.points),
            s.color
        );
    }

    for s in &series {
        let _ = writeln!(
            svg,
            r#"<circle class="circles {}" fill="{}" r="4" cx="{}" cy="{}"/>"#,
            s.key,
            s.color,
            fmt(s.endpoint.0),
            fmt(s.endpoint.1)
        );
    }

    for s in &series {
        let _ = writeln!(
            svg,
            r#"<text class="{} labels" x="{}" y="{}" dx="6" dy="4" font-size="12">{}</text>"#,
            s.key,
            fmt(s.endpoint.0),
            fmt(s.endpoint.1),
            s.label
        );
    }

    svg.push_str(&x_axis(trend, rows));
    svg.push_str(&y_axis(trend));

    svg.push_str("</g>\n</svg>\n");
    svg
}

/// Minimal page embedding both charts plus the hover info panel markup the
/// serve API populates.
pub fn render_index() -> String {
    let mut html = String::from(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>NYC ICU Occupancy</title></head>\n<body>\n",
    );
    html.push_str("<div id=\"chart-a\"><img src=\"map.svg\" alt=\"NYC hospital ICU map\"></div>\n");
    html.push_str("<div id=\"info-panel\">\n");
    for id in [
        "hosp-head", "hosp", "totalbeds-head", "totalbeds",
        "occupied-head", "occupied", "percent-head", "percent",
    ] {
        let _ = writeln!(html, "  <p id=\"{}\"></p>", id);
    }
    html.push_str("</div>\n");
    html.push_str("<div id=\"chart-c\"><img src=\"trend.svg\" alt=\"ICU occupancy by borough\"></div>\n");
    html.push_str("</body>\n</html>\n");
    html
}

pub fn write_output(dir: &Path, name: &str, content: &str) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    let path = dir.join(name);
    fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;
    println!("Wrote {:?}", path);
    Ok(())
}
