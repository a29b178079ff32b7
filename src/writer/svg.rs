//! SVG chart construction
//!
//! Every chart kind is drawn on a fixed-size canvas by writing SVG markup
//! directly. The PNG writer rasterizes the same markup.

use crate::reader::frame::{numeric_column, text_column};
use crate::report::{ChartSpec, Presentation};
use crate::writer::html::escape_html;
use crate::writer::layout::{
    distinct, format_tick, nice_range, nice_ticks, pie_slices, pivot, polar, scatter_points,
    split_panels, truncate_label,
};
use crate::writer::{validate_chart_data, Writer};
use crate::{DataFrame, HeroscopeError, Result};
use std::f64::consts::PI;
use std::fmt::Write as _;

const FONT_FAMILY: &str = "DejaVu Sans, Liberation Sans, Arial, sans-serif";
const AXIS_COLOR: &str = "#333333";
const GRID_COLOR: &str = "#dddddd";

/// Canvas size in pixels for a chart kind
pub fn canvas_size(kind: Presentation) -> (u32, u32) {
    match kind {
        Presentation::Bar | Presentation::Table => (1000, 600),
        Presentation::HorizontalBar => (1200, 700),
        Presentation::Pie => (1000, 800),
        Presentation::StackedBar | Presentation::Scatter => (1200, 800),
        Presentation::MultiPanel => (1800, 600),
    }
}

/// Writes charts as SVG documents
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgWriter;

impl SvgWriter {
    pub fn new() -> Self {
        Self
    }

    /// Build the SVG markup for a chart
    pub fn render(&self, chart: &ChartSpec, title: &str, data: &DataFrame) -> Result<String> {
        validate_chart_data(chart, data)?;

        let (width, height) = canvas_size(chart.kind);
        let mut canvas = Canvas::new(width, height);
        canvas.title(title);

        match chart.kind {
            Presentation::Bar => draw_bar(&mut canvas, chart, data)?,
            Presentation::HorizontalBar => draw_horizontal_bar(&mut canvas, chart, data)?,
            Presentation::Pie => draw_pie(&mut canvas, chart, data)?,
            Presentation::StackedBar => draw_stacked_bar(&mut canvas, chart, data)?,
            Presentation::Scatter => draw_scatter(&mut canvas, chart, data)?,
            Presentation::MultiPanel => draw_multi_panel(&mut canvas, chart, data)?,
            Presentation::Table => {
                return Err(HeroscopeError::RenderError(
                    "A table is not a chart".to_string(),
                ))
            }
        }

        Ok(canvas.finish())
    }
}

impl Writer for SvgWriter {
    fn write(&self, chart: &ChartSpec, title: &str, data: &DataFrame) -> Result<Vec<u8>> {
        self.render(chart, title, data).map(String::into_bytes)
    }

    fn content_type(&self) -> &'static str {
        "image/svg+xml"
    }
}

// =============================================================================
// Canvas
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct Area {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Area {
    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

struct Canvas {
    svg: String,
    width: f64,
    height: f64,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">"#,
            w = width,
            h = height,
            font = FONT_FAMILY
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        Self {
            svg,
            width: width as f64,
            height: height as f64,
        }
    }

    fn title(&mut self, title: &str) {
        let _ = writeln!(
            self.svg,
            r#"<text x="{:.1}" y="40" font-size="22" font-weight="bold" text-anchor="middle" fill="{}">{}</text>"#,
            self.width / 2.0,
            AXIS_COLOR,
            escape_html(title)
        );
    }

    fn text(&mut self, x: f64, y: f64, content: &str, size: f64, anchor: &str) {
        let _ = writeln!(
            self.svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="{}" text-anchor="{}" fill="{}">{}</text>"#,
            x,
            y,
            size,
            anchor,
            AXIS_COLOR,
            escape_html(content)
        );
    }

    fn bold_text(&mut self, x: f64, y: f64, content: &str, size: f64, anchor: &str) {
        let _ = writeln!(
            self.svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="{}" font-weight="bold" text-anchor="{}" fill="{}">{}</text>"#,
            x,
            y,
            size,
            anchor,
            AXIS_COLOR,
            escape_html(content)
        );
    }

    fn rotated_text(&mut self, x: f64, y: f64, content: &str, size: f64, anchor: &str, angle: f64) {
        let _ = writeln!(
            self.svg,
            r#"<text x="{x:.1}" y="{y:.1}" font-size="{size}" text-anchor="{anchor}" fill="{color}" transform="rotate({angle} {x:.1} {y:.1})">{content}</text>"#,
            x = x,
            y = y,
            size = size,
            anchor = anchor,
            color = AXIS_COLOR,
            angle = angle,
            content = escape_html(content)
        );
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: &str) {
        let _ = writeln!(
            self.svg,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            x, y, width, height, fill
        );
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, dashed: bool) {
        let dash = if dashed { r#" stroke-dasharray="6 4""# } else { "" };
        let _ = writeln!(
            self.svg,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"{}/>"#,
            x1, y1, x2, y2, stroke, dash
        );
    }

    fn raw(&mut self, markup: &str) {
        self.svg.push_str(markup);
        self.svg.push('\n');
    }

    fn finish(mut self) -> String {
        self.svg.push_str("</svg>\n");
        self.svg
    }
}

// =============================================================================
// Shared pieces
// =============================================================================

fn categories(data: &DataFrame, column: &str) -> Result<Vec<String>> {
    Ok(text_column(data, column)?
        .into_iter()
        .map(|v| v.unwrap_or_default())
        .collect())
}

fn measures(data: &DataFrame, column: &str) -> Result<Vec<f64>> {
    Ok(numeric_column(data, column)?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect())
}

/// Gridlines and tick labels for a vertical value axis; returns the top tick
fn vertical_value_axis(canvas: &mut Canvas, area: Area, max: f64) -> f64 {
    let ticks = nice_ticks(max, 5);
    let top = ticks.last().copied().unwrap_or(1.0);
    for tick in &ticks {
        let y = area.bottom() - tick / top * area.height;
        canvas.line(area.left, y, area.right(), y, GRID_COLOR, false);
        canvas.text(area.left - 8.0, y + 4.0, &format_tick(*tick), 12.0, "end");
    }
    canvas.line(area.left, area.top, area.left, area.bottom(), AXIS_COLOR, false);
    canvas.line(area.left, area.bottom(), area.right(), area.bottom(), AXIS_COLOR, false);
    top
}

fn vertical_bars(canvas: &mut Canvas, area: Area, labels: &[String], values: &[f64], colors: &[&str]) {
    let max = values.iter().copied().fold(0.0, f64::max);
    let top = vertical_value_axis(canvas, area, max);
    let band = area.width / labels.len().max(1) as f64;

    for (i, (label, value)) in labels.iter().zip(values).enumerate() {
        let bar_height = value / top * area.height;
        let x = area.left + band * i as f64 + band * 0.1;
        let color = colors.get(i).copied().unwrap_or("#4c72b0");
        canvas.rect(x, area.bottom() - bar_height, band * 0.8, bar_height, color);
        canvas.text(
            x + band * 0.4,
            area.bottom() - bar_height - 6.0,
            &format_tick(*value),
            11.0,
            "middle",
        );
        canvas.rotated_text(
            x + band * 0.4,
            area.bottom() + 16.0,
            &truncate_label(label),
            12.0,
            "end",
            -45.0,
        );
    }
}

fn axis_titles(canvas: &mut Canvas, area: Area, x_label: &str, y_label: &str, x_offset: f64) {
    canvas.bold_text(
        area.left + area.width / 2.0,
        area.bottom() + x_offset,
        x_label,
        14.0,
        "middle",
    );
    canvas.rotated_text(
        area.left - 60.0,
        area.top + area.height / 2.0,
        y_label,
        14.0,
        "middle",
        -90.0,
    );
}

/// Colour swatch legend; returns the y below the last entry
fn legend(canvas: &mut Canvas, x: f64, y: f64, title: &str, entries: &[(String, &str)]) -> f64 {
    let mut y = y;
    if !title.is_empty() {
        canvas.bold_text(x, y, title, 14.0, "start");
        y += 24.0;
    }
    for (label, color) in entries {
        canvas.rect(x, y - 12.0, 16.0, 16.0, color);
        canvas.text(x + 24.0, y + 1.0, &truncate_label(label), 13.0, "start");
        y += 24.0;
    }
    y
}

// =============================================================================
// Chart kinds
// =============================================================================

fn draw_bar(canvas: &mut Canvas, chart: &ChartSpec, data: &DataFrame) -> Result<()> {
    let labels = categories(data, chart.bindings.x)?;
    let values = measures(data, chart.bindings.y)?;
    let colors = chart.palette(0).colors(labels.len());

    let area = Area {
        left: 90.0,
        top: 80.0,
        width: canvas.width - 130.0,
        height: canvas.height - 80.0 - 170.0,
    };
    vertical_bars(canvas, area, &labels, &values, &colors);
    axis_titles(canvas, area, chart.x_label, chart.y_label, 150.0);
    Ok(())
}

fn draw_horizontal_bar(canvas: &mut Canvas, chart: &ChartSpec, data: &DataFrame) -> Result<()> {
    let labels = categories(data, chart.bindings.x)?;
    let values = measures(data, chart.bindings.y)?;
    let colors = chart.palette(0).colors(labels.len());

    let area = Area {
        left: 220.0,
        top: 80.0,
        width: canvas.width - 280.0,
        height: canvas.height - 80.0 - 90.0,
    };

    let max = values.iter().copied().fold(0.0, f64::max);
    let ticks = nice_ticks(max, 6);
    let top = ticks.last().copied().unwrap_or(1.0);
    for tick in &ticks {
        let x = area.left + tick / top * area.width;
        canvas.line(x, area.top, x, area.bottom(), GRID_COLOR, false);
        canvas.text(x, area.bottom() + 20.0, &format_tick(*tick), 12.0, "middle");
    }
    canvas.line(area.left, area.top, area.left, area.bottom(), AXIS_COLOR, false);
    canvas.line(area.left, area.bottom(), area.right(), area.bottom(), AXIS_COLOR, false);

    let band = area.height / labels.len().max(1) as f64;
    for (i, (label, value)) in labels.iter().zip(&values).enumerate() {
        let y = area.top + band * i as f64 + band * 0.1;
        let bar_width = value / top * area.width;
        canvas.rect(area.left, y, bar_width, band * 0.8, colors[i]);
        canvas.text(area.left - 8.0, y + band * 0.4 + 4.0, &truncate_label(label), 12.0, "end");
        canvas.text(
            area.left + bar_width + 6.0,
            y + band * 0.4 + 4.0,
            &format_tick(*value),
            11.0,
            "start",
        );
    }

    // The category channel runs down the vertical axis
    canvas.bold_text(
        area.left + area.width / 2.0,
        area.bottom() + 50.0,
        chart.y_label,
        14.0,
        "middle",
    );
    canvas.rotated_text(
        30.0,
        area.top + area.height / 2.0,
        chart.x_label,
        14.0,
        "middle",
        -90.0,
    );
    Ok(())
}

fn draw_pie(canvas: &mut Canvas, chart: &ChartSpec, data: &DataFrame) -> Result<()> {
    let labels = categories(data, chart.bindings.x)?;
    let values = measures(data, chart.bindings.y)?;
    let slices = pie_slices(&labels, &values)?;
    let colors = chart.palette(0).colors(slices.len());

    let cx = canvas.width * 0.4;
    let cy = canvas.height / 2.0 + 20.0;
    let radius = canvas.width.min(canvas.height) * 0.33;

    for (slice, color) in slices.iter().zip(&colors) {
        let sweep = slice.end_angle - slice.start_angle;
        if sweep <= 0.0 {
            continue;
        }
        if sweep >= 2.0 * PI - 1e-9 {
            canvas.raw(&format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" stroke="white" stroke-width="2"/>"#,
                cx, cy, radius, color
            ));
        } else {
            let (x1, y1) = polar(cx, cy, radius, slice.start_angle);
            let (x2, y2) = polar(cx, cy, radius, slice.end_angle);
            let large_arc = if sweep > PI { 1 } else { 0 };
            canvas.raw(&format!(
                r#"<path d="M {:.1} {:.1} L {:.1} {:.1} A {:.1} {:.1} 0 {} 1 {:.1} {:.1} Z" fill="{}" stroke="white" stroke-width="2"/>"#,
                cx, cy, x1, y1, radius, radius, large_arc, x2, y2, color
            ));
        }
        let (lx, ly) = polar(cx, cy, radius * 0.65, slice.mid_angle());
        canvas.bold_text(lx, ly + 5.0, &slice.percent_label(), 14.0, "middle");
    }

    let entries: Vec<(String, &str)> = slices
        .iter()
        .zip(&colors)
        .map(|(slice, color)| (format!("{} ({})", slice.label, format_tick(slice.value)), *color))
        .collect();
    let legend_x = canvas.width * 0.78;
    legend(canvas, legend_x, 140.0, chart.x_label, &entries);
    Ok(())
}

fn draw_stacked_bar(canvas: &mut Canvas, chart: &ChartSpec, data: &DataFrame) -> Result<()> {
    let hue = chart.bindings.hue.ok_or_else(|| {
        HeroscopeError::RenderError("Stacked bars need a segment column".to_string())
    })?;
    let outer = text_column(data, chart.bindings.x)?;
    let inner = text_column(data, hue)?;
    let values = numeric_column(data, chart.bindings.y)?;
    let pivot = pivot(&outer, &inner, &values, chart.max_categories)?;
    let colors = chart.palette(0).colors(pivot.segments.len());

    let area = Area {
        left: 90.0,
        top: 80.0,
        width: canvas.width - 330.0,
        height: canvas.height - 80.0 - 170.0,
    };
    let top = vertical_value_axis(canvas, area, pivot.max_total());
    let band = area.width / pivot.categories.len().max(1) as f64;

    for (i, (category, row)) in pivot.categories.iter().zip(&pivot.values).enumerate() {
        let x = area.left + band * i as f64 + band * 0.15;
        let mut base = area.bottom();
        for (value, color) in row.iter().zip(&colors) {
            if *value <= 0.0 {
                continue;
            }
            let segment_height = value / top * area.height;
            canvas.rect(x, base - segment_height, band * 0.7, segment_height, color);
            base -= segment_height;
        }
        canvas.rotated_text(
            x + band * 0.35,
            area.bottom() + 16.0,
            &truncate_label(category),
            12.0,
            "end",
            -45.0,
        );
    }

    axis_titles(canvas, area, chart.x_label, chart.y_label, 150.0);
    let entries: Vec<(String, &str)> = pivot
        .segments
        .iter()
        .cloned()
        .zip(colors.iter().copied())
        .collect();
    legend(canvas, area.right() + 40.0, area.top + 10.0, hue, &entries);
    Ok(())
}

fn marker(canvas: &mut Canvas, shape: usize, x: f64, y: f64, color: &str) {
    let r = 7.0;
    let markup = match shape % 5 {
        0 => format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{}" fill="{}" fill-opacity="0.85"/>"#,
            x, y, r, color
        ),
        1 => format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{}" height="{}" fill="{}" fill-opacity="0.85"/>"#,
            x - r,
            y - r,
            2.0 * r,
            2.0 * r,
            color
        ),
        2 => format!(
            r#"<path d="M {:.1} {:.1} L {:.1} {:.1} L {:.1} {:.1} Z" fill="{}" fill-opacity="0.85"/>"#,
            x,
            y - r,
            x + r,
            y + r,
            x - r,
            y + r,
            color
        ),
        3 => format!(
            r#"<path d="M {:.1} {:.1} L {:.1} {:.1} L {:.1} {:.1} L {:.1} {:.1} Z" fill="{}" fill-opacity="0.85"/>"#,
            x,
            y - r,
            x + r,
            y,
            x,
            y + r,
            x - r,
            y,
            color
        ),
        _ => format!(
            r#"<path d="M {:.1} {:.1} L {:.1} {:.1} M {:.1} {:.1} L {:.1} {:.1}" stroke="{}" stroke-width="3"/>"#,
            x - r,
            y - r,
            x + r,
            y + r,
            x - r,
            y + r,
            x + r,
            y - r,
            color
        ),
    };
    canvas.raw(&markup);
}

fn draw_scatter(canvas: &mut Canvas, chart: &ChartSpec, data: &DataFrame) -> Result<()> {
    let xs = numeric_column(data, chart.bindings.x)?;
    let ys = numeric_column(data, chart.bindings.y)?;
    let hues = chart.bindings.hue.map(|c| text_column(data, c)).transpose()?;
    let styles = chart.bindings.style.map(|c| text_column(data, c)).transpose()?;

    let points = scatter_points(&xs, &ys, hues.as_deref(), styles.as_deref());
    if points.is_empty() {
        return Err(HeroscopeError::RenderError(
            "No rows with both coordinates to plot".to_string(),
        ));
    }

    let area = Area {
        left: 100.0,
        top: 80.0,
        width: canvas.width - 360.0,
        height: canvas.height - 80.0 - 100.0,
    };

    let (min_x, max_x) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
    let (min_y, max_y) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    let x_ticks = nice_range(min_x, max_x, 6);
    let y_ticks = nice_range(min_y, max_y, 6);
    let (x_lo, x_hi) = (x_ticks[0], x_ticks[x_ticks.len() - 1]);
    let (y_lo, y_hi) = (y_ticks[0], y_ticks[y_ticks.len() - 1]);
    let sx = |x: f64| area.left + (x - x_lo) / (x_hi - x_lo) * area.width;
    let sy = |y: f64| area.bottom() - (y - y_lo) / (y_hi - y_lo) * area.height;

    for tick in &x_ticks {
        canvas.line(sx(*tick), area.top, sx(*tick), area.bottom(), GRID_COLOR, true);
        canvas.text(sx(*tick), area.bottom() + 20.0, &format_tick(*tick), 12.0, "middle");
    }
    for tick in &y_ticks {
        canvas.line(area.left, sy(*tick), area.right(), sy(*tick), GRID_COLOR, true);
        canvas.text(area.left - 8.0, sy(*tick) + 4.0, &format_tick(*tick), 12.0, "end");
    }
    canvas.line(area.left, area.top, area.left, area.bottom(), AXIS_COLOR, false);
    canvas.line(area.left, area.bottom(), area.right(), area.bottom(), AXIS_COLOR, false);

    let hue_levels = distinct(points.iter().filter_map(|p| p.hue.as_ref()));
    let style_levels = distinct(points.iter().filter_map(|p| p.style.as_ref()));
    let colors = chart.palette(0).colors(hue_levels.len().max(1));

    for point in &points {
        let color = point
            .hue
            .as_ref()
            .and_then(|h| hue_levels.iter().position(|l| l == h))
            .map(|i| colors[i])
            .unwrap_or(colors[0]);
        let shape = point
            .style
            .as_ref()
            .and_then(|s| style_levels.iter().position(|l| l == s))
            .unwrap_or(0);
        marker(canvas, shape, sx(point.x), sy(point.y), color);
    }

    axis_titles(canvas, area, chart.x_label, chart.y_label, 55.0);

    let legend_x = area.right() + 40.0;
    let mut y = area.top + 10.0;
    if let Some(hue) = chart.bindings.hue {
        let entries: Vec<(String, &str)> = hue_levels
            .iter()
            .cloned()
            .zip(colors.iter().copied())
            .collect();
        y = legend(canvas, legend_x, y, hue, &entries) + 16.0;
    }
    if let Some(style) = chart.bindings.style {
        canvas.bold_text(legend_x, y, style, 14.0, "start");
        y += 24.0;
        for (i, level) in style_levels.iter().enumerate() {
            marker(canvas, i, legend_x + 8.0, y - 4.0, "#555555");
            canvas.text(legend_x + 24.0, y + 1.0, &truncate_label(level), 13.0, "start");
            y += 24.0;
        }
    }
    Ok(())
}

fn draw_multi_panel(canvas: &mut Canvas, chart: &ChartSpec, data: &DataFrame) -> Result<()> {
    let panel_column = chart.bindings.panel.ok_or_else(|| {
        HeroscopeError::RenderError("Multi-panel charts need a panel column".to_string())
    })?;
    let panel_names = text_column(data, panel_column)?;
    let labels = text_column(data, chart.bindings.x)?;
    let values = numeric_column(data, chart.bindings.y)?;
    let panels = split_panels(&panel_names, &labels, &values, chart.max_categories);
    if panels.is_empty() {
        return Err(HeroscopeError::RenderError(
            "No panels to draw".to_string(),
        ));
    }

    let panel_width = (canvas.width - 40.0) / panels.len() as f64;
    for (k, panel) in panels.iter().enumerate() {
        let area = Area {
            left: 40.0 + panel_width * k as f64 + 60.0,
            top: 100.0,
            width: panel_width - 90.0,
            height: canvas.height - 100.0 - 150.0,
        };
        canvas.bold_text(
            area.left + area.width / 2.0,
            area.top - 20.0,
            &panel.name,
            16.0,
            "middle",
        );
        let colors = chart.palette(k).colors(panel.values.len());
        vertical_bars(canvas, area, &panel.labels, &panel.values, &colors);
        if k == 0 {
            canvas.rotated_text(
                area.left - 50.0,
                area.top + area.height / 2.0,
                chart.y_label,
                14.0,
                "middle",
                -90.0,
            );
        }
    }
    Ok(())
}
