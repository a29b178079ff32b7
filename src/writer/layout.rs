//! Chart geometry and data shaping, independent of any output format

use crate::report::Palette;
use crate::{HeroscopeError, Result};
use std::f64::consts::PI;

/// Category labels longer than this are cut and end in an ellipsis
pub const MAX_LABEL_CHARS: usize = 18;

/// Maximum number of points drawn by a scatter chart
pub const MAX_SCATTER_POINTS: usize = 100;

// =============================================================================
// Labels and ticks
// =============================================================================

pub fn truncate_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        return label.to_string();
    }
    let mut out: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
    out.push('…');
    out
}

fn nice_step(span: f64, target: usize) -> f64 {
    let raw = span / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

/// Round tick positions from zero up to at least `max`
pub fn nice_ticks(max: f64, target: usize) -> Vec<f64> {
    if !max.is_finite() || max <= 0.0 {
        return vec![0.0, 1.0];
    }
    let step = nice_step(max, target);
    let count = (max / step).ceil() as usize;
    (0..=count).map(|i| i as f64 * step).collect()
}

/// Round tick positions covering `[min, max]`
pub fn nice_range(min: f64, max: f64, target: usize) -> Vec<f64> {
    let (min, max) = if (max - min).abs() < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    };
    let step = nice_step(max - min, target);
    let start = (min / step).floor() as i64;
    let end = (max / step).ceil() as i64;
    (start..=end).map(|i| i as f64 * step).collect()
}

pub fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

// =============================================================================
// Pie
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Percentage of the total, unrounded
    pub percent: f64,
    /// Angles in radians, clockwise from twelve o'clock
    pub start_angle: f64,
    pub end_angle: f64,
}

impl PieSlice {
    /// Percentage with one decimal place, e.g. `66.7%`
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent)
    }

    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

/// Split a full circle into slices in input order
pub fn pie_slices(labels: &[String], values: &[f64]) -> Result<Vec<PieSlice>> {
    if values.iter().any(|v| *v < 0.0 || !v.is_finite()) {
        return Err(HeroscopeError::RenderError(
            "Pie values must be finite and non-negative".to_string(),
        ));
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Err(HeroscopeError::RenderError(
            "Pie chart needs a positive total".to_string(),
        ));
    }

    let mut angle = 0.0;
    Ok(labels
        .iter()
        .zip(values)
        .map(|(label, value)| {
            let sweep = value / total * 2.0 * PI;
            let slice = PieSlice {
                label: label.clone(),
                value: *value,
                percent: value / total * 100.0,
                start_angle: angle,
                end_angle: angle + sweep,
            };
            angle += sweep;
            slice
        })
        .collect())
}

/// Point on a circle for an angle measured clockwise from twelve o'clock
pub fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.sin(), cy - radius * angle.cos())
}

// =============================================================================
// Stacked bars
// =============================================================================

/// Long-format rows regrouped into outer categories and stacked segments
#[derive(Debug, Clone, PartialEq)]
pub struct StackedPivot {
    /// Outer categories, highest total first
    pub categories: Vec<String>,
    /// Segment names, sorted
    pub segments: Vec<String>,
    /// `values[category][segment]`
    pub values: Vec<Vec<f64>>,
}

impl StackedPivot {
    pub fn totals(&self) -> Vec<f64> {
        self.values.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn max_total(&self) -> f64 {
        self.totals().into_iter().fold(0.0, f64::max)
    }
}

/// Pivot `(outer, inner, value)` rows, summing duplicates
///
/// Rows with a NULL outer or inner label are skipped; NULL values count as
/// zero. Categories are ranked by total, descending, ties keeping first
/// appearance, and only the first `limit` are kept.
pub fn pivot(
    outer: &[Option<String>],
    inner: &[Option<String>],
    values: &[Option<f64>],
    limit: Option<usize>,
) -> Result<StackedPivot> {
    let mut categories: Vec<String> = Vec::new();
    let mut segments: Vec<String> = Vec::new();
    let mut cells: Vec<(usize, String, f64)> = Vec::new();

    for ((o, i), v) in outer.iter().zip(inner).zip(values) {
        let (Some(o), Some(i)) = (o, i) else {
            continue;
        };
        let idx = match categories.iter().position(|c| c == o) {
            Some(idx) => idx,
            None => {
                categories.push(o.clone());
                categories.len() - 1
            }
        };
        if !segments.contains(i) {
            segments.push(i.clone());
        }
        cells.push((idx, i.clone(), v.unwrap_or(0.0)));
    }

    if segments.is_empty() {
        return Err(HeroscopeError::RenderError(
            "Pivot produced no stack segments".to_string(),
        ));
    }
    segments.sort();

    let mut grid = vec![vec![0.0; segments.len()]; categories.len()];
    for (cat, segment, value) in cells {
        if let Some(seg) = segments.iter().position(|s| *s == segment) {
            grid[cat][seg] += value;
        }
    }

    let mut order: Vec<usize> = (0..categories.len()).collect();
    let totals: Vec<f64> = grid.iter().map(|row| row.iter().sum()).collect();
    order.sort_by(|a, b| totals[*b].total_cmp(&totals[*a]));
    if let Some(limit) = limit {
        order.truncate(limit);
    }

    Ok(StackedPivot {
        categories: order.iter().map(|i| categories[*i].clone()).collect(),
        values: order.iter().map(|i| grid[*i].clone()).collect(),
        segments,
    })
}

// =============================================================================
// Panels
// =============================================================================

/// One sub-chart of a multi-panel chart
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Group rows into panels (in order of first appearance)
///
/// Each panel keeps its `limit` largest values, highest first.
pub fn split_panels(
    panel: &[Option<String>],
    labels: &[Option<String>],
    values: &[Option<f64>],
    limit: Option<usize>,
) -> Vec<Panel> {
    let mut panels: Vec<Panel> = Vec::new();
    for ((p, l), v) in panel.iter().zip(labels).zip(values) {
        let (Some(p), Some(l)) = (p, l) else {
            continue;
        };
        let target = match panels.iter().position(|existing| existing.name == *p) {
            Some(idx) => idx,
            None => {
                panels.push(Panel {
                    name: p.clone(),
                    labels: Vec::new(),
                    values: Vec::new(),
                });
                panels.len() - 1
            }
        };
        panels[target].labels.push(l.clone());
        panels[target].values.push(v.unwrap_or(0.0));
    }

    for panel in &mut panels {
        let mut order: Vec<usize> = (0..panel.values.len()).collect();
        order.sort_by(|a, b| panel.values[*b].total_cmp(&panel.values[*a]));
        if let Some(limit) = limit {
            order.truncate(limit);
        }
        panel.labels = order.iter().map(|i| panel.labels[*i].clone()).collect();
        panel.values = order.iter().map(|i| panel.values[*i]).collect();
    }
    panels
}

// =============================================================================
// Scatter
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub hue: Option<String>,
    pub style: Option<String>,
}

/// Points with both coordinates present, capped at [`MAX_SCATTER_POINTS`]
pub fn scatter_points(
    xs: &[Option<f64>],
    ys: &[Option<f64>],
    hues: Option<&[Option<String>]>,
    styles: Option<&[Option<String>]>,
) -> Vec<ScatterPoint> {
    xs.iter()
        .zip(ys)
        .enumerate()
        .filter_map(|(i, (x, y))| {
            Some(ScatterPoint {
                x: (*x)?,
                y: (*y)?,
                hue: hues.and_then(|h| h.get(i).cloned().flatten()),
                style: styles.and_then(|s| s.get(i).cloned().flatten()),
            })
        })
        .take(MAX_SCATTER_POINTS)
        .collect()
}

/// Distinct values in order of first appearance
pub fn distinct<'a>(values: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}

// =============================================================================
// Palettes
// =============================================================================

impl Palette {
    fn anchors(&self) -> &'static [&'static str] {
        match self {
            Palette::Viridis => &[
                "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779",
                "#6ece58", "#b5de2b", "#fde725",
            ],
            Palette::Magma => &[
                "#180f3d", "#440f76", "#721f81", "#9e2f7f", "#cd4071", "#f1605d", "#fd9668",
                "#feca8d",
            ],
            Palette::Set2 => &[
                "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494",
                "#b3b3b3",
            ],
            Palette::Pastel => &[
                "#a1c9f4", "#ffb482", "#8de5a1", "#ff9f9b", "#d0bbff", "#debb9b", "#fab0e4",
                "#cfcfcf", "#fffea3", "#b9f2f0",
            ],
            Palette::Bright => &[
                "#023eff", "#ff7c00", "#1ac938", "#e8000b", "#8b2be2", "#9f4800", "#f14cc1",
                "#a3a3a3", "#ffc400", "#00d7ff",
            ],
            Palette::Deep => &[
                "#4c72b0", "#dd8452", "#55a868", "#c44e52", "#8172b3", "#937860", "#da8bc3",
                "#8c8c8c", "#ccb974", "#64b5cd",
            ],
            Palette::Blues => &["#08306b", "#08519c", "#2171b5", "#4292c6", "#6baed6", "#9ecae1"],
            Palette::Reds => &["#67000d", "#a50f15", "#cb181d", "#ef3b2c", "#fb6a4a", "#fc9272"],
            Palette::Greens => &["#00441b", "#006d2c", "#238b45", "#41ab5d", "#74c476", "#a1d99b"],
        }
    }

    fn is_sequential(&self) -> bool {
        matches!(
            self,
            Palette::Viridis | Palette::Magma | Palette::Blues | Palette::Reds | Palette::Greens
        )
    }

    /// `n` colours: sampled evenly from sequential palettes, cycled otherwise
    pub fn colors(&self, n: usize) -> Vec<&'static str> {
        let anchors = self.anchors();
        if !self.is_sequential() {
            return (0..n).map(|i| anchors[i % anchors.len()]).collect();
        }
        let last = anchors.len() - 1;
        (0..n)
            .map(|i| {
                if n == 1 {
                    anchors[last / 2]
                } else {
                    anchors[(i * last + (n - 1) / 2) / (n - 1)]
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Flight"), "Flight");
        assert_eq!(truncate_label("Accelerated Healing"), "Accelerated Heali…");
        assert_eq!(truncate_label("Accelerated Healing").chars().count(), 18);
        // Counted in characters, not bytes
        assert_eq!(truncate_label("Género Alineación"), "Género Alineación");
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(7.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(nice_ticks(100.0, 5), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        assert_eq!(nice_ticks(0.0, 5), vec![0.0, 1.0]);
    }

    #[test]
    fn test_nice_range_covers_data() {
        let ticks = nice_range(54.0, 288.0, 5);
        assert!(ticks[0] <= 54.0);
        assert!(*ticks.last().unwrap() >= 288.0);

        let flat = nice_range(10.0, 10.0, 5);
        assert!(flat[0] < 10.0 && *flat.last().unwrap() > 10.0);
    }

    #[test]
    fn test_pie_percentages_sum_to_hundred() {
        let labels = vec!["Good".to_string(), "Bad".to_string(), "Neutral".to_string()];
        let slices = pie_slices(&labels, &[8.0, 2.0, 2.0]).unwrap();

        let labelled: Vec<String> = slices.iter().map(PieSlice::percent_label).collect();
        assert_eq!(labelled, vec!["66.7%", "16.7%", "16.7%"]);

        let rounded_sum: f64 = labelled
            .iter()
            .map(|l| l.trim_end_matches('%').parse::<f64>().unwrap())
            .sum();
        assert!((rounded_sum - 100.0).abs() <= 0.05 * slices.len() as f64);

        assert_eq!(slices[0].start_angle, 0.0);
        assert!((slices[2].end_angle - 2.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn test_pie_rejects_zero_total() {
        let labels = vec!["a".to_string()];
        assert!(matches!(
            pie_slices(&labels, &[0.0]),
            Err(HeroscopeError::RenderError(_))
        ));
    }

    #[test]
    fn test_pivot_ranks_categories_by_total() {
        let outer = strings(&["DC", "Marvel", "Marvel", "DC", "Image"]);
        let inner = strings(&["Good", "Good", "Bad", "Bad", "Good"]);
        let values = vec![Some(3.0), Some(4.0), Some(2.0), Some(1.0), Some(1.0)];

        let pivot = pivot(&outer, &inner, &values, Some(2)).unwrap();
        assert_eq!(pivot.categories, vec!["Marvel", "DC"]);
        assert_eq!(pivot.segments, vec!["Bad", "Good"]);
        assert_eq!(pivot.values, vec![vec![2.0, 4.0], vec![1.0, 3.0]]);
        assert_eq!(pivot.max_total(), 6.0);
    }

    #[test]
    fn test_pivot_without_segments_fails() {
        let outer = strings(&["DC"]);
        let inner = vec![None];
        let result = pivot(&outer, &inner, &[Some(1.0)], None);
        assert!(matches!(result, Err(HeroscopeError::RenderError(_))));
    }

    #[test]
    fn test_split_panels_limits_each_panel() {
        let panel = strings(&["Ojos", "Ojos", "Ojos", "Piel"]);
        let labels = strings(&["Blue", "Brown", "Green", "Green"]);
        let values = vec![Some(3.0), Some(5.0), Some(1.0), Some(2.0)];

        let panels = split_panels(&panel, &labels, &values, Some(2));
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].name, "Ojos");
        assert_eq!(panels[0].labels, vec!["Brown", "Blue"]);
        assert_eq!(panels[1].values, vec![2.0]);
    }

    #[test]
    fn test_scatter_points_skip_nulls_and_cap() {
        let xs: Vec<Option<f64>> = (0..150).map(|i| Some(i as f64)).collect();
        let mut ys: Vec<Option<f64>> = (0..150).map(|i| Some(i as f64)).collect();
        ys[0] = None;

        let points = scatter_points(&xs, &ys, None, None);
        assert_eq!(points.len(), MAX_SCATTER_POINTS);
        assert_eq!(points[0].x, 1.0);
    }

    #[test]
    fn test_palette_sampling() {
        assert_eq!(Palette::Set2.colors(10)[8], "#66c2a5");
        let blues = Palette::Blues.colors(3);
        assert_eq!(blues, vec!["#08306b", "#4292c6", "#9ecae1"]);
        assert_eq!(Palette::Magma.colors(1).len(), 1);
        assert!(Palette::Viridis.colors(0).is_empty());
    }
}
