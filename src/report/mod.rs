//! Report catalog: named, parameterized analytical queries
//!
//! A [`ReportDefinition`] pairs one SQL statement with everything needed to
//! present its result: the title template, the output column labels, the
//! parameters it accepts and, for chartable reports, a [`ChartSpec`].
//!
//! The catalog is static. [`ReportCatalog::resolve`] binds request
//! parameters against a definition and yields the SQL plus its positional
//! values; nothing from a request is ever spliced into SQL text.
//!
//! # Example
//!
//! ```rust,ignore
//! use heroscope::report::ReportCatalog;
//!
//! let catalog = ReportCatalog::new();
//! let resolved = catalog.resolve("top-powers", &params)?;
//! let rows = reader.execute(resolved.sql, &resolved.params)?;
//! ```

use crate::reader::Value;
use crate::{HeroscopeError, Result};
use serde::Serialize;
use std::collections::HashMap;

pub mod catalog;
pub mod params;

pub use params::{BoundParams, DEFAULT_MAX_TOP};

// =============================================================================
// Presentation
// =============================================================================

/// How a report result is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Presentation {
    Table,
    Bar,
    HorizontalBar,
    Pie,
    StackedBar,
    Scatter,
    MultiPanel,
}

impl Presentation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Presentation::Table => "table",
            Presentation::Bar => "bar",
            Presentation::HorizontalBar => "horizontal-bar",
            Presentation::Pie => "pie",
            Presentation::StackedBar => "stacked-bar",
            Presentation::Scatter => "scatter",
            Presentation::MultiPanel => "multi-panel",
        }
    }
}

/// Named colour sequences used by the chart renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    Viridis,
    Magma,
    Set2,
    Pastel,
    Bright,
    Deep,
    Blues,
    Reds,
    Greens,
}

/// Mapping from result columns to chart channels
///
/// Column names refer to the report's output labels.
///
/// | kind | `x` | `y` | `hue` | `style` | `panel` |
/// |---|---|---|---|---|---|
/// | bar, horizontal-bar, pie | category | measure | | | |
/// | stacked-bar | outer category | measure | stack segment | | |
/// | scatter | numeric | numeric | colour | marker shape | |
/// | multi-panel | category | measure | | | panel |
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBindings {
    pub x: &'static str,
    pub y: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel: Option<&'static str>,
}

impl ChartBindings {
    pub fn new(x: &'static str, y: &'static str) -> Self {
        Self {
            x,
            y,
            hue: None,
            style: None,
            panel: None,
        }
    }

    pub fn with_hue(mut self, hue: &'static str) -> Self {
        self.hue = Some(hue);
        self
    }

    pub fn with_style(mut self, style: &'static str) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_panel(mut self, panel: &'static str) -> Self {
        self.panel = Some(panel);
        self
    }

    /// Every column the chart reads
    pub fn columns(&self) -> Vec<&'static str> {
        [Some(self.x), Some(self.y), self.hue, self.style, self.panel]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Chart variant of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: Presentation,
    pub bindings: ChartBindings,
    /// Axis title for the `x` channel
    pub x_label: &'static str,
    /// Axis title for the `y` channel
    pub y_label: &'static str,
    /// One palette per panel for multi-panel charts, otherwise the first is used
    pub palettes: Vec<Palette>,
    /// Keep at most this many categories (per panel for multi-panel charts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_categories: Option<usize>,
}

impl ChartSpec {
    pub fn new(kind: Presentation, bindings: ChartBindings, palette: Palette) -> Self {
        Self {
            kind,
            x_label: bindings.x,
            y_label: bindings.y,
            bindings,
            palettes: vec![palette],
            max_categories: None,
        }
    }

    pub fn with_labels(mut self, x_label: &'static str, y_label: &'static str) -> Self {
        self.x_label = x_label;
        self.y_label = y_label;
        self
    }

    pub fn with_palettes(mut self, palettes: Vec<Palette>) -> Self {
        self.palettes = palettes;
        self
    }

    pub fn with_max_categories(mut self, max: usize) -> Self {
        self.max_categories = Some(max);
        self
    }

    pub fn palette(&self, index: usize) -> Palette {
        self.palettes
            .get(index)
            .or_else(|| self.palettes.first())
            .copied()
            .unwrap_or(Palette::Deep)
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// Type of a report parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamKind {
    /// Integer limit, clamped to `[1, max_top]`
    Integer { default: i64 },
    /// Required free text
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: ParamKind,
    pub description: &'static str,
}

impl ParamSpec {
    pub fn integer(name: &'static str, default: i64, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Integer { default },
            description,
        }
    }

    pub fn text(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Text,
            description,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self.kind, ParamKind::Text)
    }
}

// =============================================================================
// Report Definition
// =============================================================================

/// A named analytical query plus its presentation metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDefinition {
    /// Stable identifier, used as the route name
    pub id: &'static str,
    /// Title template; `{name}` is replaced by the bound parameter
    pub title: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub sql: &'static str,
    pub params: Vec<ParamSpec>,
    /// Parameter names in `?` placeholder order (a name may repeat)
    #[serde(skip)]
    pub binds: Vec<&'static str>,
    /// Output column label templates, in result order
    pub columns: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
}

impl ReportDefinition {
    /// Presentation kinds this report can be rendered as
    pub fn presentations(&self) -> Vec<Presentation> {
        let mut kinds = vec![Presentation::Table];
        if let Some(chart) = &self.chart {
            kinds.push(chart.kind);
        }
        kinds
    }
}

/// A definition with its parameters bound
#[derive(Debug, Clone)]
pub struct ResolvedReport<'a> {
    pub definition: &'a ReportDefinition,
    pub sql: &'static str,
    /// Values for the SQL placeholders, in order
    pub params: Vec<Value>,
    /// Output column labels with parameters substituted
    pub columns: Vec<String>,
    pub title: String,
}

// =============================================================================
// Catalog
// =============================================================================

/// The fixed set of reports, immutable for the process lifetime
#[derive(Debug, Clone)]
pub struct ReportCatalog {
    reports: Vec<ReportDefinition>,
    max_top: i64,
}

impl Default for ReportCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportCatalog {
    pub fn new() -> Self {
        Self {
            reports: catalog::definitions(),
            max_top: DEFAULT_MAX_TOP,
        }
    }

    /// Set the upper bound applied to integer parameters
    pub fn with_max_top(mut self, max_top: i64) -> Self {
        self.max_top = max_top.max(1);
        self
    }

    pub fn max_top(&self) -> i64 {
        self.max_top
    }

    /// Report ids, in catalog order
    pub fn list(&self) -> Vec<&'static str> {
        self.reports.iter().map(|r| r.id).collect()
    }

    pub fn definitions(&self) -> &[ReportDefinition] {
        &self.reports
    }

    pub fn get(&self, id: &str) -> Result<&ReportDefinition> {
        self.reports
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| HeroscopeError::NotFound(format!("Unknown report '{}'", id)))
    }

    /// Bind request parameters against a report
    ///
    /// # Errors
    ///
    /// - `NotFound` if no report has this id
    /// - `ValidationError` if a required parameter is missing or blank, or
    ///   an integer parameter does not parse
    pub fn resolve(&self, id: &str, raw: &HashMap<String, String>) -> Result<ResolvedReport<'_>> {
        let definition = self.get(id)?;
        let bound = params::bind(&definition.params, raw, self.max_top)?;

        let values = definition
            .binds
            .iter()
            .map(|name| bound.value(name))
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedReport {
            definition,
            sql: definition.sql,
            params: values,
            columns: definition
                .columns
                .iter()
                .map(|c| bound.render_template(c))
                .collect(),
            title: bound.render_template(definition.title),
        })
    }
}
