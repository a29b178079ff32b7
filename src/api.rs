//! High-level heroscope API.
//!
//! Two-stage API: `prepare()` → `render_*()`.
//!
//! `prepare()` resolves a catalog entry, executes its SQL and relabels the
//! result; the render methods turn that result into an HTML page or a chart.

use crate::reader::frame::to_dataframe;
use crate::reader::{QueryResult, Reader};
use crate::report::{ChartSpec, ReportCatalog, ReportDefinition};
use crate::writer::{html, PngWriter, SvgWriter, Writer};
use crate::{HeroscopeError, Result};
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

// ============================================================================
// Core Types
// ============================================================================

/// Result of `prepare()`, ready for rendering.
#[derive(Debug, Clone)]
pub struct PreparedReport<'a> {
    definition: &'a ReportDefinition,
    title: String,
    result: QueryResult,
}

impl<'a> PreparedReport<'a> {
    /// The catalog entry this report came from.
    pub fn definition(&self) -> &'a ReportDefinition {
        self.definition
    }

    /// Title with parameters substituted.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Rows under the definition's column labels.
    pub fn result(&self) -> &QueryResult {
        &self.result
    }

    pub fn into_result(self) -> QueryResult {
        self.result
    }

    /// Render as a standalone HTML table page.
    pub fn render_html(&self) -> String {
        html::render(self.result.columns(), self.result.rows(), &self.title)
    }

    /// Render the chart variant as PNG bytes.
    pub fn render_png(&self) -> Result<Vec<u8>> {
        self.render_chart(&PngWriter::new())
    }

    /// Render the chart variant as SVG markup.
    pub fn render_svg(&self) -> Result<String> {
        let chart = self.chart()?;
        let data = to_dataframe(&self.result)?;
        SvgWriter::new().render(chart, &self.title, &data)
    }

    /// Render the chart variant with any writer.
    pub fn render_chart(&self, writer: &dyn Writer) -> Result<Vec<u8>> {
        let chart = self.chart()?;
        let data = to_dataframe(&self.result)?;
        let started = Instant::now();
        let bytes = writer.write(chart, &self.title, &data)?;
        debug!(
            report = self.definition.id,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rendered chart"
        );
        Ok(bytes)
    }

    fn chart(&self) -> Result<&'a ChartSpec> {
        self.definition.chart.as_ref().ok_or_else(|| {
            HeroscopeError::NotFound(format!(
                "Report '{}' has no chart variant",
                self.definition.id
            ))
        })
    }
}

// ============================================================================
// High-Level API Functions
// ============================================================================

/// Prepare a report for rendering. Main entry point for the two-stage API.
///
/// Parameters are validated before any SQL runs.
pub fn prepare<'a, R: Reader + ?Sized>(
    reader: &R,
    catalog: &'a ReportCatalog,
    id: &str,
    params: &HashMap<String, String>,
) -> Result<PreparedReport<'a>> {
    let resolved = catalog.resolve(id, params)?;
    let result = reader
        .execute(resolved.sql, &resolved.params)?
        .relabel(resolved.columns)?;

    debug!(report = id, rows = result.len(), "Prepared report");
    Ok(PreparedReport {
        definition: resolved.definition,
        title: resolved.title,
        result,
    })
}

/// Like `prepare()`, but fails early for reports without a chart variant.
pub fn prepare_chart<'a, R: Reader + ?Sized>(
    reader: &R,
    catalog: &'a ReportCatalog,
    id: &str,
    params: &HashMap<String, String>,
) -> Result<PreparedReport<'a>> {
    let definition = catalog.get(id)?;
    if definition.chart.is_none() {
        return Err(HeroscopeError::NotFound(format!(
            "Report '{}' has no chart variant",
            id
        )));
    }
    prepare(reader, catalog, id, params)
}
