//! Output writer abstraction layer for heroscope
//!
//! Table results become HTML pages through [`html::render`]; chart results go
//! through a [`Writer`], which turns a chart spec plus a typed DataFrame
//! into encoded bytes.
//!
//! # Architecture
//!
//! All chart writers implement the `Writer` trait, which provides:
//! - Chart spec + title + data → output bytes
//! - Validation that the data fits the chart's bindings
//! - The HTTP content type of the output
//!
//! # Example
//!
//! ```rust,ignore
//! use heroscope::writer::{Writer, PngWriter};
//!
//! let writer = PngWriter::new();
//! let png = writer.write(&chart, "TOP 10 Poderes", &dataframe)?;
//! ```

use crate::reader::frame::is_numeric;
use crate::report::{ChartSpec, Presentation};
use crate::{DataFrame, HeroscopeError, Result};

pub mod html;
pub mod layout;
pub mod png;
pub mod svg;

pub use png::PngWriter;
pub use svg::SvgWriter;

/// Trait for chart output writers
pub trait Writer {
    /// Render a chart
    ///
    /// # Errors
    ///
    /// Returns `HeroscopeError::RenderError` if:
    /// - The data is empty
    /// - A bound column is missing, or a measure column is not numeric
    /// - The data cannot be shaped for the chart (e.g. a pivot with no segments)
    fn write(&self, chart: &ChartSpec, title: &str, data: &DataFrame) -> Result<Vec<u8>>;

    /// Check that the data can be drawn without rendering it
    fn validate(&self, chart: &ChartSpec, data: &DataFrame) -> Result<()> {
        validate_chart_data(chart, data)
    }

    /// MIME type of the produced bytes
    fn content_type(&self) -> &'static str;
}

/// Shared checks on chart input data
pub fn validate_chart_data(chart: &ChartSpec, data: &DataFrame) -> Result<()> {
    if chart.kind == Presentation::Table {
        return Err(HeroscopeError::RenderError(
            "A table is not a chart".to_string(),
        ));
    }
    if data.height() == 0 {
        return Err(HeroscopeError::RenderError("No data to plot".to_string()));
    }

    for column in chart.bindings.columns() {
        if data.column(column).is_err() {
            return Err(HeroscopeError::RenderError(format!(
                "Chart column '{}' is missing from the data",
                column
            )));
        }
    }

    let mut numeric = vec![chart.bindings.y];
    if chart.kind == Presentation::Scatter {
        numeric.push(chart.bindings.x);
    }
    for column in numeric {
        let dtype = data
            .column(column)
            .map_err(|e| HeroscopeError::RenderError(e.to_string()))?
            .dtype();
        if !is_numeric(dtype) {
            return Err(HeroscopeError::RenderError(format!(
                "Chart column '{}' must be numeric, found {}",
                column, dtype
            )));
        }
    }

    Ok(())
}
