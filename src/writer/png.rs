//! PNG charts: SVG markup rasterized with resvg

use crate::report::ChartSpec;
use crate::writer::svg::{canvas_size, SvgWriter};
use crate::writer::Writer;
use crate::{DataFrame, HeroscopeError, Result};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{fontdb, Options, Tree};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// System fonts, loaded once per process
fn font_database() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            debug!("Loaded {} font faces", db.len());
            Arc::new(db)
        })
        .clone()
}

/// Rasterize SVG markup to PNG bytes at the given size
pub fn svg_to_png(svg: &str, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut options = Options::default();
    options.fontdb = font_database();

    let tree = Tree::from_data(svg.as_bytes(), &options)
        .map_err(|e| HeroscopeError::RenderError(format!("SVG parse failed: {}", e)))?;

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        HeroscopeError::RenderError(format!("Cannot allocate a {}x{} image", width, height))
    })?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| HeroscopeError::RenderError(format!("PNG encoding failed: {}", e)))
}

/// Writes charts as PNG images
#[derive(Debug, Clone, Copy, Default)]
pub struct PngWriter {
    svg: SvgWriter,
}

impl PngWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Writer for PngWriter {
    fn write(&self, chart: &ChartSpec, title: &str, data: &DataFrame) -> Result<Vec<u8>> {
        let markup = self.svg.render(chart, title, data)?;
        let (width, height) = canvas_size(chart.kind);
        svg_to_png(&markup, width, height)
    }

    fn content_type(&self) -> &'static str {
        "image/png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::frame::to_dataframe;
    use crate::reader::{QueryResult, Value};
    use crate::report::{ChartBindings, Palette, Presentation};

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn test_svg_to_png() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="red"/></svg>"#;
        let png = svg_to_png(svg, 20, 10).unwrap();
        assert_eq!(&png[..8], PNG_SIGNATURE);
    }

    #[test]
    fn test_invalid_svg() {
        let result = svg_to_png("<not svg", 10, 10);
        assert!(matches!(result, Err(HeroscopeError::RenderError(_))));
    }

    #[test]
    fn test_png_writer() {
        let result = QueryResult::new(
            vec!["Poder".to_string(), "Cantidad".to_string()],
            vec![
                vec![Value::from("Flight"), Value::Int(7)],
                vec![Value::from("Stamina"), Value::Int(5)],
            ],
        )
        .unwrap();
        let df = to_dataframe(&result).unwrap();
        let chart = ChartSpec::new(
            Presentation::HorizontalBar,
            ChartBindings::new("Poder", "Cantidad"),
            Palette::Magma,
        );

        let writer = PngWriter::new();
        let png = writer.write(&chart, "TOP 2", &df).unwrap();
        assert_eq!(&png[..8], PNG_SIGNATURE);
        assert_eq!(writer.content_type(), "image/png");
    }
}
