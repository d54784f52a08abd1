//! High-level diagram rendering facade.
//!
//! [`Engine::render_diagram`] takes diagram source text and always produces a PNG: parse,
//! layout, and SVG rendering failures are absorbed by substituting a placeholder image that
//! names the failure. Only a failure to rasterize the placeholder itself surfaces as an
//! error, since at that point there is nothing left to fall back to.
//!
//! ```no_run
//! let engine = selkie::Engine::new();
//! let image = engine.render_diagram("graph TD\nA[Start] --> B[End]").unwrap();
//! std::fs::write("diagram.png", &image.png).unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod raster;

pub use raster::{RasterError, RasterOptions};
pub use selkie_core::{Diagram, DiagramKind, detect_kind, parse};
pub use selkie_render::{LayoutOptions, LayoutedDiagram, layout_diagram, render_svg};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] selkie_core::Error),
    #[error(transparent)]
    Render(#[from] selkie_render::Error),
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// A finished raster image with its pixel dimensions.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Stateless rendering pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub layout: LayoutOptions,
    pub raster: RasterOptions,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders diagram source text to PNG, substituting a placeholder image on any
    /// parse, layout, or SVG failure. Returns an error only when even the placeholder
    /// cannot be rasterized.
    pub fn render_diagram(&self, text: &str) -> Result<RenderedImage> {
        match self.try_render(text) {
            Ok(image) => Ok(image),
            Err(err) => {
                tracing::warn!(error = %err, "diagram rendering failed, substituting placeholder");
                self.render_placeholder(&err.to_string())
            }
        }
    }

    /// The strict pipeline: any stage failure is returned to the caller instead of
    /// being converted to a placeholder.
    pub fn try_render(&self, text: &str) -> Result<RenderedImage> {
        let diagram = parse(text)?;
        let layouted = layout_diagram(&diagram, &self.layout)?;
        let svg = render_svg(&layouted);
        let (png, width, height) = raster::svg_to_png(&svg, &self.raster)?;
        Ok(RenderedImage { png, width, height })
    }

    /// Renders the parsed-and-layouted diagram to an SVG string without rasterizing.
    pub fn render_svg(&self, text: &str) -> Result<String> {
        let diagram = parse(text)?;
        let layouted = layout_diagram(&diagram, &self.layout)?;
        Ok(render_svg(&layouted))
    }

    fn render_placeholder(&self, reason: &str) -> Result<RenderedImage> {
        let svg = placeholder_svg(reason);
        let (png, width, height) = raster::svg_to_png(&svg, &self.raster)?;
        Ok(RenderedImage { png, width, height })
    }
}

/// A fixed-size bordered box naming the failure, so documents embedding the output keep
/// their geometry even when a diagram is unrenderable.
fn placeholder_svg(reason: &str) -> String {
    let mut reason = reason.trim().to_string();
    if reason.chars().count() > 80 {
        reason = reason.chars().take(77).collect::<String>() + "...";
    }
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 480 240" width="480" height="240" font-family="Arial, sans-serif">"#,
            r#"<rect width="480" height="240" fill="white"/>"#,
            r##"<rect x="8" y="8" width="464" height="224" fill="#F8F8F8" stroke="#CCCCCC" stroke-width="2" stroke-dasharray="8,4" rx="8"/>"##,
            r##"<text x="240" y="108" text-anchor="middle" font-size="18" fill="#666666">Diagram could not be rendered</text>"##,
            r##"<text x="240" y="140" text-anchor="middle" font-size="13" fill="#999999">{reason}</text>"##,
            "</svg>\n",
        ),
        reason = selkie_render::svg::escape_xml(&reason),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn renders_flowchart_to_png() {
        let engine = Engine::new();
        let image = engine
            .render_diagram("graph TD\nA[Start] --> B{OK?}\nB -->|yes| C[Done]\nB -->|no| A")
            .unwrap();
        assert!(image.png.starts_with(PNG_MAGIC));
        assert!(image.width > 100 && image.height > 100);
    }

    #[test]
    fn renders_pie_and_gantt() {
        let engine = Engine::new();
        for source in [
            "pie title Fruit\n\"Apples\" : 40\n\"Pears\" : 60",
            "gantt\ntitle Plan\nsection Build\nParse : 0, 3\nLayout : 3, 4",
        ] {
            let image = engine.render_diagram(source).unwrap();
            assert!(image.png.starts_with(PNG_MAGIC), "failed for {source:?}");
        }
    }

    #[test]
    fn garbage_input_yields_placeholder_not_error() {
        let engine = Engine::new();
        let image = engine.render_diagram("this is not a diagram at all").unwrap();
        assert!(image.png.starts_with(PNG_MAGIC));
        // Placeholder has a fixed 480x240 viewBox scaled by the DPI factor.
        assert_eq!(image.width, (480.0f32 * raster::DPI_SCALE).ceil() as u32);
    }

    #[test]
    fn empty_flowchart_yields_placeholder() {
        let engine = Engine::new();
        let image = engine.render_diagram("graph TD\n%% only a comment").unwrap();
        assert!(image.png.starts_with(PNG_MAGIC));
    }

    #[test]
    fn placeholder_markup_names_the_failure() {
        let svg = placeholder_svg("boom & <bang>");
        assert!(svg.contains(r##"fill="#F8F8F8""##));
        assert!(svg.contains("boom &amp; &lt;bang&gt;"));
        assert!(svg.contains("Diagram could not be rendered"));
    }

    #[test]
    fn try_render_surfaces_parse_errors() {
        let engine = Engine::new();
        assert!(engine.try_render("nonsense").is_err());
    }

    #[test]
    fn reported_dimensions_match_decoded_png() {
        let engine = Engine::new();
        let image = engine
            .render_diagram("graph LR\nA --> B --> C")
            .unwrap();
        let decoded = image::load_from_memory(&image.png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (image.width, image.height));
    }

    #[test]
    fn rendering_is_deterministic() {
        let engine = Engine::new();
        let source = "graph TD\nA --> B\nA --> C\nB --> D\nC --> D";
        let a = engine.render_diagram(source).unwrap();
        let b = engine.render_diagram(source).unwrap();
        assert_eq!(a.png, b.png);
    }

    #[test]
    fn svg_output_available_without_raster() {
        let engine = Engine::new();
        let svg = engine.render_svg("pie\n\"A\" : 1").unwrap();
        assert!(svg.starts_with("<svg "));
    }
}
