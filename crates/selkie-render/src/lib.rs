//! Layout and SVG rendering for parsed diagrams.
//!
//! [`layout_diagram`] turns a [`selkie_core::Diagram`] into a [`LayoutedDiagram`] with
//! concrete coordinates; [`render_svg`] transcribes that into an SVG document. Flowchart
//! placement runs a chain of strategies, falling back until one produces usable
//! coordinates, so layout only fails on genuinely empty models.

#![forbid(unsafe_code)]

pub mod flowchart;
pub mod gantt;
pub mod model;
pub mod pie;
pub mod svg;
pub mod text;

use std::sync::Arc;

use selkie_core::Diagram;

pub use model::LayoutedDiagram;
pub use svg::render_svg;
pub use text::{TextMeasurer, TextMetrics, TextStyle, UnicodeWidthTextMeasurer};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model has nothing to lay out (no nodes, no positive slices, no tasks).
    #[error("invalid model: {message}")]
    InvalidModel { message: String },
}

/// Knobs for the layout stage.
#[derive(Clone)]
pub struct LayoutOptions {
    /// Measures label text to size nodes and reserve label space.
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(UnicodeWidthTextMeasurer::default()),
        }
    }
}

impl std::fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutOptions").finish_non_exhaustive()
    }
}

/// Computes coordinates for every element of `diagram`.
pub fn layout_diagram(diagram: &Diagram, options: &LayoutOptions) -> Result<LayoutedDiagram> {
    let measurer = options.text_measurer.as_ref();
    match diagram {
        Diagram::Flowchart(model) => {
            flowchart::layout_flowchart(model, measurer).map(LayoutedDiagram::Flowchart)
        }
        Diagram::Pie(model) => pie::layout_pie(model, measurer).map(LayoutedDiagram::Pie),
        Diagram::Gantt(model) => gantt::layout_gantt(model, measurer).map(LayoutedDiagram::Gantt),
    }
}
