#![forbid(unsafe_code)]

//! Diagram-language parser + typed semantic models.
//!
//! Design goals:
//! - permissive parsing: an unrecognized line degrades the diagram, never the document build
//! - deterministic models: declaration order is preserved everywhere it matters for layout
//! - pure: parsing has no side effects and is repeatable

pub mod detect;
pub mod diagrams;
pub mod error;

pub use detect::{DetectKindError, DiagramKind, detect_kind, strip_comments};
pub use diagrams::flowchart::{
    Direction, FlowEdge, FlowNode, FlowchartModel, NodeShape, parse_flowchart,
};
pub use diagrams::gantt::{GanttModel, GanttSection, GanttTask, TaskStart, parse_gantt};
pub use diagrams::pie::{PieModel, PieSlice, parse_pie};
pub use error::{Error, Result};

/// A parsed diagram block. Closed over the supported kinds so every dispatch site is an
/// exhaustive match; adding a kind is a compile-time exercise.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Diagram {
    Flowchart(FlowchartModel),
    Pie(PieModel),
    Gantt(GanttModel),
}

impl Diagram {
    pub fn kind(&self) -> DiagramKind {
        match self {
            Diagram::Flowchart(_) => DiagramKind::Flowchart,
            Diagram::Pie(_) => DiagramKind::Pie,
            Diagram::Gantt(_) => DiagramKind::Gantt,
        }
    }
}

/// Parses one diagram block into its typed model.
///
/// The only error is an undetectable diagram kind; everything past the header line is handled
/// permissively by the per-kind parsers.
pub fn parse(text: &str) -> Result<Diagram> {
    let kind = detect_kind(text)?;
    let code = strip_comments(text);
    tracing::debug!(%kind, "parsing diagram block");
    Ok(match kind {
        DiagramKind::Flowchart => Diagram::Flowchart(parse_flowchart(&code)),
        DiagramKind::Pie => Diagram::Pie(parse_pie(&code)),
        DiagramKind::Gantt => Diagram::Gantt(parse_gantt(&code)),
    })
}

#[cfg(test)]
mod tests;
