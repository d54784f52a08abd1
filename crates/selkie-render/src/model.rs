//! Layouted (positioned) diagram models consumed by the SVG renderer.

use selkie_core::{Direction, NodeShape};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub const EMPTY: Self = Self {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).max(1.0)
    }

    pub fn height(&self) -> f64 {
        (self.max_y - self.min_y).max(1.0)
    }

    pub fn expand_point(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn expand_rect(&mut self, cx: f64, cy: f64, w: f64, h: f64) {
        self.expand_point(cx - w / 2.0, cy - h / 2.0);
        self.expand_point(cx + w / 2.0, cy + h / 2.0);
    }

    pub fn pad(&mut self, margin: f64) {
        self.min_x -= margin;
        self.min_y -= margin;
        self.max_x += margin;
        self.max_y += margin;
    }
}

/// A positioned flowchart node. `x`/`y` is the shape center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLayout {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A routed flowchart edge: a polyline from the source shape boundary to the target shape
/// boundary, with the arrowhead drawn at the last point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLayout {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub points: Vec<Point>,
    pub label_pos: Option<Point>,
    pub label_size: Option<(f64, f64)>,
    pub self_loop: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowchartLayout {
    pub direction: Direction,
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSliceLayout {
    pub label: String,
    pub value: f64,
    /// `value / sum(values)`; slice fractions always sum to 1 within tolerance.
    pub fraction: f64,
    pub percent: i64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub fill: String,
    /// Percent text anchor inside the slice.
    pub text_x: f64,
    pub text_y: f64,
    /// Label text anchor outside the slice.
    pub label_x: f64,
    pub label_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieLegendItemLayout {
    pub label: String,
    pub fill: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieLayout {
    pub title: Option<String>,
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub slices: Vec<PieSliceLayout>,
    pub legend_x: f64,
    pub legend_items: Vec<PieLegendItemLayout>,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttBarLayout {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Row baseline for the task label in the left column.
    pub label_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttSectionLayout {
    pub name: String,
    pub y: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttTickLayout {
    pub x: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttLayout {
    pub title: Option<String>,
    pub bars: Vec<GanttBarLayout>,
    pub sections: Vec<GanttSectionLayout>,
    pub ticks: Vec<GanttTickLayout>,
    /// Left edge of the bar area (task labels live to the left of it).
    pub chart_left: f64,
    pub axis_y: f64,
    pub bounds: Bounds,
}

/// A positioned diagram, ready for SVG emission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayoutedDiagram {
    Flowchart(FlowchartLayout),
    Pie(PieLayout),
    Gantt(GanttLayout),
}

impl LayoutedDiagram {
    pub fn bounds(&self) -> Bounds {
        match self {
            LayoutedDiagram::Flowchart(l) => l.bounds,
            LayoutedDiagram::Pie(l) => l.bounds,
            LayoutedDiagram::Gantt(l) => l.bounds,
        }
    }
}
