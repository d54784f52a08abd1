//! SVG emission for layouted diagrams.
//!
//! The renderer writes SVG markup directly into a `String`; the facade crate rasterizes it.
//! Geometry all comes from the layout stage, so emission is a straight transcription.

use crate::model::{
    EdgeLayout, FlowchartLayout, GanttLayout, LayoutedDiagram, NodeLayout, PieLayout, Point,
};
use selkie_core::NodeShape;
use std::fmt::Write;

const FONT_STACK: &str = "Arial, 'Microsoft YaHei', 'SimHei', sans-serif";
const NODE_STROKE: &str = "#4A90E2";
const EDGE_STROKE: &str = "#666666";
const TEXT_FILL: &str = "#333333";

/// Renders any layouted diagram to a standalone SVG document.
pub fn render_svg(diagram: &LayoutedDiagram) -> String {
    let bounds = diagram.bounds();
    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{min_x} {min_y} {w} {h}" width="{w}" height="{h}" font-family="{font}" style="background-color: white;">"#,
        min_x = fmt(bounds.min_x),
        min_y = fmt(bounds.min_y),
        w = fmt(bounds.width()),
        h = fmt(bounds.height()),
        font = FONT_STACK,
    );
    let _ = write!(
        &mut out,
        r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="white"/>"#,
        x = fmt(bounds.min_x),
        y = fmt(bounds.min_y),
        w = fmt(bounds.width()),
        h = fmt(bounds.height()),
    );

    match diagram {
        LayoutedDiagram::Flowchart(l) => render_flowchart(&mut out, l),
        LayoutedDiagram::Pie(l) => render_pie(&mut out, l),
        LayoutedDiagram::Gantt(l) => render_gantt(&mut out, l),
    }

    out.push_str("</svg>\n");
    out
}

fn render_flowchart(out: &mut String, layout: &FlowchartLayout) {
    let _ = write!(
        out,
        r#"<defs><marker id="arrowhead" markerWidth="10" markerHeight="8" refX="9" refY="4" orient="auto"><path d="M0,0 L10,4 L0,8 Z" fill="{stroke}"/></marker></defs>"#,
        stroke = EDGE_STROKE,
    );

    for edge in &layout.edges {
        render_edge(out, edge);
    }
    for node in &layout.nodes {
        render_node(out, node);
    }
}

fn render_node(out: &mut String, node: &NodeLayout) {
    let (x, y, w, h) = (node.x, node.y, node.width, node.height);
    match node.shape {
        NodeShape::Rectangle => {
            let _ = write!(
                out,
                r##"<rect x="{px}" y="{py}" width="{w}" height="{h}" fill="#E8F4F8" stroke="{stroke}" stroke-width="2"/>"##,
                px = fmt(x - w / 2.0),
                py = fmt(y - h / 2.0),
                w = fmt(w),
                h = fmt(h),
                stroke = NODE_STROKE,
            );
        }
        NodeShape::Rounded => {
            let _ = write!(
                out,
                r##"<rect x="{px}" y="{py}" width="{w}" height="{h}" rx="8" fill="#F0F8FF" stroke="{stroke}" stroke-width="2"/>"##,
                px = fmt(x - w / 2.0),
                py = fmt(y - h / 2.0),
                w = fmt(w),
                h = fmt(h),
                stroke = NODE_STROKE,
            );
        }
        NodeShape::Diamond => {
            let _ = write!(
                out,
                r##"<polygon points="{t} {r} {b} {l}" fill="#E3F2FD" stroke="{stroke}" stroke-width="2"/>"##,
                t = fmt_pair(x, y - h / 2.0),
                r = fmt_pair(x + w / 2.0, y),
                b = fmt_pair(x, y + h / 2.0),
                l = fmt_pair(x - w / 2.0, y),
                stroke = NODE_STROKE,
            );
        }
    }

    let label = if node.label.is_empty() {
        &node.id
    } else {
        &node.label
    };
    let _ = write!(
        out,
        r#"<text x="{x}" y="{y}" text-anchor="middle" dominant-baseline="central" fill="{fill}" font-size="16">{text}</text>"#,
        x = fmt(x),
        y = fmt(y),
        fill = TEXT_FILL,
        text = escape_xml(label),
    );
}

fn render_edge(out: &mut String, edge: &EdgeLayout) {
    let points: String = edge
        .points
        .iter()
        .map(|p| fmt_pair(p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = write!(
        out,
        r#"<polyline points="{points}" fill="none" stroke="{stroke}" stroke-width="2" marker-end="url(#arrowhead)"/>"#,
        stroke = EDGE_STROKE,
    );

    if let (Some(label), Some(pos)) = (edge.label.as_deref(), edge.label_pos) {
        render_edge_label(out, label, pos, edge.label_size);
    }
}

fn render_edge_label(out: &mut String, label: &str, pos: Point, size: Option<(f64, f64)>) {
    // A white backing rect keeps the label readable where it crosses other geometry.
    if let Some((w, h)) = size {
        let _ = write!(
            out,
            r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="white" opacity="0.8"/>"#,
            x = fmt(pos.x - w / 2.0 - 2.0),
            y = fmt(pos.y - h / 2.0),
            w = fmt(w + 4.0),
            h = fmt(h),
        );
    }
    let _ = write!(
        out,
        r#"<text x="{x}" y="{y}" text-anchor="middle" dominant-baseline="central" fill="{fill}" font-size="14">{text}</text>"#,
        x = fmt(pos.x),
        y = fmt(pos.y),
        fill = EDGE_STROKE,
        text = escape_xml(label),
    );
}

fn render_pie(out: &mut String, layout: &PieLayout) {
    let _ = write!(
        out,
        r#"<g transform="translate({x},{y})">"#,
        x = fmt(layout.center_x),
        y = fmt(layout.center_y)
    );

    for slice in &layout.slices {
        let r = layout.radius;
        // A single full-circle slice cannot be expressed as one arc segment.
        if (slice.end_angle - slice.start_angle) >= std::f64::consts::TAU - 1e-9 {
            let _ = write!(
                out,
                r#"<circle cx="0" cy="0" r="{r}" fill="{fill}" stroke="white" stroke-width="2"/>"#,
                r = fmt(r),
                fill = slice.fill,
            );
        } else {
            let (x0, y0) = crate::pie::polar_xy(r, slice.start_angle);
            let (x1, y1) = crate::pie::polar_xy(r, slice.end_angle);
            let large = if (slice.end_angle - slice.start_angle) > std::f64::consts::PI {
                1
            } else {
                0
            };
            let _ = write!(
                out,
                r#"<path d="M{x0},{y0}A{r},{r},0,{large},1,{x1},{y1}L0,0Z" fill="{fill}" stroke="white" stroke-width="2"/>"#,
                x0 = fmt(x0),
                y0 = fmt(y0),
                r = fmt(r),
                x1 = fmt(x1),
                y1 = fmt(y1),
                fill = slice.fill,
            );
        }
    }

    for slice in &layout.slices {
        let _ = write!(
            out,
            r#"<text x="{x}" y="{y}" text-anchor="middle" dominant-baseline="central" font-size="14" font-weight="bold" fill="white">{pct}%</text>"#,
            x = fmt(slice.text_x),
            y = fmt(slice.text_y),
            pct = slice.percent,
        );
        let anchor = if slice.label_x < 0.0 { "end" } else { "start" };
        let _ = write!(
            out,
            r#"<text x="{x}" y="{y}" text-anchor="{anchor}" dominant-baseline="central" font-size="16" fill="{fill}">{text}</text>"#,
            x = fmt(slice.label_x),
            y = fmt(slice.label_y),
            fill = TEXT_FILL,
            text = escape_xml(&slice.label),
        );
    }

    if let Some(title) = layout.title.as_deref() {
        let _ = write!(
            out,
            r#"<text x="0" y="{y}" text-anchor="middle" font-size="20" font-weight="bold" fill="{fill}">{text}</text>"#,
            y = fmt(-(layout.radius + 50.0)),
            fill = TEXT_FILL,
            text = escape_xml(title),
        );
    }

    for item in &layout.legend_items {
        let _ = write!(
            out,
            r#"<g transform="translate({x},{y})"><rect width="16" height="16" fill="{fill}" stroke="{stroke}"/><text x="22" y="13" font-size="15" fill="{text_fill}">{text}</text></g>"#,
            x = fmt(layout.legend_x - layout.center_x),
            y = fmt(item.y),
            fill = item.fill,
            stroke = NODE_STROKE,
            text_fill = TEXT_FILL,
            text = escape_xml(&item.label),
        );
    }

    out.push_str("</g>");
}

fn render_gantt(out: &mut String, layout: &GanttLayout) {
    if let Some(title) = layout.title.as_deref() {
        let bounds = layout.bounds;
        let _ = write!(
            out,
            r#"<text x="{x}" y="{y}" text-anchor="middle" font-size="20" font-weight="bold" fill="{fill}">{text}</text>"#,
            x = fmt((bounds.min_x + bounds.max_x) / 2.0),
            y = fmt(bounds.min_y + 28.0),
            fill = TEXT_FILL,
            text = escape_xml(title),
        );
    }

    for section in &layout.sections {
        if section.name.is_empty() {
            continue;
        }
        let _ = write!(
            out,
            r#"<text x="{x}" y="{y}" font-size="14" font-weight="bold" fill="{fill}">{text}</text>"#,
            x = fmt(layout.bounds.min_x + 8.0),
            y = fmt(section.y + 16.0),
            fill = TEXT_FILL,
            text = escape_xml(&section.name),
        );
    }

    for bar in &layout.bars {
        let _ = write!(
            out,
            r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" rx="3" fill="{fill}" opacity="0.8"/>"#,
            x = fmt(bar.x),
            y = fmt(bar.y),
            w = fmt(bar.width),
            h = fmt(bar.height),
            fill = NODE_STROKE,
        );
        let _ = write!(
            out,
            r#"<text x="{x}" y="{y}" text-anchor="end" dominant-baseline="central" font-size="14" fill="{fill}">{text}</text>"#,
            x = fmt(layout.chart_left - 8.0),
            y = fmt(bar.label_y),
            fill = TEXT_FILL,
            text = escape_xml(&bar.label),
        );
    }

    let _ = write!(
        out,
        r#"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="{stroke}" stroke-width="1"/>"#,
        x1 = fmt(layout.chart_left),
        x2 = fmt(layout.bounds.max_x - 20.0),
        y = fmt(layout.axis_y),
        stroke = EDGE_STROKE,
    );
    for tick in &layout.ticks {
        let _ = write!(
            out,
            r#"<line x1="{x}" y1="{y1}" x2="{x}" y2="{y2}" stroke="{stroke}" stroke-width="1"/>"#,
            x = fmt(tick.x),
            y1 = fmt(layout.axis_y),
            y2 = fmt(layout.axis_y + 6.0),
            stroke = EDGE_STROKE,
        );
        let _ = write!(
            out,
            r#"<text x="{x}" y="{y}" text-anchor="middle" font-size="12" fill="{fill}">{text}</text>"#,
            x = fmt(tick.x),
            y = fmt(layout.axis_y + 20.0),
            fill = TEXT_FILL,
            text = escape_xml(&tick.label),
        );
    }
}

fn fmt_pair(x: f64, y: f64) -> String {
    format!("{},{}", fmt(x), fmt(y))
}

/// Compact decimal formatting: at most three fractional digits, no trailing zeros.
pub fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let r = (v * 1000.0).round() / 1000.0;
    let mut s = format!("{r:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" { "0".to_string() } else { s }
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
