//! Flowchart parser and semantic model.
//!
//! The grammar is line-oriented and permissive: any line that does not look like an edge or a
//! node declaration is skipped, so a stray statement never fails a whole document build.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    TopDown,
    LeftRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeShape {
    #[default]
    Rectangle,
    Diamond,
    Rounded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    /// Display text. Defaults to the id until a bracketed declaration overrides it.
    pub label: String,
    pub shape: NodeShape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

impl FlowEdge {
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowchartModel {
    pub direction: Direction,
    /// Insertion order is the declaration order and is the deterministic tie-break for layout.
    pub nodes: IndexMap<String, FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowchartModel {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            nodes: IndexMap::new(),
            edges: Vec::new(),
        }
    }

    /// Declaration index of a node id, used as the layout tie-break.
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    /// Declares a node or updates an existing one in place.
    ///
    /// Node identity is the id: a second declaration with a bracketed label replaces the label
    /// and shape but never creates a duplicate. Bare mentions (edge endpoints) leave an already
    /// declared label untouched.
    pub fn declare_node(&mut self, id: &str, label: Option<String>, shape: Option<NodeShape>) {
        if let Some(existing) = self.nodes.get_mut(id) {
            if let Some(label) = label {
                existing.label = label;
            }
            if let Some(shape) = shape {
                existing.shape = shape;
            }
            return;
        }
        let label = label.unwrap_or_else(|| id.to_string());
        self.nodes.insert(
            id.to_string(),
            FlowNode {
                id: id.to_string(),
                label,
                shape: shape.unwrap_or_default(),
            },
        );
    }
}

fn node_decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_.-]+)\s*(?:\[([^\]]*)\]|\{([^}]*)\}|\(([^)]*)\))?\s*$").unwrap()
    })
}

fn edge_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\|([^|]*)\|").unwrap())
}

fn dashed_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"--\s*([^-<>|]+?)\s*-->").unwrap())
}

fn open_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-{2,3}").unwrap())
}

/// Parses a single node declaration like `A`, `A[label]`, `A{label}` or `A(label)`.
fn parse_node_decl(text: &str) -> Option<(String, Option<String>, Option<NodeShape>)> {
    let caps = node_decl_re().captures(text.trim())?;
    let id = caps.get(1)?.as_str().to_string();
    if let Some(m) = caps.get(2) {
        return Some((id, Some(m.as_str().trim().to_string()), Some(NodeShape::Rectangle)));
    }
    if let Some(m) = caps.get(3) {
        return Some((id, Some(m.as_str().trim().to_string()), Some(NodeShape::Diamond)));
    }
    if let Some(m) = caps.get(4) {
        return Some((id, Some(m.as_str().trim().to_string()), Some(NodeShape::Rounded)));
    }
    Some((id, None, None))
}

fn parse_direction(header: &str) -> Direction {
    let dir = header.split_whitespace().nth(1).unwrap_or("");
    match dir.to_ascii_uppercase().as_str() {
        "LR" | "RL" => Direction::LeftRight,
        // `TD`/`TB`, anything else, or no token at all.
        _ => Direction::TopDown,
    }
}

/// Parses flowchart source (comments already stripped) into a [`FlowchartModel`].
///
/// Parsing never fails: unrecognized lines are skipped and edge endpoints that were never
/// declared are declared implicitly.
pub fn parse_flowchart(code: &str) -> FlowchartModel {
    let mut lines = code.lines().map(str::trim).filter(|l| !l.is_empty());

    let direction = match lines.next() {
        Some(header) => parse_direction(header),
        None => Direction::TopDown,
    };
    let mut model = FlowchartModel::new(direction);

    for line in lines {
        parse_statement(line, &mut model);
    }
    model
}

fn parse_statement(line: &str, model: &mut FlowchartModel) {
    // `A -- text --> B` is the long form of `A -->|text| B`.
    let mut line = dashed_label_re().replace_all(line, "-->|${1}|").into_owned();
    // Open links (`A -- B`, `A --- B`) draw the same edge as an arrow.
    if !line.contains("-->") && line.contains("--") {
        line = open_link_re().replace_all(&line, "-->").into_owned();
    }
    let line = line.as_str();
    let segments: Vec<&str> = line.split("-->").collect();
    if segments.len() < 2 {
        // Not an edge; maybe a standalone node declaration.
        match parse_node_decl(line) {
            Some((id, label, shape)) => model.declare_node(&id, label, shape),
            None => tracing::debug!(line, "skipping unrecognized flowchart line"),
        }
        return;
    }

    let Some((mut prev_id, label, shape)) = parse_node_decl(segments[0]) else {
        tracing::debug!(line, "skipping edge line with unparseable source node");
        return;
    };
    model.declare_node(&prev_id, label, shape);

    for segment in &segments[1..] {
        let mut rest = segment.trim();

        // Labeled-arrow form: `A -->|label| B`.
        let mut edge_label = None;
        if let Some(caps) = edge_label_re().captures(rest) {
            let text = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            if !text.is_empty() {
                edge_label = Some(text.to_string());
            }
            rest = rest[caps.get(0).map(|m| m.end()).unwrap_or(0)..].trim_start();
        }

        let Some((to_id, label, shape)) = parse_node_decl(rest) else {
            tracing::debug!(line, segment, "skipping edge segment with unparseable target");
            return;
        };
        model.declare_node(&to_id, label, shape);
        model.edges.push(FlowEdge {
            from: prev_id.clone(),
            to: to_id.clone(),
            label: edge_label,
        });
        prev_id = to_id;
    }
}
