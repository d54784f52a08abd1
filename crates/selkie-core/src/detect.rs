//! Diagram kind detection.
//!
//! The first non-blank, non-comment line decides which parser handles the block. Detection is
//! case-insensitive and tolerant of leading whitespace; anything it cannot place is the only
//! failure the parser layer ever surfaces.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, thiserror::Error)]
#[error("no diagram kind detected for text: {text}")]
pub struct DetectKindError {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DiagramKind {
    Flowchart,
    Pie,
    Gantt,
}

impl DiagramKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "flowchart",
            DiagramKind::Pie => "pie",
            DiagramKind::Gantt => "gantt",
        }
    }
}

impl std::fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%%.*").unwrap())
}

/// Removes `%%` comments (whole-line and trailing) from every line.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        out.push_str(&comment_re().replace(line, ""));
        out.push('\n');
    }
    out
}

/// Picks the diagram kind from the first meaningful line.
pub fn detect_kind(text: &str) -> Result<DiagramKind, DetectKindError> {
    let cleaned = strip_comments(text);
    let Some(header) = cleaned.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return Err(DetectKindError {
            text: text.to_string(),
        });
    };

    let first = header
        .split_whitespace()
        .next()
        .unwrap_or(header)
        .to_ascii_lowercase();

    match first.as_str() {
        "graph" | "flowchart" => Ok(DiagramKind::Flowchart),
        "pie" => Ok(DiagramKind::Pie),
        "gantt" => Ok(DiagramKind::Gantt),
        _ => Err(DetectKindError {
            text: header.to_string(),
        }),
    }
}
