//! Pie chart parser and semantic model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PieModel {
    pub title: Option<String>,
    /// Declaration order; values are not required to sum to 100.
    pub slices: Vec<PieSlice>,
}

/// Parses pie source (comments already stripped) into a [`PieModel`].
///
/// Data lines are `"label" : value`. Values that are not positive finite numbers drop the slice;
/// lines that are not data lines at all are skipped.
pub fn parse_pie(code: &str) -> PieModel {
    let mut lines = code.lines().map(str::trim).filter(|l| !l.is_empty());

    let mut model = PieModel::default();
    if let Some(header) = lines.next() {
        // Header may carry `title <text>` after the `pie` keyword.
        if let Some(idx) = header.find("title") {
            let title = header[idx + "title".len()..].trim();
            if !title.is_empty() {
                model.title = Some(title.to_string());
            }
        }
    }

    for line in lines {
        if let Some(title) = super::keyword_arg(line, "title") {
            if !title.is_empty() {
                model.title = Some(title.to_string());
            }
            continue;
        }

        let Some((label, value)) = parse_data_line(line) else {
            tracing::debug!(line, "skipping unrecognized pie line");
            continue;
        };
        if !value.is_finite() || value <= 0.0 {
            tracing::debug!(line, value, "dropping pie slice with non-positive value");
            continue;
        }
        model.slices.push(PieSlice { label, value });
    }
    model
}

fn parse_data_line(line: &str) -> Option<(String, f64)> {
    if let Some((label, rest)) = parse_quoted_string(line) {
        let value = parse_value(rest)?;
        return Some((label, value));
    }
    // Unquoted labels are tolerated: split at the last colon so labels may contain colons.
    let idx = line.rfind(':')?;
    let label = line[..idx].trim().trim_matches(|c| c == '"' || c == '\'');
    if label.is_empty() {
        return None;
    }
    let value: f64 = line[idx + 1..].trim().parse().ok()?;
    Some((label.to_string(), value))
}

fn parse_value(rest: &str) -> Option<f64> {
    let rest = rest.trim_start().strip_prefix(':')?.trim_start();
    let mut num = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() || c == '-' || c == '.' {
            num.push(c);
        } else {
            break;
        }
    }
    num.parse().ok()
}

fn parse_quoted_string(input: &str) -> Option<(String, &str)> {
    let mut chars = input.chars();
    let quote = chars.next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let mut out = String::new();
    let mut escaped = false;
    let mut idx = 1;
    for c in chars {
        idx += c.len_utf8();
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if c == quote {
            return Some((out, &input[idx..]));
        }
        out.push(c);
    }
    None
}
