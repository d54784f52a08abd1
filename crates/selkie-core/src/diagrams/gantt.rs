//! Gantt chart parser and semantic model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TaskStart {
    /// Plain numeric offset, in days from the chart origin.
    Offset(f64),
    /// ISO calendar date (`YYYY-MM-DD`).
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttTask {
    pub label: String,
    pub start: TaskStart,
    /// Duration in days.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GanttSection {
    /// Empty for the default section that collects tasks declared before any `section` line.
    pub name: String,
    pub tasks: Vec<GanttTask>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GanttModel {
    pub title: Option<String>,
    pub sections: Vec<GanttSection>,
}

impl GanttModel {
    pub fn tasks(&self) -> impl Iterator<Item = &GanttTask> {
        self.sections.iter().flat_map(|s| s.tasks.iter())
    }

    pub fn task_count(&self) -> usize {
        self.sections.iter().map(|s| s.tasks.len()).sum()
    }
}

/// Parses gantt source (comments already stripped) into a [`GanttModel`].
///
/// `section <name>` opens a section; `label : start, duration` adds a task to the current one.
/// Tasks before the first `section` land in an unnamed default section instead of failing.
pub fn parse_gantt(code: &str) -> GanttModel {
    let mut lines = code.lines().map(str::trim).filter(|l| !l.is_empty());
    let _header = lines.next();

    let mut model = GanttModel::default();
    for line in lines {
        if let Some(title) = super::keyword_arg(line, "title") {
            if !title.is_empty() {
                model.title = Some(title.to_string());
            }
            continue;
        }
        if let Some(name) = super::keyword_arg(line, "section") {
            model.sections.push(GanttSection {
                name: name.to_string(),
                tasks: Vec::new(),
            });
            continue;
        }

        let Some(task) = parse_task_line(line) else {
            tracing::debug!(line, "skipping unrecognized gantt line");
            continue;
        };
        if model.sections.is_empty() {
            model.sections.push(GanttSection::default());
        }
        if let Some(section) = model.sections.last_mut() {
            section.tasks.push(task);
        }
    }
    model
}

fn parse_task_line(line: &str) -> Option<GanttTask> {
    let idx = line.find(':')?;
    let label = line[..idx].trim();
    if label.is_empty() {
        return None;
    }

    let mut fields = line[idx + 1..].split(',').map(str::trim);
    let start = parse_start(fields.next()?)?;
    let duration = parse_duration(fields.next()?)?;
    if !duration.is_finite() || duration <= 0.0 {
        return None;
    }
    Some(GanttTask {
        label: label.to_string(),
        start,
        duration,
    })
}

fn parse_start(token: &str) -> Option<TaskStart> {
    if let Ok(offset) = token.parse::<f64>() {
        return offset.is_finite().then_some(TaskStart::Offset(offset));
    }
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .ok()
        .map(TaskStart::Date)
}

/// Durations are day counts; a `d` or `w` suffix scales accordingly.
fn parse_duration(token: &str) -> Option<f64> {
    if let Ok(days) = token.parse::<f64>() {
        return Some(days);
    }
    if let Some(num) = token.strip_suffix('d') {
        return num.trim().parse().ok();
    }
    if let Some(num) = token.strip_suffix('w') {
        return num.trim().parse::<f64>().ok().map(|w| w * 7.0);
    }
    None
}
