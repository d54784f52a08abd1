//! Gantt chart layout.
//!
//! Tasks are stacked one row each in declaration order, grouped under their section; the time
//! axis is scaled to the minimum/maximum extent across the whole model. Date starts are
//! normalized to day offsets against the earliest date so numeric and date starts can mix.

use crate::model::{Bounds, GanttBarLayout, GanttLayout, GanttSectionLayout, GanttTickLayout};
use crate::text::{TextMeasurer, TextStyle};
use crate::{Error, Result};
use chrono::NaiveDate;
use selkie_core::{GanttModel, TaskStart};

const ROW_HEIGHT: f64 = 28.0;
const BAR_HEIGHT: f64 = 18.0;
const SECTION_HEADER_HEIGHT: f64 = 24.0;
const CHART_WIDTH: f64 = 640.0;
const AXIS_HEIGHT: f64 = 30.0;
const TITLE_HEIGHT: f64 = 40.0;
const MARGIN: f64 = 20.0;
const TICK_COUNT: usize = 5;

pub fn layout_gantt(model: &GanttModel, measurer: &dyn TextMeasurer) -> Result<GanttLayout> {
    if model.task_count() == 0 {
        return Err(Error::InvalidModel {
            message: "gantt chart has no tasks".to_string(),
        });
    }

    let origin: Option<NaiveDate> = model
        .tasks()
        .filter_map(|t| match t.start {
            TaskStart::Date(d) => Some(d),
            TaskStart::Offset(_) => None,
        })
        .min();
    let offset_of = |start: &TaskStart| -> f64 {
        match (start, origin) {
            (TaskStart::Offset(o), _) => *o,
            (TaskStart::Date(d), Some(base)) => (*d - base).num_days() as f64,
            // Unreachable: a date start implies an origin exists.
            (TaskStart::Date(_), None) => 0.0,
        }
    };

    let mut axis_min = f64::INFINITY;
    let mut axis_max = f64::NEG_INFINITY;
    for task in model.tasks() {
        let start = offset_of(&task.start);
        axis_min = axis_min.min(start);
        axis_max = axis_max.max(start + task.duration);
    }
    let span = (axis_max - axis_min).max(1.0);

    // The task-label column is sized to the widest label.
    let label_style = TextStyle {
        font_size: 14.0,
        ..TextStyle::default()
    };
    let mut label_width: f64 = 0.0;
    for task in model.tasks() {
        label_width = label_width.max(measurer.measure(&task.label, &label_style).width);
    }
    for section in &model.sections {
        label_width = label_width.max(measurer.measure(&section.name, &label_style).width);
    }
    let chart_left = MARGIN + label_width + 16.0;
    let x_of = |offset: f64| chart_left + (offset - axis_min) / span * CHART_WIDTH;

    let title_offset = if model.title.is_some() { TITLE_HEIGHT } else { 0.0 };
    let mut y = MARGIN + title_offset;
    let mut bars = Vec::with_capacity(model.task_count());
    let mut sections = Vec::with_capacity(model.sections.len());
    for section in &model.sections {
        if section.tasks.is_empty() {
            continue;
        }
        let section_top = y;
        if !section.name.is_empty() {
            y += SECTION_HEADER_HEIGHT;
        }
        for task in &section.tasks {
            let start = offset_of(&task.start);
            bars.push(GanttBarLayout {
                label: task.label.clone(),
                x: x_of(start),
                y: y + (ROW_HEIGHT - BAR_HEIGHT) / 2.0,
                width: (task.duration / span * CHART_WIDTH).max(2.0),
                height: BAR_HEIGHT,
                label_y: y + ROW_HEIGHT / 2.0,
            });
            y += ROW_HEIGHT;
        }
        sections.push(GanttSectionLayout {
            name: section.name.clone(),
            y: section_top,
            height: y - section_top,
        });
    }

    let axis_y = y + 8.0;
    let ticks = (0..=TICK_COUNT)
        .map(|i| {
            let offset = axis_min + span * i as f64 / TICK_COUNT as f64;
            let days = offset.round() as i64;
            let label = match origin.and_then(|base| {
                base.checked_add_signed(chrono::TimeDelta::days(days))
            }) {
                Some(date) => date.format("%m-%d").to_string(),
                None => format!("{days}"),
            };
            GanttTickLayout {
                x: x_of(offset),
                label,
            }
        })
        .collect();

    let mut bounds = Bounds::EMPTY;
    bounds.expand_point(0.0, 0.0);
    bounds.expand_point(chart_left + CHART_WIDTH + MARGIN, axis_y + AXIS_HEIGHT);

    Ok(GanttLayout {
        title: model.title.clone(),
        bars,
        sections,
        ticks,
        chart_left,
        axis_y,
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::UnicodeWidthTextMeasurer;
    use selkie_core::{Diagram, parse};

    fn gantt_layout(text: &str) -> GanttLayout {
        let Diagram::Gantt(model) = parse(text).unwrap() else {
            unreachable!()
        };
        layout_gantt(&model, &UnicodeWidthTextMeasurer::default()).unwrap()
    }

    #[test]
    fn one_bar_per_task_in_declaration_order() {
        let l = gantt_layout("gantt\nsection S\nA : 0, 2\nB : 2, 3\nC : 5, 1");
        assert_eq!(l.bars.len(), 3);
        assert!(l.bars[0].y < l.bars[1].y);
        assert!(l.bars[1].y < l.bars[2].y);
    }

    #[test]
    fn axis_scales_to_global_min_and_max() {
        let l = gantt_layout("gantt\nsection S\nA : 2, 3\nsection T\nB : 10, 5");
        // A starts at the axis minimum, B ends at the maximum.
        assert!((l.bars[0].x - l.chart_left).abs() < 1e-6);
        let b_end = l.bars[1].x + l.bars[1].width;
        assert!((b_end - (l.chart_left + CHART_WIDTH)).abs() < 1e-6);
    }

    #[test]
    fn sections_band_their_tasks() {
        let l = gantt_layout("gantt\nsection First\nA : 0, 1\nB : 1, 1\nsection Second\nC : 2, 1");
        assert_eq!(l.sections.len(), 2);
        assert!(l.sections[0].height > l.sections[1].height);
        let first = &l.sections[0];
        assert!(l.bars[0].y >= first.y && l.bars[1].y < first.y + first.height);
    }

    #[test]
    fn date_starts_normalize_against_the_earliest_date() {
        let l = gantt_layout("gantt\nsection S\nA : 2024-01-10, 2\nB : 2024-01-14, 2");
        assert!((l.bars[0].x - l.chart_left).abs() < 1e-6);
        assert!(l.bars[1].x > l.bars[0].x);
        // Ticks carry month-day labels when dates are in play.
        assert!(l.ticks[0].label.contains('-'));
    }

    #[test]
    fn ticks_before_the_earliest_date_move_backwards() {
        // A numeric start can sit before the earliest date; the first tick must not clamp
        // to the origin date.
        let l = gantt_layout("gantt\nsection S\nA : -5, 2\nB : 2024-01-10, 2");
        assert_eq!(l.ticks.first().unwrap().label, "01-05");
        assert_eq!(l.ticks.last().unwrap().label, "01-12");
    }

    #[test]
    fn numeric_ticks_for_offset_models() {
        let l = gantt_layout("gantt\nsection S\nA : 0, 10");
        assert_eq!(l.ticks.first().unwrap().label, "0");
        assert_eq!(l.ticks.last().unwrap().label, "10");
    }

    #[test]
    fn empty_gantt_is_an_invalid_model_error() {
        let Diagram::Gantt(model) = parse("gantt\nsection Empty").unwrap() else {
            unreachable!()
        };
        let err = layout_gantt(&model, &UnicodeWidthTextMeasurer::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidModel { .. }));
    }
}
