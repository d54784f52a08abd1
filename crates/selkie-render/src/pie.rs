//! Pie chart layout.
//!
//! Slices start at 12 o'clock and advance clockwise. Angles follow the "zero at the top,
//! y grows downward" polar convention, so `x = r·sin(a)`, `y = -r·cos(a)`.

use crate::model::{Bounds, PieLayout, PieLegendItemLayout, PieSliceLayout};
use crate::text::{TextMeasurer, TextStyle};
use crate::{Error, Result};
use selkie_core::PieModel;

const CENTER: f64 = 225.0;
const RADIUS: f64 = 165.0;
const PERCENT_RADIUS_FACTOR: f64 = 0.7;
const LABEL_RADIUS_FACTOR: f64 = 1.15;
const LEGEND_STEP_Y: f64 = 22.0;
const TITLE_HEIGHT: f64 = 40.0;

/// Categorical palette, cycled by slice index.
const PALETTE: [&str; 12] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];

pub fn polar_xy(radius: f64, angle: f64) -> (f64, f64) {
    (radius * angle.sin(), -radius * angle.cos())
}

pub fn layout_pie(model: &PieModel, measurer: &dyn TextMeasurer) -> Result<PieLayout> {
    // The parser already drops non-positive values; guard anyway so a hand-built model cannot
    // divide by zero.
    let slices: Vec<_> = model
        .slices
        .iter()
        .filter(|s| s.value.is_finite() && s.value > 0.0)
        .collect();
    let total: f64 = slices.iter().map(|s| s.value).sum();
    if slices.is_empty() || total <= 0.0 {
        return Err(Error::InvalidModel {
            message: "pie chart has no positive slices".to_string(),
        });
    }

    let title_offset = if model.title.is_some() { TITLE_HEIGHT } else { 0.0 };
    let center_x = CENTER;
    let center_y = CENTER + title_offset;
    let percent_radius = RADIUS * PERCENT_RADIUS_FACTOR;
    let label_radius = RADIUS * LABEL_RADIUS_FACTOR;

    let mut out = Vec::with_capacity(slices.len());
    let mut start = 0.0f64;
    for (i, s) in slices.iter().enumerate() {
        let fraction = s.value / total;
        let end = start + fraction * std::f64::consts::TAU;
        let mid = (start + end) / 2.0;
        let (tx, ty) = polar_xy(percent_radius, mid);
        let (lx, ly) = polar_xy(label_radius, mid);
        out.push(PieSliceLayout {
            label: s.label.clone(),
            value: s.value,
            fraction,
            percent: (100.0 * fraction).round() as i64,
            start_angle: start,
            end_angle: end,
            fill: PALETTE[i % PALETTE.len()].to_string(),
            text_x: tx,
            text_y: ty,
            label_x: lx,
            label_y: ly,
        });
        start = end;
    }

    let legend_x = CENTER + RADIUS + 40.0;
    let legend_start_y = -(LEGEND_STEP_Y * out.len() as f64) / 2.0;
    let legend_items: Vec<PieLegendItemLayout> = out
        .iter()
        .enumerate()
        .map(|(i, s)| PieLegendItemLayout {
            label: s.label.clone(),
            fill: s.fill.clone(),
            y: legend_start_y + i as f64 * LEGEND_STEP_Y,
        })
        .collect();

    let legend_style = TextStyle {
        font_size: 15.0,
        ..TextStyle::default()
    };
    let mut legend_width: f64 = 0.0;
    for item in &legend_items {
        legend_width = legend_width.max(measurer.measure(&item.label, &legend_style).width);
    }

    let mut bounds = Bounds::EMPTY;
    bounds.expand_point(0.0, 0.0);
    bounds.expand_point(
        (legend_x + 22.0 + legend_width + 20.0).max(center_x * 2.0),
        center_y + CENTER,
    );
    // Slice labels sit outside the circle; make room so long ones are not clipped.
    let slice_label_style = TextStyle::default();
    for s in &out {
        let w = measurer.measure(&s.label, &slice_label_style).width;
        let x = center_x + s.label_x;
        if s.label_x < 0.0 {
            bounds.expand_point(x - w, 0.0);
        } else {
            bounds.expand_point(x + w, 0.0);
        }
    }

    Ok(PieLayout {
        title: model.title.clone(),
        center_x,
        center_y,
        radius: RADIUS,
        slices: out,
        legend_x,
        legend_items,
        bounds,
    })
}
