//! Text measurement for layout spacing.
//!
//! Label extents drive node sizing and layer spacing, so the measurer must cope with mixed-width
//! scripts: a CJK label is roughly twice as wide per glyph as a Latin one. Widths are therefore
//! computed from Unicode display cells, never from `chars().count()`.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 16.0,
            font_weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Deterministic measurer based on Unicode display width.
///
/// One display cell is approximated as `font_size * char_width_factor`, which is close enough to
/// a typical sans-serif advance for spacing purposes. Real glyph metrics only exist at
/// rasterization time, so layout spacing stays font-independent and reproducible.
#[derive(Debug, Clone, Default)]
pub struct UnicodeWidthTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for UnicodeWidthTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let lines: Vec<&str> = text.split('\n').collect();
        let font_size = style.font_size.max(1.0);
        let mut max_cells = 0usize;
        for line in &lines {
            max_cells = max_cells.max(UnicodeWidthStr::width(*line));
        }

        TextMetrics {
            width: max_cells as f64 * font_size * char_width_factor,
            height: lines.len().max(1) as f64 * font_size * line_height_factor,
            line_count: lines.len().max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_scripts_measure_wider_than_latin() {
        let m = UnicodeWidthTextMeasurer::default();
        let style = TextStyle::default();
        let latin = m.measure("abcd", &style);
        let cjk = m.measure("数据处理", &style);
        assert!(cjk.width > latin.width * 1.9);
    }

    #[test]
    fn empty_text_still_has_a_line() {
        let m = UnicodeWidthTextMeasurer::default();
        let metrics = m.measure("", &TextStyle::default());
        assert_eq!(metrics.line_count, 1);
        assert!(metrics.height > 0.0);
    }
}
