//! Label measurement. Graphviz writes one `<text>` element per label line, so a measurer only
//! ever sees a single line.

use unicode_width::UnicodeWidthStr;

/// Font attributes read off a `<text>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: Option<String>,
    /// In user units; Graphviz writes `font-size="14.00"` by default.
    pub font_size: f64,
}

/// Line box of a label, in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;

    /// Distance from the top of the line box to the baseline, as a fraction of the line height.
    fn ascent_ratio(&self) -> f64 {
        0.8
    }
}

/// Fixed-advance model of Graphviz's default serif face: every display column advances
/// `advance` ems and the line box is `line_height` ems tall. Wide (CJK) characters count as two
/// columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeterministicTextMeasurer {
    pub advance: f64,
    pub line_height: f64,
}

impl Default for DeterministicTextMeasurer {
    fn default() -> Self {
        Self {
            advance: 0.5,
            line_height: 1.2,
        }
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let em = style.font_size.max(1.0);
        TextMetrics {
            width: text.width() as f64 * self.advance * em,
            height: self.line_height * em,
        }
    }
}
