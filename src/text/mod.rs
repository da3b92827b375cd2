mod block;
mod font;

use tiny_skia::Path;

use crate::layout::Anchor;

pub use block::BlockFont;
pub use font::{OutlineFont, default_fallback_fonts, load_font, resolve_font};

/// Rendered extent of a word at one font scale, in whole pixels.
///
/// `height` is measured upward from the baseline and `baseline` downward
/// from it, so the glyphs of a word anchored at `(row, col)` occupy rows
/// `row - height ..= row + baseline` and columns `col ..= col + width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBox {
    pub width: i32,
    pub height: i32,
    pub baseline: i32,
}

/// Measures and outlines words for the layout engine.
pub trait TextMetrics {
    fn measure(&self, text: &str, scale: f64) -> TextBox;

    /// Outline of `text` with its baseline origin at `anchor`, or `None` when
    /// nothing visible would be drawn.
    fn outline(&self, text: &str, anchor: Anchor, scale: f64) -> Option<Path>;
}

pub(crate) fn ceil_px(value: f64) -> i32 {
    if value.is_finite() && value > 0.0 {
        value.ceil() as i32
    } else {
        0
    }
}
