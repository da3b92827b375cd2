use tiny_skia::{Path, PathBuilder, Rect};

use super::{TextBox, TextMetrics, ceil_px};
use crate::layout::Anchor;

const ADVANCE_EM: f64 = 0.6;
const ASCENT_EM: f64 = 0.7;
const DESCENT_EM: f64 = 0.2;
const GAP_EM: f64 = 0.06;

/// Font-free renderer drawing every letter as a solid block. Letters with
/// descenders extend below the baseline.
#[derive(Debug, Clone, Copy)]
pub struct BlockFont {
    em_px: f64,
}

impl BlockFont {
    pub fn new(em_px: f32) -> Self {
        Self {
            em_px: em_px as f64,
        }
    }
}

impl TextMetrics for BlockFont {
    fn measure(&self, text: &str, scale: f64) -> TextBox {
        let em = self.em_px * scale;
        let chars = text.chars().count() as f64;
        TextBox {
            width: ceil_px(chars * ADVANCE_EM * em),
            height: ceil_px(ASCENT_EM * em),
            baseline: ceil_px(DESCENT_EM * em),
        }
    }

    fn outline(&self, text: &str, anchor: Anchor, scale: f64) -> Option<Path> {
        let em = (self.em_px * scale) as f32;
        let advance = ADVANCE_EM as f32 * em;
        let gap = GAP_EM as f32 * em;
        let top = anchor.row as f32 - ASCENT_EM as f32 * em;

        let mut builder = PathBuilder::new();
        for (idx, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = anchor.col as f32 + idx as f32 * advance + gap;
            let right = left + advance - 2.0 * gap;
            let bottom = if matches!(ch, 'g' | 'j' | 'p' | 'q' | 'y') {
                anchor.row as f32 + DESCENT_EM as f32 * em
            } else {
                anchor.row as f32
            };
            if let Some(rect) = Rect::from_ltrb(left, top, right, bottom) {
                builder.push_rect(rect);
            }
        }
        builder.finish()
    }
}
