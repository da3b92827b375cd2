use tracing::debug;

use super::{Dice, LayoutParams};
use crate::canvas::Canvas;
use crate::mask::{BoundingBox, OccupancyMask};
use crate::text::{TextBox, TextMetrics};

/// Lower-left corner of a word: its baseline origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub row: i32,
    pub col: i32,
}

/// Text box of an anchored word grown by the margin on every side. Edges are
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddedRect {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl PaddedRect {
    pub fn around(anchor: Anchor, text_box: &TextBox, margin: i32) -> Self {
        Self {
            top: anchor.row - text_box.height - margin,
            bottom: anchor.row + text_box.baseline + margin,
            left: anchor.col - margin,
            right: anchor.col + text_box.width + margin,
        }
    }

    pub fn within(&self, bbox: &BoundingBox) -> bool {
        self.top >= bbox.upper
            && self.bottom <= bbox.lower
            && self.left >= bbox.left
            && self.right <= bbox.right
    }

    pub fn intersects(&self, other: &PaddedRect) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top <= other.bottom
            && other.top <= self.bottom
    }
}

/// Decides whether every pixel of a padded rectangle is free for a word.
/// The rectangle is already known to lie inside the mask's bounding box.
pub trait CollisionTest {
    fn is_clear(&self, rect: &PaddedRect, mask: &OccupancyMask, canvas: &Canvas) -> bool;
}

/// Pixel-by-pixel scan: the mask must be white and the canvas blank under
/// the whole rectangle. Stops at the first occupied pixel.
#[derive(Debug, Clone, Copy)]
pub struct PixelScan {
    pub open_threshold: u32,
}

impl CollisionTest for PixelScan {
    fn is_clear(&self, rect: &PaddedRect, mask: &OccupancyMask, canvas: &Canvas) -> bool {
        for col in rect.left..=rect.right {
            for row in rect.top..=rect.bottom {
                if mask.channel_sum(row, col) < self.open_threshold
                    || !canvas.is_blank(row, col, self.open_threshold)
                {
                    return false;
                }
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacementResult {
    Accepted {
        anchor: Anchor,
        scale: f64,
        text_box: TextBox,
        tried: Vec<f64>,
    },
    /// The scale crossed the floor before any position was found.
    BelowFloor { tried: Vec<f64> },
}

pub struct PlacementEngine<'a, C = PixelScan> {
    mask: &'a OccupancyMask,
    bbox: BoundingBox,
    params: LayoutParams,
    collision: C,
}

impl<'a> PlacementEngine<'a, PixelScan> {
    pub fn new(mask: &'a OccupancyMask, bbox: BoundingBox, params: LayoutParams) -> Self {
        let collision = PixelScan {
            open_threshold: params.blank_threshold,
        };
        Self::with_collision_test(mask, bbox, params, collision)
    }
}

impl<'a, C: CollisionTest> PlacementEngine<'a, C> {
    pub fn with_collision_test(
        mask: &'a OccupancyMask,
        bbox: BoundingBox,
        params: LayoutParams,
        collision: C,
    ) -> Self {
        Self {
            mask,
            bbox,
            params,
            collision,
        }
    }

    pub fn mask(&self) -> &'a OccupancyMask {
        self.mask
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn padded_rect(&self, anchor: Anchor, text_box: &TextBox) -> PaddedRect {
        PaddedRect::around(anchor, text_box, self.params.margin)
    }

    pub fn is_legal(&self, canvas: &Canvas, anchor: Anchor, text_box: &TextBox) -> bool {
        let rect = self.padded_rect(anchor, text_box);
        rect.within(&self.bbox) && self.collision.is_clear(&rect, self.mask, canvas)
    }

    /// Samples anchors uniformly in the bounding box until one is legal or
    /// the retry cap runs out.
    pub fn find_position<D: Dice + ?Sized>(
        &self,
        canvas: &Canvas,
        text_box: &TextBox,
        dice: &mut D,
    ) -> Option<Anchor> {
        let row_span = self.bbox.height().max(0) as u32;
        let col_span = self.bbox.width().max(0) as u32;
        for _ in 0..self.params.retry_cap {
            let anchor = Anchor {
                row: self.bbox.upper + dice.roll(row_span) as i32,
                col: self.bbox.left + dice.roll(col_span) as i32,
            };
            if self.is_legal(canvas, anchor, text_box) {
                return Some(anchor);
            }
        }
        None
    }

    /// Tries `text` at `start_scale`, stepping the scale down after every
    /// exhausted search. Gives up once a failed attempt was made below the
    /// floor.
    pub fn place_with_shrink<M, D>(
        &self,
        canvas: &Canvas,
        metrics: &M,
        text: &str,
        start_scale: f64,
        dice: &mut D,
    ) -> PlacementResult
    where
        M: TextMetrics + ?Sized,
        D: Dice + ?Sized,
    {
        let mut scale = start_scale;
        let mut tried = Vec::new();
        while scale > 0.0 {
            let text_box = metrics.measure(text, scale);
            tried.push(scale);
            if let Some(anchor) = self.find_position(canvas, &text_box, dice) {
                return PlacementResult::Accepted {
                    anchor,
                    scale,
                    text_box,
                    tried,
                };
            }
            if scale < self.params.min_font {
                break;
            }
            scale -= self.params.font_step;
        }
        debug!("placement: '{}' gave up after {} scales", text, tried.len());
        PlacementResult::BelowFloor { tried }
    }
}
