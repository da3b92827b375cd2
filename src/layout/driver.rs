use image::Rgb;
use tracing::{debug, info};

use super::{
    Anchor, CollisionTest, Dice, LayoutParams, PaddedRect, PixelScan, PlacementEngine,
    PlacementResult, estimate_max_font_scale,
};
use crate::canvas::Canvas;
use crate::error::CloudError;
use crate::mask::{BoundingBox, OccupancyMask, compute_bounding_box};
use crate::ranking::RankedWord;
use crate::text::{TextBox, TextMetrics};

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub frequency: f64,
    pub rank: usize,
    pub anchor: Anchor,
    pub scale: f64,
    pub text_box: TextBox,
    pub rect: PaddedRect,
    pub color: Rgb<u8>,
    /// Every scale attempted for this word, ending with `scale`.
    pub tried_scales: Vec<f64>,
}

/// The word that crossed the font floor and ended the run.
#[derive(Debug, Clone, PartialEq)]
pub struct StoppedWord {
    pub text: String,
    pub rank: usize,
    pub tried_scales: Vec<f64>,
}

pub struct WordCloud {
    pub canvas: Canvas,
    pub bounding_box: BoundingBox,
    pub initial_scale: f64,
    pub placed: Vec<PlacedWord>,
    pub stopped: Option<StoppedWord>,
}

impl WordCloud {
    pub fn is_complete(&self) -> bool {
        self.stopped.is_none()
    }
}

struct ScaleState {
    current: f64,
    last_accepted_frequency: f64,
}

impl ScaleState {
    /// Rescales by the frequency drop since the last accepted word and adds
    /// one step.
    fn advance(&mut self, frequency: f64, step: f64) -> f64 {
        self.current =
            (0.5 * frequency / self.last_accepted_frequency + 0.5) * self.current + step;
        self.current
    }
}

pub fn layout_cloud<M, D>(
    words: &[RankedWord],
    mask: &OccupancyMask,
    metrics: &M,
    params: &LayoutParams,
    dice: &mut D,
) -> Result<WordCloud, CloudError>
where
    M: TextMetrics + ?Sized,
    D: Dice + ?Sized,
{
    let collision = PixelScan {
        open_threshold: params.blank_threshold,
    };
    layout_cloud_with(words, mask, metrics, params, collision, dice)
}

/// Lays out `words` in rank order with a custom collision test.
pub fn layout_cloud_with<M, C, D>(
    words: &[RankedWord],
    mask: &OccupancyMask,
    metrics: &M,
    params: &LayoutParams,
    collision: C,
    dice: &mut D,
) -> Result<WordCloud, CloudError>
where
    M: TextMetrics + ?Sized,
    C: CollisionTest,
    D: Dice + ?Sized,
{
    let Some(first) = words.first() else {
        return Err(CloudError::NoWords);
    };
    let bbox = compute_bounding_box(mask)?;
    debug!(
        "layout: bounding box rows {}..={} cols {}..={}",
        bbox.upper, bbox.lower, bbox.left, bbox.right
    );
    let engine = PlacementEngine::with_collision_test(mask, bbox, *params, collision);
    let initial_scale = estimate_max_font_scale(&engine, metrics, first, words.get(1), dice)?;
    info!("layout: initial font scale {:.3}", initial_scale);

    let mut canvas = Canvas::blank(mask.width(), mask.height())?;
    let mut state = ScaleState {
        current: initial_scale,
        last_accepted_frequency: 1.0,
    };
    let mut placed = Vec::new();
    let mut stopped = None;

    for word in words {
        let start = state.advance(word.frequency, params.font_step);
        match engine.place_with_shrink(&canvas, metrics, &word.text, start, dice) {
            PlacementResult::Accepted {
                anchor,
                scale,
                text_box,
                tried,
            } => {
                let rect = engine.padded_rect(anchor, &text_box);
                let color = random_color(dice);
                canvas.draw_word(metrics, &word.text, anchor, scale, &rect, color);
                state.current = scale;
                state.last_accepted_frequency = word.frequency;
                placed.push(PlacedWord {
                    text: word.text.clone(),
                    frequency: word.frequency,
                    rank: word.rank,
                    anchor,
                    scale,
                    text_box,
                    rect,
                    color,
                    tried_scales: tried,
                });
            }
            PlacementResult::BelowFloor { tried } => {
                info!(
                    "layout: '{}' (rank {}) does not fit above the font floor; stopping with {} words",
                    word.text,
                    word.rank,
                    placed.len()
                );
                stopped = Some(StoppedWord {
                    text: word.text.clone(),
                    rank: word.rank,
                    tried_scales: tried,
                });
                break;
            }
        }
    }

    Ok(WordCloud {
        canvas,
        bounding_box: bbox,
        initial_scale,
        placed,
        stopped,
    })
}

fn random_color<D: Dice + ?Sized>(dice: &mut D) -> Rgb<u8> {
    let b = dice.roll(254) as u8;
    let g = dice.roll(254) as u8;
    let r = dice.roll(254) as u8;
    Rgb([r, g, b])
}
