use image::Rgb;
use tracing::debug;

use super::{CollisionTest, Dice, PlacementEngine, PlacementResult};
use crate::canvas::Canvas;
use crate::error::CloudError;
use crate::mask::BoundingBox;
use crate::ranking::RankedWord;
use crate::text::TextMetrics;

const SCRATCH_INK: Rgb<u8> = Rgb([0, 0, 0]);

/// Largest scale at which `text` keeps its aspect ratio inside `bbox`.
pub fn natural_fit_scale<M: TextMetrics + ?Sized>(
    text: &str,
    bbox: &BoundingBox,
    metrics: &M,
) -> f64 {
    let unit = metrics.measure(text, 1.0);
    let by_height = bbox.height() as f64 / unit.height.max(1) as f64;
    let by_width = bbox.width() as f64 / unit.width.max(1) as f64;
    by_height.min(by_width)
}

/// Estimates the starting font scale by trial-placing the two most frequent
/// words on a scratch canvas and taking the harmonic mean of the scales that
/// fit. A lone word gets its natural fit without any trial.
pub fn estimate_max_font_scale<C, M, D>(
    engine: &PlacementEngine<'_, C>,
    metrics: &M,
    first: &RankedWord,
    second: Option<&RankedWord>,
    dice: &mut D,
) -> Result<f64, CloudError>
where
    C: CollisionTest,
    M: TextMetrics + ?Sized,
    D: Dice + ?Sized,
{
    let bbox = engine.bounding_box();
    let Some(second) = second else {
        return Ok(natural_fit_scale(&first.text, &bbox, metrics));
    };

    let mask = engine.mask();
    let mut scratch = Canvas::blank(mask.width(), mask.height())?;
    let scale1 = trial_place(engine, metrics, &mut scratch, first, dice)?;
    let scale2 = trial_place(engine, metrics, &mut scratch, second, dice)?;
    let estimate = 2.0 * scale1 * scale2 / (scale1 + scale2);
    debug!(
        "sizer: '{}' fit at {:.3}, '{}' at {:.3}, estimate {:.3}",
        first.text, scale1, second.text, scale2, estimate
    );
    Ok(estimate)
}

fn trial_place<C, M, D>(
    engine: &PlacementEngine<'_, C>,
    metrics: &M,
    scratch: &mut Canvas,
    word: &RankedWord,
    dice: &mut D,
) -> Result<f64, CloudError>
where
    C: CollisionTest,
    M: TextMetrics + ?Sized,
    D: Dice + ?Sized,
{
    let bbox = engine.bounding_box();
    let start = natural_fit_scale(&word.text, &bbox, metrics) * (0.5 * word.frequency + 0.5);
    match engine.place_with_shrink(scratch, metrics, &word.text, start, dice) {
        PlacementResult::Accepted {
            anchor,
            scale,
            text_box,
            ..
        } => {
            let rect = engine.padded_rect(anchor, &text_box);
            scratch.draw_word(metrics, &word.text, anchor, scale, &rect, SCRATCH_INK);
            Ok(scale)
        }
        PlacementResult::BelowFloor { .. } => Err(CloudError::NoUsableScale {
            word: word.text.clone(),
        }),
    }
}
