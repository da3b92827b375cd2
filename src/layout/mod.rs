mod dice;
mod driver;
mod placement;
mod sizer;

pub use dice::{Dice, SeededDice, seed_from_clock};
pub use driver::{PlacedWord, StoppedWord, WordCloud, layout_cloud, layout_cloud_with};
pub use placement::{
    Anchor, CollisionTest, PaddedRect, PixelScan, PlacementEngine, PlacementResult,
};
pub use sizer::{estimate_max_font_scale, natural_fit_scale};

use crate::settings::WHITE_CHANNEL_SUM;

/// Tunables shared by the font sizer, the placement search and the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Blank pixels kept around every word.
    pub margin: i32,
    /// Anchor samples per search.
    pub retry_cap: u32,
    pub font_step: f64,
    /// A failed attempt below this scale ends the search.
    pub min_font: f64,
    /// Channel sum at or above which mask and canvas pixels count as free.
    pub blank_threshold: u32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            margin: 2,
            retry_cap: 1000,
            font_step: 0.1,
            min_font: 0.3,
            blank_threshold: WHITE_CHANNEL_SUM,
        }
    }
}
