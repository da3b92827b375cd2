use image::{Rgb, RgbImage};

use crate::layout::Dice;
use crate::ranking::RankedWord;

pub(crate) fn black_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([0, 0, 0]))
}

pub(crate) fn paint_block(
    image: &mut RgbImage,
    top: u32,
    left: u32,
    height: u32,
    width: u32,
    color: [u8; 3],
) {
    for row in top..top + height {
        for col in left..left + width {
            image.put_pixel(col, row, Rgb(color));
        }
    }
}

pub(crate) fn ranked(words: &[(&str, f64)]) -> Vec<RankedWord> {
    words
        .iter()
        .enumerate()
        .map(|(rank, (text, frequency))| RankedWord {
            text: text.to_string(),
            frequency: *frequency,
            rank,
        })
        .collect()
}

/// Replays a fixed sequence of rolls, cycling when it runs out.
pub(crate) struct ScriptedDice {
    script: Vec<u32>,
    next: usize,
}

impl ScriptedDice {
    pub(crate) fn new(script: impl IntoIterator<Item = u32>) -> Self {
        let script: Vec<u32> = script.into_iter().collect();
        assert!(!script.is_empty(), "script must not be empty");
        Self { script, next: 0 }
    }

    pub(crate) fn rolls(&self) -> usize {
        self.next
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, upper: u32) -> u32 {
        let value = self.script[self.next % self.script.len()];
        self.next += 1;
        if upper == 0 { 0 } else { value % upper }
    }
}
