mod sketch;

use std::path::Path;

use image::RgbImage;
use tracing::debug;

use crate::error::CloudError;

pub use sketch::{MaskSketch, SketchPoint, run_sketch_script};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskThresholds {
    /// A pixel whose channel sum exceeds this value belongs to the drawable area.
    pub drawable: u32,
}

impl Default for MaskThresholds {
    fn default() -> Self {
        Self { drawable: 100 }
    }
}

/// Smallest axis-aligned rectangle enclosing all drawable pixels. All four
/// edges are inclusive pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub upper: i32,
    pub lower: i32,
    pub left: i32,
    pub right: i32,
}

impl BoundingBox {
    pub fn height(&self) -> i32 {
        self.lower - self.upper
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }
}

/// The bitmap whose bright region defines where words may be drawn.
#[derive(Debug, Clone)]
pub struct OccupancyMask {
    image: RgbImage,
    thresholds: MaskThresholds,
}

impl OccupancyMask {
    pub fn new(image: RgbImage, thresholds: MaskThresholds) -> Self {
        Self { image, thresholds }
    }

    pub fn open(path: &Path, thresholds: MaskThresholds) -> Result<Self, CloudError> {
        let image = image::open(path)?.to_rgb8();
        debug!(
            "mask: loaded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::new(image, thresholds))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Channel sum of the pixel at `(row, col)`; the caller keeps the
    /// coordinates inside the image.
    pub fn channel_sum(&self, row: i32, col: i32) -> u32 {
        let [r, g, b] = self.image.get_pixel(col as u32, row as u32).0;
        r as u32 + g as u32 + b as u32
    }

    pub fn is_drawable(&self, row: i32, col: i32) -> bool {
        self.channel_sum(row, col) > self.thresholds.drawable
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

pub fn compute_bounding_box(mask: &OccupancyMask) -> Result<BoundingBox, CloudError> {
    let mut found: Option<BoundingBox> = None;
    for row in 0..mask.height() as i32 {
        for col in 0..mask.width() as i32 {
            if !mask.is_drawable(row, col) {
                continue;
            }
            let bbox = found.get_or_insert(BoundingBox {
                upper: row,
                lower: row,
                left: col,
                right: col,
            });
            bbox.upper = bbox.upper.min(row);
            bbox.lower = bbox.lower.max(row);
            bbox.left = bbox.left.min(col);
            bbox.right = bbox.right.max(col);
        }
    }
    found.ok_or(CloudError::EmptyMask)
}
