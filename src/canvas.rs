use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::path::Path;
use tiny_skia::{FillRule, Mask, Paint, PathBuilder, Pixmap, Rect, Transform};
use tracing::warn;

use crate::error::CloudError;
use crate::layout::{Anchor, PaddedRect};
use crate::text::TextMetrics;

/// Output raster. Starts white; every accepted word adds its glyphs and
/// reserves its padded rectangle.
pub struct Canvas {
    pixmap: Pixmap,
    reserved: Vec<bool>,
}

impl Canvas {
    pub fn blank(width: u32, height: u32) -> Result<Self, CloudError> {
        let mut pixmap = Pixmap::new(width, height).ok_or(CloudError::Canvas { width, height })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(Self {
            pixmap,
            reserved: vec![false; width as usize * height as usize],
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || col < 0 || row as u32 >= self.height() || col as u32 >= self.width() {
            return None;
        }
        Some(row as usize * self.width() as usize + col as usize)
    }

    /// Channel sum at `(row, col)`; `0` outside the canvas.
    pub fn channel_sum(&self, row: i32, col: i32) -> u32 {
        if self.index(row, col).is_none() {
            return 0;
        }
        self.pixmap
            .pixel(col as u32, row as u32)
            .map(|px| px.red() as u32 + px.green() as u32 + px.blue() as u32)
            .unwrap_or(0)
    }

    pub fn is_reserved(&self, row: i32, col: i32) -> bool {
        self.index(row, col).is_none_or(|idx| self.reserved[idx])
    }

    pub fn is_blank(&self, row: i32, col: i32, threshold: u32) -> bool {
        !self.is_reserved(row, col) && self.channel_sum(row, col) >= threshold
    }

    pub fn reserve(&mut self, rect: &PaddedRect) {
        let width = self.width() as i32;
        let height = self.height() as i32;
        for row in rect.top.max(0)..=rect.bottom.min(height - 1) {
            let base = row as usize * width as usize;
            for col in rect.left.max(0)..=rect.right.min(width - 1) {
                self.reserved[base + col as usize] = true;
            }
        }
    }

    /// Paints `text` clipped to `rect` and reserves the rectangle.
    pub fn draw_word<M: TextMetrics + ?Sized>(
        &mut self,
        metrics: &M,
        text: &str,
        anchor: Anchor,
        scale: f64,
        rect: &PaddedRect,
        color: Rgb<u8>,
    ) {
        self.reserve(rect);
        let Some(path) = metrics.outline(text, anchor, scale) else {
            warn!("canvas: '{}' has no visible outline", text);
            return;
        };
        let Some(clip) = self.clip_mask(rect) else {
            return;
        };
        let mut paint = Paint::default();
        let [r, g, b] = color.0;
        paint.set_color_rgba8(r, g, b, 255);
        paint.anti_alias = true;
        self.pixmap.fill_path(
            &path,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            Some(&clip),
        );
    }

    fn clip_mask(&self, rect: &PaddedRect) -> Option<Mask> {
        let bounds = Rect::from_ltrb(
            rect.left.max(0) as f32,
            rect.top.max(0) as f32,
            (rect.right + 1).min(self.width() as i32) as f32,
            (rect.bottom + 1).min(self.height() as i32) as f32,
        )?;
        let mut clip = Mask::new(self.width(), self.height())?;
        clip.fill_path(
            &PathBuilder::from_rect(bounds),
            FillRule::Winding,
            false,
            Transform::identity(),
        );
        Some(clip)
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        let rgb: Vec<u8> = self
            .pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        RgbImage::from_raw(self.width(), self.height(), rgb)
            .unwrap_or_else(|| RgbImage::new(self.width(), self.height()))
    }

    /// Encodes the canvas with the format implied by the file extension.
    pub fn save(&self, path: &Path) -> Result<(), CloudError> {
        let format = output_format(path)?;
        DynamicImage::ImageRgb8(self.to_rgb_image()).save_with_format(path, format)?;
        Ok(())
    }
}

/// Image format for an output path, from its extension.
pub fn output_format(path: &Path) -> Result<ImageFormat, CloudError> {
    image_format_from_path(path).ok_or_else(|| CloudError::UnsupportedOutput {
        path: path.display().to_string(),
    })
}

fn image_format_from_path(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "gif" => Some(ImageFormat::Gif),
        "webp" => Some(ImageFormat::WebP),
        "bmp" => Some(ImageFormat::Bmp),
        "tif" | "tiff" => Some(ImageFormat::Tiff),
        _ => None,
    }
}
