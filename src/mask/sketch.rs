use std::io::BufRead;

use image::RgbImage;
use tiny_skia::{Color, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::debug;

use super::{MaskThresholds, OccupancyMask};
use crate::error::CloudError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchPoint {
    pub x: f32,
    pub y: f32,
}

impl SketchPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A stroke session that paints a white shape on a black mask.
pub struct MaskSketch {
    pixmap: Pixmap,
    brush_width: f32,
    thresholds: MaskThresholds,
    pressed: bool,
    last: Option<SketchPoint>,
}

impl MaskSketch {
    pub fn new(
        width: u32,
        height: u32,
        brush_width: f32,
        thresholds: MaskThresholds,
    ) -> Result<Self, CloudError> {
        let mut pixmap = Pixmap::new(width, height).ok_or(CloudError::Canvas { width, height })?;
        pixmap.fill(Color::BLACK);
        Ok(Self {
            pixmap,
            brush_width,
            thresholds,
            pressed: false,
            last: None,
        })
    }

    pub fn on_press_at(&mut self, point: SketchPoint) {
        self.pressed = true;
        self.last = Some(point);
    }

    pub fn on_drag_to(&mut self, point: SketchPoint) {
        if !self.pressed {
            return;
        }
        if let Some(last) = self.last {
            self.stroke(last, point);
        }
        self.last = Some(point);
    }

    pub fn on_release(&mut self) {
        if !self.pressed {
            return;
        }
        self.pressed = false;
        if let Some(last) = self.last {
            self.dot(last);
        }
    }

    pub fn finish(self) -> OccupancyMask {
        let width = self.pixmap.width();
        let height = self.pixmap.height();
        let rgb: Vec<u8> = self
            .pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        // Pixmap buffers are always width * height * 4 bytes.
        let image = RgbImage::from_raw(width, height, rgb)
            .unwrap_or_else(|| RgbImage::new(width, height));
        OccupancyMask::new(image, self.thresholds)
    }

    fn stroke(&mut self, from: SketchPoint, to: SketchPoint) {
        if from == to {
            self.dot(to);
            return;
        }
        let mut builder = PathBuilder::new();
        builder.move_to(from.x, from.y);
        builder.line_to(to.x, to.y);
        let Some(path) = builder.finish() else {
            return;
        };
        let stroke = Stroke {
            width: self.brush_width,
            line_cap: LineCap::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &white_paint(), &stroke, Transform::identity(), None);
    }

    fn dot(&mut self, at: SketchPoint) {
        if let Some(path) = PathBuilder::from_circle(at.x, at.y, self.brush_width / 2.0) {
            self.pixmap.fill_path(
                &path,
                &white_paint(),
                tiny_skia::FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }
}

fn white_paint() -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::WHITE);
    paint.anti_alias = true;
    paint
}

/// Drives a [`MaskSketch`] from a line script:
///
/// ```text
/// down 100 100
/// move 200 120
/// up
/// done
/// ```
///
/// Blank lines and `#` comments are skipped; end of input acts as `done`.
pub fn run_sketch_script<R: BufRead>(
    reader: R,
    mut sketch: MaskSketch,
) -> Result<OccupancyMask, CloudError> {
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|err| CloudError::Sketch {
            line: line_no,
            reason: err.to_string(),
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default().to_ascii_lowercase();
        match command.as_str() {
            "down" => sketch.on_press_at(parse_point(&mut parts, line_no)?),
            "move" => sketch.on_drag_to(parse_point(&mut parts, line_no)?),
            "up" => sketch.on_release(),
            "done" => break,
            other => {
                return Err(CloudError::Sketch {
                    line: line_no,
                    reason: format!("unknown command '{}'", other),
                });
            }
        }
    }
    debug!("sketch: finished");
    Ok(sketch.finish())
}

fn parse_point<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<SketchPoint, CloudError> {
    let mut coord = |axis: &str| -> Result<f32, CloudError> {
        let raw = parts.next().ok_or_else(|| CloudError::Sketch {
            line,
            reason: format!("missing {} coordinate", axis),
        })?;
        raw.parse::<f32>().map_err(|_| CloudError::Sketch {
            line,
            reason: format!("invalid {} coordinate '{}'", axis, raw),
        })
    };
    let x = coord("x")?;
    let y = coord("y")?;
    Ok(SketchPoint::new(x, y))
}
