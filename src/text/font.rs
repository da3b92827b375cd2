use anyhow::{Context, Result, anyhow};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tiny_skia::PathBuilder;
use ttf_parser::{Face, OutlineBuilder, name_id};
use usvg::fontdb;

use super::{TextBox, TextMetrics, ceil_px};
use crate::layout::Anchor;

/// A TrueType/OpenType face rendered from its glyph outlines. One em spans
/// `em_px` pixels at scale 1.0.
#[derive(Clone)]
pub struct OutlineFont {
    data: Arc<Vec<u8>>,
    face_index: u32,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    space_advance: u16,
    family: Option<String>,
    em_px: f32,
}

impl fmt::Debug for OutlineFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineFont")
            .field("family", &self.family)
            .field("face_index", &self.face_index)
            .field("units_per_em", &self.units_per_em)
            .field("em_px", &self.em_px)
            .finish_non_exhaustive()
    }
}

impl OutlineFont {
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    fn px_per_unit(&self, scale: f64) -> f64 {
        self.em_px as f64 * scale / self.units_per_em.max(1) as f64
    }

    fn advance_units(&self, face: &Face<'_>, ch: char) -> u32 {
        if ch == ' ' {
            return self.space_advance as u32;
        }
        face.glyph_index(ch)
            .and_then(|glyph| face.glyph_hor_advance(glyph))
            .unwrap_or(self.space_advance) as u32
    }
}

impl TextMetrics for OutlineFont {
    fn measure(&self, text: &str, scale: f64) -> TextBox {
        let k = self.px_per_unit(scale);
        let width_units = match Face::parse(&self.data, self.face_index) {
            Ok(face) => text
                .chars()
                .map(|ch| self.advance_units(&face, ch))
                .fold(0u32, u32::saturating_add) as f64,
            Err(_) => estimate_text_width_units(text) * self.units_per_em as f64,
        };
        TextBox {
            width: ceil_px(width_units * k),
            height: ceil_px(self.ascender as f64 * k),
            baseline: ceil_px(-(self.descender as f64) * k),
        }
    }

    fn outline(&self, text: &str, anchor: Anchor, scale: f64) -> Option<tiny_skia::Path> {
        let face = Face::parse(&self.data, self.face_index).ok()?;
        let k = self.px_per_unit(scale) as f32;
        let mut builder = PathBuilder::new();
        let mut pen_x = anchor.col as f32;
        for ch in text.chars() {
            if let Some(glyph) = face.glyph_index(ch) {
                let mut sink = GlyphSink {
                    builder: &mut builder,
                    origin_x: pen_x,
                    baseline_y: anchor.row as f32,
                    k,
                };
                face.outline_glyph(glyph, &mut sink);
            }
            pen_x += self.advance_units(&face, ch) as f32 * k;
        }
        builder.finish()
    }
}

/// Maps font units (y up) onto canvas pixels (y down) around a pen position.
struct GlyphSink<'a> {
    builder: &'a mut PathBuilder,
    origin_x: f32,
    baseline_y: f32,
    k: f32,
}

impl GlyphSink<'_> {
    fn x(&self, x: f32) -> f32 {
        self.origin_x + x * self.k
    }

    fn y(&self, y: f32) -> f32 {
        self.baseline_y - y * self.k
    }
}

impl OutlineBuilder for GlyphSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1, x, y) = (self.x(x1), self.y(y1), self.x(x), self.y(y));
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = (self.x(x1), self.y(y1));
        let (x2, y2) = (self.x(x2), self.y(y2));
        let (x, y) = (self.x(x), self.y(y));
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

#[cfg(target_os = "macos")]
pub fn default_fallback_fonts() -> &'static [&'static str] {
    &["Helvetica", "Arial", "sans-serif"]
}

#[cfg(target_os = "windows")]
pub fn default_fallback_fonts() -> &'static [&'static str] {
    &["Arial", "Segoe UI", "sans-serif"]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub fn default_fallback_fonts() -> &'static [&'static str] {
    &["DejaVu Sans", "Liberation Sans", "sans-serif"]
}

pub fn load_font(path: &Path, em_px: f32) -> Result<OutlineFont> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read font: {}", path.display()))?;
    load_font_from_data(&data, None, em_px)
        .map_err(|err| anyhow!("failed to parse font: {} ({})", path.display(), err))
}

pub fn resolve_font(
    font_path: Option<&Path>,
    font_family: Option<&str>,
    fallback: &[&str],
    em_px: f32,
) -> Result<OutlineFont> {
    if let Some(path) = font_path {
        return load_font(path, em_px);
    }

    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    if let Some(family) = font_family {
        return load_font_from_family(&db, family, em_px);
    }

    for candidate in fallback {
        if let Ok(font) = load_font_from_family(&db, candidate, em_px) {
            return Ok(font);
        }
    }

    Err(anyhow!("no fallback fonts found"))
}

fn estimate_text_width_units(text: &str) -> f64 {
    text.chars()
        .map(|ch| if ch.is_whitespace() { 0.25 } else { 0.55 })
        .sum()
}

fn load_font_from_data(
    data: &[u8],
    preferred_family: Option<&str>,
    em_px: f32,
) -> Result<OutlineFont> {
    let mut fallback = None;
    let count = ttf_parser::fonts_in_collection(data).unwrap_or(1);
    for index in 0..count {
        if let Ok(face) = Face::parse(data, index) {
            let family = family_name(&face);
            let units_per_em = face.units_per_em().max(1);
            let space_advance = face
                .glyph_index(' ')
                .and_then(|id| face.glyph_hor_advance(id))
                .unwrap_or(units_per_em / 2);
            let font = OutlineFont {
                data: Arc::new(data.to_vec()),
                face_index: index,
                units_per_em,
                ascender: face.ascender(),
                descender: face.descender(),
                space_advance,
                family: family.clone(),
                em_px,
            };
            if let (Some(preferred), Some(found)) = (preferred_family, &family) {
                if found.eq_ignore_ascii_case(preferred) {
                    return Ok(font);
                }
            }
            if fallback.is_none() {
                fallback = Some(font);
            }
        }
    }
    fallback.ok_or_else(|| anyhow!("failed to parse font data"))
}

fn load_font_from_family(db: &fontdb::Database, family: &str, em_px: f32) -> Result<OutlineFont> {
    let families = if family.eq_ignore_ascii_case("sans-serif") {
        vec![fontdb::Family::SansSerif]
    } else {
        vec![fontdb::Family::Name(family)]
    };
    let query = fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db
        .query(&query)
        .ok_or_else(|| anyhow!("font not found: {}", family))?;
    let data = db
        .with_face_data(id, |data, _index| data.to_vec())
        .ok_or_else(|| anyhow!("failed to load font data: {}", family))?;
    load_font_from_data(&data, Some(family), em_px)
}

/// Prefers the typographic family (name id 16) over the legacy family.
fn family_name(face: &Face<'_>) -> Option<String> {
    let lookup = |id: u16| {
        face.names()
            .into_iter()
            .filter(|record| record.name_id == id)
            .find_map(|record| record.to_string())
    };
    lookup(name_id::TYPOGRAPHIC_FAMILY).or_else(|| lookup(name_id::FAMILY))
}
