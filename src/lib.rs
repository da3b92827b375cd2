use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod canvas;
pub mod error;
pub mod layout;
pub mod logging;
pub mod mask;
pub mod ranking;
pub mod settings;
pub mod text;

#[cfg(test)]
mod test_util;

pub use canvas::Canvas;
pub use error::CloudError;
pub use layout::{LayoutParams, PlacedWord, WordCloud, layout_cloud};
pub use mask::{BoundingBox, MaskSketch, OccupancyMask, compute_bounding_box};
pub use ranking::{RankedWord, rank_words};
pub use text::{BlockFont, OutlineFont, TextBox, TextMetrics};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub input: Option<String>,
    pub mask: Option<String>,
    pub output: Option<String>,
    pub font: Option<String>,
    pub font_family: Option<String>,
    pub seed: Option<u64>,
    pub settings_path: Option<String>,
    /// Skip font lookup and draw block glyphs.
    pub block_glyphs: bool,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output: PathBuf,
    pub ranked: usize,
    pub placed: usize,
    pub stopped_at: Option<String>,
    pub initial_scale: f64,
    pub seed: u64,
}

/// Ranks the input, obtains a mask (from file, or by replaying a sketch
/// script read from `sketch_input`), lays out the cloud and writes it.
pub fn run<R: BufRead>(config: Config, sketch_input: R) -> Result<RunSummary> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let mut settings = settings::load_settings(settings_path)?;
    apply_overrides(&mut settings, &config);
    settings.validate()?;
    let output = PathBuf::from(&settings.output_path);
    canvas::output_format(&output)?;

    let text = ranking::resolve_input(config.input.as_deref())?;
    let ranked = rank_words(&text)?;
    info!(
        "ranking: {} distinct words (ceiling {})",
        ranked.len(),
        settings.max_words
    );

    let mask = match config.mask.as_deref() {
        Some(path) => OccupancyMask::open(Path::new(path), settings.mask_thresholds())
            .with_context(|| format!("failed to load mask: {}", path))?,
        None => {
            eprintln!(
                "Draw the mask: `down X Y`, `move X Y`, `up`, then `done` ({}x{})",
                settings.sketch_width, settings.sketch_height
            );
            let sketch = MaskSketch::new(
                settings.sketch_width,
                settings.sketch_height,
                settings.brush_width,
                settings.mask_thresholds(),
            )?;
            mask::run_sketch_script(sketch_input, sketch)?
        }
    };

    let metrics = resolve_metrics(&settings, config.block_glyphs);
    let seed = settings.seed.unwrap_or_else(layout::seed_from_clock);
    info!("layout: seed {}", seed);
    let mut dice = layout::SeededDice::from_seed(seed);
    let cloud = layout_cloud(
        &ranked,
        &mask,
        metrics.as_ref(),
        &settings.layout_params(),
        &mut dice,
    )?;
    if cloud.placed.is_empty() {
        warn!("layout: no word fits in this mask");
    }

    cloud
        .canvas
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    Ok(RunSummary {
        output,
        ranked: ranked.len(),
        placed: cloud.placed.len(),
        stopped_at: cloud.stopped.map(|word| word.text),
        initial_scale: cloud.initial_scale,
        seed,
    })
}

pub fn format_summary(summary: &RunSummary) -> String {
    let mut lines = vec![format!(
        "placed {} of {} words into {}",
        summary.placed,
        summary.ranked,
        summary.output.display()
    )];
    if let Some(word) = &summary.stopped_at {
        lines.push(format!("stopped early at '{}'", word));
    }
    lines.push(format!(
        "initial scale {:.3}, seed {}",
        summary.initial_scale, summary.seed
    ));
    lines.join("\n")
}

fn apply_overrides(settings: &mut settings::Settings, config: &Config) {
    if let Some(output) = &config.output {
        settings.output_path = output.clone();
    }
    if let Some(font) = &config.font {
        settings.font_path = Some(font.clone());
    }
    if let Some(family) = &config.font_family {
        settings.font_family = Some(family.clone());
    }
    if config.seed.is_some() {
        settings.seed = config.seed;
    }
}

fn resolve_metrics(settings: &settings::Settings, block_glyphs: bool) -> Box<dyn TextMetrics> {
    if block_glyphs {
        info!("font: block glyphs");
        return Box::new(BlockFont::new(settings.em_px));
    }
    let resolved = text::resolve_font(
        settings.font_path.as_deref().map(Path::new),
        settings.font_family.as_deref(),
        text::default_fallback_fonts(),
        settings.em_px,
    );
    match resolved {
        Ok(font) => {
            info!("font: {}", font.family().unwrap_or("unnamed face"));
            Box::new(font)
        }
        Err(err) => {
            warn!("font: {}; falling back to block glyphs", err);
            Box::new(BlockFont::new(settings.em_px))
        }
    }
}
