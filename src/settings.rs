use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CloudError;
use crate::layout::LayoutParams;
use crate::mask::MaskThresholds;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../wordcloud.toml");

/// Maximum channel sum of an RGB8 pixel.
pub const WHITE_CHANNEL_SUM: u32 = 3 * 255;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub margin: i32,
    pub retry_cap: u32,
    pub font_step: f64,
    pub min_font: f64,
    pub max_words: usize,
    pub seed: Option<u64>,
    pub drawable_threshold: u32,
    pub blank_threshold: u32,
    pub sketch_width: u32,
    pub sketch_height: u32,
    pub brush_width: f32,
    pub font_path: Option<String>,
    pub font_family: Option<String>,
    pub em_px: f32,
    pub output_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            margin: 2,
            retry_cap: 1000,
            font_step: 0.1,
            min_font: 0.3,
            max_words: 100,
            seed: None,
            drawable_threshold: 100,
            blank_threshold: WHITE_CHANNEL_SUM,
            sketch_width: 512,
            sketch_height: 512,
            brush_width: 40.0,
            font_path: None,
            font_family: None,
            em_px: 30.0,
            output_path: "wordcloud.png".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    layout: Option<LayoutSettings>,
    mask: Option<MaskSettings>,
    font: Option<FontSettings>,
    output: Option<OutputSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutSettings {
    margin: Option<i32>,
    retry_cap: Option<u32>,
    font_step: Option<f64>,
    min_font: Option<f64>,
    max_words: Option<usize>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct MaskSettings {
    drawable_threshold: Option<u32>,
    blank_threshold: Option<u32>,
    sketch_width: Option<u32>,
    sketch_height: Option<u32>,
    brush_width: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct FontSettings {
    path: Option<String>,
    family: Option<String>,
    em_px: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputSettings {
    path: Option<String>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut ordered_paths = vec![
        PathBuf::from("wordcloud.toml"),
        PathBuf::from("wordcloud.local.toml"),
    ];
    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
    }
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }
    load_settings_from(&ordered_paths)
}

/// Merges the embedded defaults and then every existing file in order.
pub fn load_settings_from(paths: &[PathBuf]) -> Result<Settings> {
    let mut settings = Settings::default();
    let defaults: SettingsFile = toml::from_str(DEFAULT_SETTINGS_TOML)
        .with_context(|| "failed to parse embedded default settings")?;
    settings.merge(defaults);

    for path in paths {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    settings.validate()?;
    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(layout) = incoming.layout {
            if let Some(margin) = layout.margin {
                self.margin = margin;
            }
            if let Some(cap) = layout.retry_cap {
                self.retry_cap = cap;
            }
            if let Some(step) = layout.font_step {
                self.font_step = step;
            }
            if let Some(min_font) = layout.min_font {
                self.min_font = min_font;
            }
            if let Some(max_words) = layout.max_words {
                self.max_words = max_words;
            }
            if layout.seed.is_some() {
                self.seed = layout.seed;
            }
        }
        if let Some(mask) = incoming.mask {
            if let Some(threshold) = mask.drawable_threshold {
                self.drawable_threshold = threshold;
            }
            if let Some(threshold) = mask.blank_threshold {
                self.blank_threshold = threshold;
            }
            if let Some(width) = mask.sketch_width {
                self.sketch_width = width;
            }
            if let Some(height) = mask.sketch_height {
                self.sketch_height = height;
            }
            if let Some(width) = mask.brush_width {
                self.brush_width = width;
            }
        }
        if let Some(font) = incoming.font {
            if let Some(path) = font.path {
                if !path.trim().is_empty() {
                    self.font_path = Some(path);
                }
            }
            if let Some(family) = font.family {
                if !family.trim().is_empty() {
                    self.font_family = Some(family);
                }
            }
            if let Some(em_px) = font.em_px {
                self.em_px = em_px;
            }
        }
        if let Some(output) = incoming.output {
            if let Some(path) = output.path {
                if !path.trim().is_empty() {
                    self.output_path = path;
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), CloudError> {
        fn invalid(name: &'static str, reason: &str) -> CloudError {
            CloudError::InvalidSetting {
                name,
                reason: reason.to_string(),
            }
        }

        if !(self.font_step > 0.0) {
            return Err(invalid("layout.font_step", "must be positive"));
        }
        if !(self.min_font > 0.0) {
            return Err(invalid("layout.min_font", "must be positive"));
        }
        if self.retry_cap == 0 {
            return Err(invalid("layout.retry_cap", "must be at least 1"));
        }
        if self.margin < 0 {
            return Err(invalid("layout.margin", "must not be negative"));
        }
        if self.blank_threshold > WHITE_CHANNEL_SUM {
            return Err(invalid("mask.blank_threshold", "must not exceed 765"));
        }
        if self.drawable_threshold >= WHITE_CHANNEL_SUM {
            return Err(invalid("mask.drawable_threshold", "must be below 765"));
        }
        if self.sketch_width == 0 || self.sketch_height == 0 {
            return Err(invalid("mask.sketch_width", "sketch size must be non-zero"));
        }
        if !(self.brush_width > 0.0) {
            return Err(invalid("mask.brush_width", "must be positive"));
        }
        if !(self.em_px > 0.0) {
            return Err(invalid("font.em_px", "must be positive"));
        }
        Ok(())
    }

    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            margin: self.margin,
            retry_cap: self.retry_cap,
            font_step: self.font_step,
            min_font: self.min_font,
            blank_threshold: self.blank_threshold,
        }
    }

    pub fn mask_thresholds(&self) -> MaskThresholds {
        MaskThresholds {
            drawable: self.drawable_threshold,
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".wordcloud"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn embedded_defaults_match_default_impl() {
        let settings = load_settings_from(&[]).expect("defaults");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn later_files_override_earlier_ones() {
        let dir = tempdir().expect("tempdir");
        let base = dir.path().join("base.toml");
        let local = dir.path().join("local.toml");
        fs::write(&base, "[layout]\nretry_cap = 50\nmin_font = 0.5\n").expect("write base");
        fs::write(&local, "[layout]\nretry_cap = 75\n[output]\npath = \"out.jpg\"\n")
            .expect("write local");

        let settings = load_settings_from(&[base, local]).expect("settings");
        assert_eq!(settings.retry_cap, 75);
        assert_eq!(settings.min_font, 0.5);
        assert_eq!(settings.output_path, "out.jpg");
        assert_eq!(settings.margin, 2);
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = tempdir().expect("tempdir");
        let settings =
            load_settings_from(&[dir.path().join("nope.toml")]).expect("settings");
        assert_eq!(settings.font_step, 0.1);
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[layout]\nfont_step = 0.0\n").expect("write");
        let err = load_settings_from(&[path]).unwrap_err();
        assert!(err.to_string().contains("layout.font_step"));
    }

    #[test]
    fn explicit_settings_path_must_exist() {
        let dir = tempdir().expect("tempdir");
        let err = load_settings(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("settings file not found"));
    }

    #[test]
    fn blank_threshold_above_white_is_rejected() {
        let settings = Settings {
            blank_threshold: 800,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CloudError::InvalidSetting {
                name: "mask.blank_threshold",
                ..
            })
        ));
    }
}
