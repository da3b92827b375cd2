use thiserror::Error;

#[derive(Debug, Error)]
pub enum CloudError {
    #[error("the text should contain at least one word")]
    NoWords,
    #[error("mask has no drawable pixels")]
    EmptyMask,
    #[error("no usable font scale for '{word}' in this mask")]
    NoUsableScale { word: String },
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
    #[error("failed to allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },
    #[error("font error: {0}")]
    Font(String),
    #[error("sketch script line {line}: {reason}")]
    Sketch { line: usize, reason: String },
    #[error("unsupported output format: {path} (use png, jpg, gif, webp, bmp or tiff)")]
    UnsupportedOutput { path: String },
    #[error(transparent)]
    Image(#[from] image::ImageError),
}
