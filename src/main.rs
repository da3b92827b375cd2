use std::io;

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "wordcloud",
    version,
    about = "Render a word cloud packed inside a mask shape"
)]
struct Cli {
    /// Text, or path to a text file, to build the cloud from (default: words.txt)
    #[arg(short = 'i', long = "input")]
    input: Option<String>,

    /// Image whose white area gives the cloud its shape; without it a sketch
    /// script is read from stdin
    #[arg(short = 'm', long = "mask")]
    mask: Option<String>,

    /// Output image path (format from extension)
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// TrueType/OpenType font file
    #[arg(long = "font")]
    font: Option<String>,

    /// System font family to look up when --font is not given
    #[arg(long = "font-family")]
    font_family: Option<String>,

    /// Draw solid block glyphs instead of a system font
    #[arg(long = "block-glyphs")]
    block_glyphs: bool,

    /// Seed for reproducible layouts
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    wordcloud::logging::init(cli.verbose)?;

    let summary = wordcloud::run(
        wordcloud::Config {
            input: cli.input,
            mask: cli.mask,
            output: cli.output,
            font: cli.font,
            font_family: cli.font_family,
            seed: cli.seed,
            settings_path: cli.read_settings,
            block_glyphs: cli.block_glyphs,
        },
        io::stdin().lock(),
    )?;

    println!("{}", wordcloud::format_summary(&summary));
    Ok(())
}
