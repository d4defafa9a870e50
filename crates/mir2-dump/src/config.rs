use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use mir2_graphics::palette::{Palette, PALETTE_SIZE};

/// Command line configuration of the exporter.
#[derive(Clone, Debug)]
pub struct Config {
    pub archive: PathBuf,
    pub output_dir: PathBuf,
    pub palette_file: Option<PathBuf>,
    /// Pixels of this color are exported fully transparent.
    pub color_key: [u8; 3],
    pub log_file: Option<PathBuf>,
}

/// Parses a `RRGGBB` hexadecimal color, with an optional leading `#`.
pub fn parse_color(input: &str) -> anyhow::Result<[u8; 3]> {
    let hex = input.strip_prefix('#').unwrap_or(input);

    if hex.len() != 6 || !hex.is_ascii() {
        anyhow::bail!("expected a color as RRGGBB, got {input:?}");
    }

    let mut color = [0; 3];
    for (channel, i) in color.iter_mut().zip((0..6).step_by(2)) {
        let digits = hex.get(i..i + 2).context("invalid color digits")?;
        *channel = u8::from_str_radix(digits, 16).with_context(|| format!("invalid color {input:?}"))?;
    }

    Ok(color)
}

/// mir2 WIS archive exporter
#[derive(Parser, Debug)]
#[clap(author = "mir2-rs", about = "Exports the images of a WIS archive as PNG files")]
#[clap(version, long_about = None)]
struct Args {
    /// The archive to export
    archive: PathBuf,

    /// Directory receiving the PNG files (created if missing)
    #[clap(short, long, value_parser)]
    output: PathBuf,

    /// A palette table: 768 bytes (RGB) or 1024 bytes (4 bytes per entry, first one ignored)
    #[clap(short, long, value_parser)]
    palette: Option<PathBuf>,

    /// Color exported as fully transparent, as RRGGBB
    #[clap(short, long, value_parser = parse_color, default_value = "000000")]
    transparent: [u8; 3],

    /// A file receiving the logs instead of stderr
    #[clap(long, value_parser)]
    log_file: Option<PathBuf>,
}

impl Config {
    pub fn parse_args() -> anyhow::Result<Self> {
        let args = Args::parse();

        if !args.archive.is_file() {
            anyhow::bail!("{} is not a file", args.archive.display());
        }

        Ok(Self {
            archive: args.archive,
            output_dir: args.output,
            palette_file: args.palette,
            color_key: args.transparent,
            log_file: args.log_file,
        })
    }

    /// Loads the configured palette, falling back to a grayscale ramp.
    pub fn load_palette(&self) -> anyhow::Result<Palette> {
        match &self.palette_file {
            Some(path) => load_palette(path),
            None => {
                warn!("No palette provided, images are exported in grayscale");
                Ok(Palette::grayscale())
            }
        }
    }

    /// File name prefix of the exported images: the archive file name without extension.
    pub fn stem(&self) -> String {
        self.archive
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("image"))
    }
}

fn load_palette(path: &Path) -> anyhow::Result<Palette> {
    let table = std::fs::read(path).with_context(|| format!("couldn't read palette {}", path.display()))?;

    let palette = if table.len() == PALETTE_SIZE * 4 {
        Palette::from_argb_bytes(&table)
    } else {
        Palette::from_rgb_bytes(&table)
    };

    palette.with_context(|| format!("invalid palette {}", path.display()))
}
