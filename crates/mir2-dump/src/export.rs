use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context as _;
use mir2_graphics::Rgb8Image;
use mir2_wis::ImageLibrary;

/// Outcome of an archive export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    /// Placeholders and images that could not be decoded.
    pub skipped: usize,
}

/// Expands RGB8 pixels to RGBA8, making the pixels equal to `key` fully transparent.
pub fn to_rgba(image: &Rgb8Image, key: [u8; 3]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(image.data.len() / 3 * 4);

    for px in image.data.chunks_exact(3) {
        let alpha = if px == key.as_slice() { 0 } else { u8::MAX };
        rgba.extend_from_slice(px);
        rgba.push(alpha);
    }

    rgba
}

/// Encodes `image` as an RGBA8 PNG into `out`.
pub fn encode_png(out: impl Write, image: &Rgb8Image, key: [u8; 3]) -> anyhow::Result<()> {
    let mut encoder = png::Encoder::new(out, u32::from(image.width), u32::from(image.height));
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().context("PNG header")?;
    writer.write_image_data(&to_rgba(image, key)).context("PNG data")?;
    writer.finish().context("PNG trailer")?;

    Ok(())
}

/// Writes every non-empty image of `library` to `<output_dir>/<stem>_<index>.png`.
pub fn export_all(
    library: &impl ImageLibrary,
    output_dir: &Path,
    stem: &str,
    key: [u8; 3],
) -> anyhow::Result<ExportSummary> {
    std::fs::create_dir_all(output_dir).with_context(|| format!("couldn't create {}", output_dir.display()))?;

    let mut summary = ExportSummary::default();

    for index in 0..library.count() {
        let Some(image) = library.texture(index).to_rgb8() else {
            trace!(index, "Skipping empty image");
            summary.skipped += 1;
            continue;
        };

        let path = output_dir.join(format!("{stem}_{index}.png"));
        let file = File::create(&path).with_context(|| format!("couldn't create {}", path.display()))?;

        encode_png(BufWriter::new(file), &image, key).with_context(|| format!("couldn't write {}", path.display()))?;

        debug!(index, path = %path.display(), width = image.width, height = image.height, "Image exported");
        summary.written += 1;
    }

    Ok(summary)
}
