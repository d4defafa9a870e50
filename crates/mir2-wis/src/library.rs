use mir2_graphics::Texture;

use crate::ImageInfo;

/// An indexed collection of images.
///
/// All the archive formats of the client share this surface: a fixed number of images known
/// at open time, geometry available without decoding, and decoding on demand. Every method is
/// infallible; a library that failed to load behaves as an empty one.
pub trait ImageLibrary {
    fn is_loaded(&self) -> bool;

    /// Number of indexed images, including placeholders.
    fn count(&self) -> usize;

    /// Geometry of the image at `index`, or [`ImageInfo::EMPTY`].
    fn info(&self, index: usize) -> ImageInfo;

    /// Decoded image at `index`, or [`Texture::empty`].
    fn texture(&self, index: usize) -> Texture;
}
