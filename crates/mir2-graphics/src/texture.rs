use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use mir2_core::Error;
use parking_lot::Mutex;

use crate::rectangle::{Overlap, Span};

pub type TextureResult<T> = Result<T, TextureError>;

pub type TextureError = Error<TextureErrorKind>;

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureErrorKind {
    InvalidLength { expected: usize, actual: usize },
}

impl std::error::Error for TextureErrorKind {}

impl fmt::Display for TextureErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { expected, actual } => {
                write!(f, "RGB data length does not match width * height * 3: expected {expected}, got {actual}")
            }
        }
    }
}

const GRAY_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Owned RGB8 image handed to external sinks (PNG encoders and the like).
#[derive(Clone, PartialEq, Eq)]
pub struct Rgb8Image {
    pub width: u16,
    pub height: u16,
    /// Row-major `R G B` triples, top-left to bottom-right.
    pub data: Vec<u8>,
}

impl fmt::Debug for Rgb8Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rgb8Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// RGB8 pixel buffer with a compositing algebra.
///
/// Three bytes per pixel, row-major, no alpha channel. Every operation takes `&self`:
/// mutations are serialized by a per-texture lock, so a texture can be shared between
/// threads and drawn into concurrently.
///
/// A texture whose width or height is at most 1 is *empty* (see [`Texture::empty`]); all
/// operations treat an empty operand as a no-op.
///
/// Mutations raise a dirty flag, consumed by [`Texture::dirty`].
pub struct Texture {
    width: u16,
    height: u16,
    pixels: Mutex<Vec<u8>>,
    dirty: AtomicBool,
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("empty", &self.is_empty())
            .finish_non_exhaustive()
    }
}

impl Clone for Texture {
    /// Deep copy of the pixel data. An empty texture clones to [`Texture::empty`].
    fn clone(&self) -> Self {
        if self.is_empty() {
            return Self::empty();
        }

        Self::from_parts(self.rgb_bytes(), self.width, self.height)
    }
}

impl Texture {
    const NAME: &'static str = "Texture";

    /// Wraps `pixels`, which must hold exactly `width * height * 3` bytes when both
    /// dimensions are non-zero.
    pub fn new(pixels: Vec<u8>, width: u16, height: u16) -> TextureResult<Self> {
        let expected = usize::from(width) * usize::from(height) * 3;

        if width > 0 && height > 0 && pixels.len() != expected {
            return Err(TextureError::new(
                Self::NAME,
                TextureErrorKind::InvalidLength {
                    expected,
                    actual: pixels.len(),
                },
            ));
        }

        Ok(Self::from_parts(pixels, width, height))
    }

    /// A black `width × height` texture.
    pub fn blank(width: u16, height: u16) -> Self {
        Self::from_parts(vec![0; usize::from(width) * usize::from(height) * 3], width, height)
    }

    /// The "no image" value: a single black pixel.
    pub fn empty() -> Self {
        Self::from_parts(vec![0; 3], 1, 1)
    }

    fn from_parts(pixels: Vec<u8>, width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: Mutex::new(pixels),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Returns `true` when this texture cannot be used for any processing or drawing.
    pub fn is_empty(&self) -> bool {
        // Dimensions above 1 were validated against the buffer length at construction.
        self.width <= 1 || self.height <= 1
    }

    /// Whether the pixels changed since the previous call; the flag is cleared on read.
    pub fn dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// Copy of the pixel data.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.with_rgb_bytes(<[u8]>::to_vec)
    }

    /// Runs `f` over the pixel data without copying it.
    pub fn with_rgb_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.pixels.lock())
    }

    /// Color at `(x, y)`, or black when the point lies outside the texture.
    pub fn pixel_at(&self, x: i32, y: i32) -> [u8; 3] {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return [0; 3];
        };

        if x >= usize::from(self.width) || y >= usize::from(self.height) {
            return [0; 3];
        }

        let idx = (x + y * usize::from(self.width)) * 3;

        self.with_rgb_bytes(|pixels| match pixels.get(idx..idx + 3) {
            Some(rgb) => [rgb[0], rgb[1], rgb[2]],
            None => [0; 3],
        })
    }

    /// Snapshot for external image containers, `None` for an empty texture.
    pub fn to_rgb8(&self) -> Option<Rgb8Image> {
        if self.is_empty() {
            return None;
        }

        Some(Rgb8Image {
            width: self.width,
            height: self.height,
            data: self.rgb_bytes(),
        })
    }

    /// New texture holding the `(x, y, w, h)` region.
    ///
    /// The region follows the same rules as [`Texture::clear_region`]; an empty result yields
    /// [`Texture::empty`].
    #[must_use]
    pub fn clip(&self, x: i32, y: i32, w: i32, h: i32) -> Texture {
        if self.is_empty() {
            return Self::empty();
        }

        let Some(span) = Span::clamped(x, y, w, h, self.width, self.height) else {
            return Self::empty();
        };

        let (Ok(width), Ok(height)) = (u16::try_from(span.width()), u16::try_from(span.height())) else {
            return Self::empty();
        };

        if span.is_empty() {
            return Self::empty();
        }

        let pixels = self.pixels.lock();
        let mut clipped = Vec::with_capacity(span.width() * span.height() * 3);
        for range in span.row_ranges(usize::from(self.width)) {
            clipped.extend_from_slice(&pixels[range]);
        }

        Self::from_parts(clipped, width, height)
    }

    /// Overwrites `other` with this texture's pixels; nothing happens if the buffer sizes differ.
    pub fn copy_to(&self, other: &Texture) {
        if core::ptr::eq(self, other) || self.is_empty() || other.is_empty() {
            return;
        }

        let pixels = self.rgb_bytes();
        let mut dst = other.pixels.lock();

        if dst.len() != pixels.len() {
            return;
        }

        dst.copy_from_slice(&pixels);
        other.dirty.store(true, Ordering::Release);
    }

    fn update_all(&self, mut op: impl FnMut(&mut u8)) {
        if self.is_empty() {
            return;
        }

        let mut pixels = self.pixels.lock();
        pixels.iter_mut().for_each(&mut op);
        self.dirty.store(true, Ordering::Release);
    }

    fn update_pixels(&self, mut op: impl FnMut(&mut [u8])) {
        if self.is_empty() {
            return;
        }

        let mut pixels = self.pixels.lock();
        pixels.chunks_exact_mut(3).for_each(&mut op);
        self.dirty.store(true, Ordering::Release);
    }

    fn update_region(&self, x: i32, y: i32, w: i32, h: i32, mut op: impl FnMut(&mut [u8])) {
        if self.is_empty() {
            return;
        }

        let Some(span) = Span::clamped(x, y, w, h, self.width, self.height) else {
            return;
        };

        let mut pixels = self.pixels.lock();
        for range in span.row_ranges(usize::from(self.width)) {
            pixels[range].chunks_exact_mut(3).for_each(&mut op);
        }
        self.dirty.store(true, Ordering::Release);
    }

    /// Sets every pixel to black.
    pub fn clear(&self) {
        self.update_all(|c| *c = 0);
    }

    /// Sets the `(x, y, w, h)` region to black.
    ///
    /// Nothing happens if `(x, y)` lies outside `[0, width] × [0, height]`. A right or bottom
    /// edge reaching past the texture is pulled back to `width - 1` (resp. `height - 1`).
    pub fn clear_region(&self, x: i32, y: i32, w: i32, h: i32) {
        self.update_region(x, y, w, h, |px| px.fill(0));
    }

    /// Scales each channel by its luma weight (R × 0.299, G × 0.587, B × 0.114).
    pub fn to_gray(&self) {
        self.update_pixels(gray);
    }

    /// [`Texture::to_gray`] restricted to a region, see [`Texture::clear_region`].
    pub fn to_gray_region(&self, x: i32, y: i32, w: i32, h: i32) {
        self.update_region(x, y, w, h, gray);
    }

    /// Complements every channel.
    pub fn inverse(&self) {
        self.update_all(|c| *c = !*c);
    }

    /// [`Texture::inverse`] restricted to a region, see [`Texture::clear_region`].
    pub fn inverse_region(&self, x: i32, y: i32, w: i32, h: i32) {
        self.update_region(x, y, w, h, |px| px.iter_mut().for_each(|c| *c = !*c));
    }

    /// Multiplies every channel by `alpha`.
    ///
    /// The product is truncated toward zero and only its low byte is kept, so factors above
    /// 1.0 wrap around instead of saturating.
    pub fn alpha(&self, alpha: f32) {
        self.update_all(|c| *c = scale(*c, alpha));
    }

    /// [`Texture::alpha`] restricted to a region, see [`Texture::clear_region`].
    pub fn alpha_region(&self, alpha: f32, x: i32, y: i32, w: i32, h: i32) {
        self.update_region(x, y, w, h, |px| px.iter_mut().for_each(|c| *c = scale(*c, alpha)));
    }

    /// Composites `src` placed at `(x, y)` onto this texture, one pixel at a time.
    ///
    /// The source is read from a snapshot taken before locking the destination, so
    /// `texture.blend_*(&texture, ..)` is well defined and two blends never hold two locks.
    fn blend_with(&self, src: &Texture, x: i32, y: i32, mut op: impl FnMut(&[u8], &mut [u8])) {
        if self.is_empty() || src.is_empty() {
            return;
        }

        let Some(overlap) = Overlap::compute(x, y, self.width, self.height, src.width, src.height) else {
            return;
        };

        let src_stride = usize::from(src.width);
        let dst_stride = usize::from(self.width);

        let snapshot = if core::ptr::eq(self, src) {
            None
        } else {
            Some(src.rgb_bytes())
        };

        let mut pixels = self.pixels.lock();
        let own_copy;
        let src_pixels: &[u8] = match &snapshot {
            Some(snapshot) => snapshot,
            None => {
                own_copy = pixels.clone();
                &own_copy
            }
        };

        let span = overlap.dst;
        for row in 0..span.height() {
            let dst_start = ((span.top + row) * dst_stride + span.left) * 3;
            let src_start = ((overlap.src_top + row) * src_stride + overlap.src_left) * 3;
            let len = span.width() * 3;

            let dst_row = &mut pixels[dst_start..dst_start + len];
            let src_row = &src_pixels[src_start..src_start + len];

            for (dst_px, src_px) in dst_row.chunks_exact_mut(3).zip(src_row.chunks_exact(3)) {
                op(src_px, dst_px);
            }
        }

        self.dirty.store(true, Ordering::Release);
    }

    /// Replaces the covered pixels with the source pixels scaled by `alpha`.
    ///
    /// `(x, y)` may be negative or hang off the far edges; only the part of `src` covering
    /// this texture is drawn. `src` itself is never modified.
    pub fn blend_normal(&self, src: &Texture, x: i32, y: i32, alpha: f32) {
        self.blend_with(src, x, y, |s, d| normal(s, d, alpha));
    }

    /// [`Texture::blend_normal`], skipping source pixels equal to `key`.
    pub fn blend_normal_transparent(&self, src: &Texture, x: i32, y: i32, alpha: f32, key: [u8; 3]) {
        self.blend_with(src, x, y, |s, d| {
            if s != key.as_slice() {
                normal(s, d, alpha)
            }
        });
    }

    /// Additive ("Add" render state) blend: `dst = min(255, src² / 255 + dst)`, in integers.
    pub fn blend_add(&self, src: &Texture, x: i32, y: i32) {
        self.blend_with(src, x, y, add);
    }

    /// Additive blend with the source scaled by `alpha` before squaring, in floating point:
    /// `dst = trunc(min(255, (src × alpha)² / 255 + dst))`.
    ///
    /// This is not interchangeable with [`Texture::blend_add`]: even with `alpha = 1.0` the
    /// rounding of the two computations may differ.
    pub fn blend_add_alpha(&self, src: &Texture, x: i32, y: i32, alpha: f32) {
        self.blend_with(src, x, y, |s, d| add_alpha(s, d, alpha));
    }

    /// [`Texture::blend_add`], skipping source pixels equal to `key`.
    pub fn blend_add_transparent(&self, src: &Texture, x: i32, y: i32, key: [u8; 3]) {
        self.blend_with(src, x, y, |s, d| {
            if s != key.as_slice() {
                add(s, d)
            }
        });
    }

    /// [`Texture::blend_add_alpha`], skipping source pixels equal to `key`.
    pub fn blend_add_alpha_transparent(&self, src: &Texture, x: i32, y: i32, alpha: f32, key: [u8; 3]) {
        self.blend_with(src, x, y, |s, d| {
            if s != key.as_slice() {
                add_alpha(s, d, alpha)
            }
        });
    }
}

/// Float to byte conversion: truncation toward zero, then the low byte.
#[expect(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "wrapping narrowing is the intended channel arithmetic"
)]
fn narrow(value: f64) -> u8 {
    (value as i64) as u8
}

fn scale(channel: u8, factor: f32) -> u8 {
    narrow(f64::from(f32::from(channel) * factor))
}

fn gray(px: &mut [u8]) {
    for (c, weight) in px.iter_mut().zip(GRAY_WEIGHTS) {
        *c = narrow(f64::from(*c) * weight);
    }
}

fn normal(src: &[u8], dst: &mut [u8], alpha: f32) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = scale(s, alpha);
    }
}

fn add(src: &[u8], dst: &mut [u8]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        let s = u32::from(s);
        let sum = (s * s / 255 + u32::from(*d)).min(255);
        *d = u8::try_from(sum).unwrap_or(u8::MAX);
    }
}

fn add_alpha(src: &[u8], dst: &mut [u8], alpha: f32) {
    for (d, &s) in dst.iter_mut().zip(src) {
        let s = f32::from(s) * alpha;
        let sum = (s * s / 255.0 + f32::from(*d)).min(255.0);
        *d = narrow(f64::from(sum));
    }
}
