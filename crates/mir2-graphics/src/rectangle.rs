//! Pixel-space rectangles used by the texture operations.
//!
//! All rectangles are half-open: `left..right` columns, `top..bottom` rows.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) left: usize,
    pub(crate) top: usize,
    pub(crate) right: usize,
    pub(crate) bottom: usize,
}

impl Span {
    /// Region of a `width × height` surface selected by `(x, y, w, h)`.
    ///
    /// The top-left corner must lie within `[0, width] × [0, height]`, otherwise `None`.
    /// A far edge reaching or passing the surface edge is pulled back to `width - 1`
    /// (resp. `height - 1`), so the last column and row are never part of a clamped region.
    pub(crate) fn clamped(x: i32, y: i32, w: i32, h: i32, width: u16, height: u16) -> Option<Self> {
        let (x, y) = (i64::from(x), i64::from(y));
        let (width, height) = (i64::from(width), i64::from(height));

        if x < 0 || x > width || y < 0 || y > height {
            return None;
        }

        let right = clamp_far_edge(x + i64::from(w), width).max(x);
        let bottom = clamp_far_edge(y + i64::from(h), height).max(y);

        Some(Self {
            left: to_index(x)?,
            top: to_index(y)?,
            right: to_index(right)?,
            bottom: to_index(bottom)?,
        })
    }

    pub(crate) fn width(&self) -> usize {
        self.right - self.left
    }

    pub(crate) fn height(&self) -> usize {
        self.bottom - self.top
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Byte ranges of each row of this span inside a surface of `stride` pixels per row.
    pub(crate) fn row_ranges(&self, stride: usize) -> impl Iterator<Item = core::ops::Range<usize>> + '_ {
        (self.top..self.bottom).map(move |row| {
            let start = (row * stride + self.left) * 3;
            start..start + self.width() * 3
        })
    }
}

fn clamp_far_edge(edge: i64, limit: i64) -> i64 {
    if edge >= limit {
        limit - 1
    } else {
        edge
    }
}

fn to_index(value: i64) -> Option<usize> {
    usize::try_from(value.max(0)).ok()
}

/// Where a source placed at `(x, y)` lands on a destination surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Overlap {
    /// Covered destination pixels.
    pub(crate) dst: Span,
    /// Source column matching `dst.left`.
    pub(crate) src_left: usize,
    /// Source row matching `dst.top`.
    pub(crate) src_top: usize,
}

impl Overlap {
    /// Intersection of a `dst_width × dst_height` destination with a `src_width × src_height`
    /// source whose top-left corner is placed at `(x, y)`.
    ///
    /// The placement may hang off any edge as long as part of the source stays reachable.
    pub(crate) fn compute(
        x: i32,
        y: i32,
        dst_width: u16,
        dst_height: u16,
        src_width: u16,
        src_height: u16,
    ) -> Option<Self> {
        let (x, y) = (i64::from(x), i64::from(y));
        let (dst_width, dst_height) = (i64::from(dst_width), i64::from(dst_height));
        let (src_width, src_height) = (i64::from(src_width), i64::from(src_height));

        if x > dst_width || y > dst_height || (x < 0 && -x >= src_width) || (y < 0 && -y >= src_height) {
            return None;
        }

        let left = x.max(0);
        let top = y.max(0);
        let src_left = (-x).max(0);
        let src_top = (-y).max(0);
        let right = (left + src_width - src_left).min(dst_width);
        let bottom = (top + src_height - src_top).min(dst_height);

        Some(Self {
            dst: Span {
                left: to_index(left)?,
                top: to_index(top)?,
                right: to_index(right.max(left))?,
                bottom: to_index(bottom.max(top))?,
            },
            src_left: to_index(src_left)?,
            src_top: to_index(src_top)?,
        })
    }
}
