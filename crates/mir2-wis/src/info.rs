/// Geometry of one archived image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageInfo {
    pub width: u16,
    pub height: u16,
    /// Horizontal drawing offset relative to the sprite anchor.
    pub offset_x: i16,
    /// Vertical drawing offset relative to the sprite anchor.
    pub offset_y: i16,
}

impl ImageInfo {
    /// Marker for an index without image: placeholder entries, unknown indices, unloaded archives.
    pub const EMPTY: Self = Self {
        width: 0,
        height: 0,
        offset_x: 0,
        offset_y: 0,
    };

    /// Returns `true` when there are no pixels to decode.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub(crate) fn pixel_count(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// Location of one image (header and payload) inside the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IndexEntry {
    pub(crate) data_offset: u32,
    pub(crate) data_length: u32,
}

impl IndexEntry {
    /// Entries of this length hold no image, their header is never read.
    pub(crate) const PLACEHOLDER_LENGTH: u32 = 13;

    pub(crate) fn is_placeholder(&self) -> bool {
        self.data_length == Self::PLACEHOLDER_LENGTH
    }
}
