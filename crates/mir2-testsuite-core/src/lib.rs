//! Test helpers shared by the integration tests.

use mir2_graphics::rle;

/// Bytes written before the first image, where real archives keep their file header.
const FILE_HEADER: [u8; 12] = *b"WIS TESTDATA";

enum Entry {
    Image {
        packed: bool,
        width: u16,
        height: u16,
        offset_x: i16,
        offset_y: i16,
        payload: Vec<u8>,
    },
    Placeholder,
}

/// Builds WIS archives in memory.
///
/// Images are laid out back to back after a 12-byte file header, followed by the index table.
/// The last index entry doubles as the trailer, as in archives produced by the game tools, so
/// at least one entry must be added before calling [`ArchiveBuilder::build`].
#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<Entry>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an uncompressed image; `indices` is stored as is, even if shorter than `width * height`.
    #[must_use]
    pub fn raw(mut self, width: u16, height: u16, indices: &[u8]) -> Self {
        self.entries.push(Entry::Image {
            packed: false,
            width,
            height,
            offset_x: 0,
            offset_y: 0,
            payload: indices.to_vec(),
        });
        self
    }

    /// Adds an RLE image with the given already-encoded stream.
    #[must_use]
    pub fn packed(mut self, width: u16, height: u16, stream: &[u8]) -> Self {
        self.entries.push(Entry::Image {
            packed: true,
            width,
            height,
            offset_x: 0,
            offset_y: 0,
            payload: stream.to_vec(),
        });
        self
    }

    /// Adds an RLE image encoding `indices`.
    #[must_use]
    pub fn packed_indices(self, width: u16, height: u16, indices: &[u8]) -> Self {
        let stream = rle::pack(indices);
        self.packed(width, height, &stream)
    }

    /// Sets the drawing offsets of the last added image.
    #[must_use]
    pub fn with_offset(mut self, x: i16, y: i16) -> Self {
        if let Some(Entry::Image { offset_x, offset_y, .. }) = self.entries.last_mut() {
            *offset_x = x;
            *offset_y = y;
        }
        self
    }

    /// Adds a placeholder entry (data length 13, no readable header).
    #[must_use]
    pub fn placeholder(mut self) -> Self {
        self.entries.push(Entry::Placeholder);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        assert!(!self.entries.is_empty(), "an archive needs at least one entry");

        let mut data = FILE_HEADER.to_vec();
        let mut index = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let offset = u32::try_from(data.len()).expect("archive fits in 4 GiB");

            match entry {
                Entry::Image {
                    packed,
                    width,
                    height,
                    offset_x,
                    offset_y,
                    payload,
                } => {
                    data.push(u8::from(*packed));
                    data.extend_from_slice(&[0; 3]);
                    data.extend_from_slice(&width.to_le_bytes());
                    data.extend_from_slice(&height.to_le_bytes());
                    data.extend_from_slice(&offset_x.to_le_bytes());
                    data.extend_from_slice(&offset_y.to_le_bytes());
                    data.extend_from_slice(payload);
                }
                Entry::Placeholder => data.extend_from_slice(&[0; 13]),
            }

            let length = u32::try_from(data.len()).expect("archive fits in 4 GiB") - offset;
            index.push((offset, length));
        }

        for (offset, length) in index {
            data.extend_from_slice(&offset.to_le_bytes());
            data.extend_from_slice(&length.to_le_bytes());
            data.extend_from_slice(&[0; 4]);
        }

        data
    }
}
