use core::fmt;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use mir2_core::LeReader;
use mir2_graphics::{rle, Palette, Texture};
use parking_lot::Mutex;

use crate::info::IndexEntry;
use crate::{ImageInfo, ImageLibrary, WisError, WisErrorExt, WisErrorKind, WisResult};

/// Size of the trailer, and of each index table entry.
const ENTRY_SIZE: u64 = 12;

/// Size of the header preceding every image payload.
const IMAGE_HEADER_SIZE: u32 = 12;

/// Compression flag value of RLE-packed payloads.
const FLAG_PACKED: u8 = 1;

/// A WIS image archive.
///
/// The trailer and index table are read once when opening; images are decoded on demand.
/// Decoding only needs `&self`: the file cursor is guarded by an internal lock held for the
/// seek and read of one image, so an archive can be shared between threads.
pub struct Wis<S = File> {
    entries: Vec<IndexEntry>,
    infos: Vec<ImageInfo>,
    reader: Mutex<Option<LeReader<S>>>,
    palette: Palette,
    loaded: bool,
}

impl<S> fmt::Debug for Wis<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wis")
            .field("count", &self.entries.len())
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

impl Wis<File> {
    /// Opens the archive at `path`.
    ///
    /// Failures are logged and produce an archive that is not loaded.
    pub fn open(path: impl AsRef<Path>, palette: Palette) -> Self {
        let path = path.as_ref();

        match Self::try_open(path, palette.clone()) {
            Ok(wis) => wis,
            Err(e) => {
                warn!(path = %path.display(), error = %e.report(), "Failed to open archive");
                Self::unloaded(palette)
            }
        }
    }

    pub fn try_open(path: impl AsRef<Path>, palette: Palette) -> WisResult<Self> {
        let reader = LeReader::open(path).map_err(|e| WisError::new("Wis::open", WisErrorKind::Io).with_source(e))?;
        Self::load(reader, palette)
    }
}

impl<S: Read + Seek> Wis<S> {
    const NAME: &'static str = "Wis";

    /// Same as [`Wis::open`], over an arbitrary byte source.
    pub fn from_reader(source: S, palette: Palette) -> Self {
        match Self::try_from_reader(source, palette.clone()) {
            Ok(wis) => wis,
            Err(e) => {
                warn!(error = %e.report(), "Failed to open archive");
                Self::unloaded(palette)
            }
        }
    }

    pub fn try_from_reader(source: S, palette: Palette) -> WisResult<Self> {
        let reader = LeReader::new(source).map_err(|e| WisError::new(Self::NAME, WisErrorKind::Io).with_source(e))?;
        Self::load(reader, palette)
    }

    fn unloaded(palette: Palette) -> Self {
        Self {
            entries: Vec::new(),
            infos: Vec::new(),
            reader: Mutex::new(None),
            palette,
            loaded: false,
        }
    }

    fn load(mut reader: LeReader<S>, palette: Palette) -> WisResult<Self> {
        let entries = read_index(&mut reader)?;

        let mut infos = Vec::with_capacity(entries.len());
        for entry in &entries {
            let info = if entry.is_placeholder() {
                ImageInfo::EMPTY
            } else {
                read_info(&mut reader, entry)?
            };
            infos.push(info);
        }

        debug!(count = entries.len(), "Archive loaded");

        Ok(Self {
            entries,
            infos,
            reader: Mutex::new(Some(reader)),
            palette,
            loaded: true,
        })
    }

    /// Decodes the image at `index`.
    ///
    /// Placeholder entries decode to [`Texture::empty`] without touching the file.
    pub fn try_decode(&self, index: usize) -> WisResult<Texture> {
        if !self.loaded {
            return Err(WisError::new(Self::NAME, WisErrorKind::NotLoaded));
        }

        let (Some(entry), Some(info)) = (self.entries.get(index), self.infos.get(index)) else {
            return Err(WisError::new(
                Self::NAME,
                WisErrorKind::IndexOutOfRange {
                    index,
                    count: self.entries.len(),
                },
            ));
        };

        if info.is_empty() {
            return Ok(Texture::empty());
        }

        let pixel_count = info.pixel_count();
        let (packed, payload) = self.read_payload(index, entry, pixel_count)?;

        trace!(
            index,
            offset = entry.data_offset,
            length = entry.data_length,
            packed,
            "Decoding image"
        );

        let indices = if packed {
            rle::unpack(&payload, pixel_count)
        } else {
            payload
        };

        Texture::new(self.palette.resolve(&indices), info.width, info.height).map_err(|e| {
            WisError::invalid_field(Self::NAME, "width", "does not match the pixel data").with_source(e)
        })
    }

    /// Reads the compression flag and the payload of one image, holding the cursor lock.
    fn read_payload(&self, index: usize, entry: &IndexEntry, pixel_count: usize) -> WisResult<(bool, Vec<u8>)> {
        let mut guard = self.reader.lock();
        let reader = guard
            .as_mut()
            .ok_or_else(|| WisError::new(Self::NAME, WisErrorKind::NotLoaded))?;

        reader.seek(u64::from(entry.data_offset)).map_err(WisError::read)?;
        let packed = reader.read_u8().map_err(WisError::read)? == FLAG_PACKED;
        reader.skip(u64::from(IMAGE_HEADER_SIZE) - 1).map_err(WisError::read)?;

        let payload_len = if packed {
            let len = entry.data_length.checked_sub(IMAGE_HEADER_SIZE).ok_or_else(|| {
                WisError::invalid_field(Self::NAME, "data_length", "shorter than the image header")
            })?;
            usize::try_from(len).map_err(|_| WisError::invalid_field(Self::NAME, "data_length", "too large"))?
        } else {
            pixel_count
        };

        // Checked up front so a corrupted length never turns into a huge allocation.
        let available = reader.len().saturating_sub(reader.position().map_err(WisError::read)?);
        if u64::try_from(payload_len).map_or(true, |len| len > available) {
            return Err(WisError::new(Self::NAME, WisErrorKind::Truncated { index }));
        }

        let mut payload = vec![0; payload_len];
        reader
            .read_bytes(&mut payload)
            .map_err(|e| WisError::truncated(Self::NAME, index, e))?;

        Ok((packed, payload))
    }

    /// Decodes the image at `index`, or returns [`Texture::empty`] if that fails.
    pub fn decode(&self, index: usize) -> Texture {
        self.try_decode(index).unwrap_or_else(|e| {
            match e.kind() {
                WisErrorKind::NotLoaded | WisErrorKind::IndexOutOfRange { .. } => {
                    debug!(index, error = %e.report(), "No image to decode");
                }
                _ => warn!(index, error = %e.report(), "Failed to decode image"),
            }
            Texture::empty()
        })
    }

    /// Releases the file and forgets the index. Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(mut reader) = self.reader.get_mut().take() {
            reader.close();
        }

        self.entries.clear();
        self.infos.clear();
        self.loaded = false;
    }
}

impl<S: Read + Seek> ImageLibrary for Wis<S> {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn count(&self) -> usize {
        self.entries.len()
    }

    fn info(&self, index: usize) -> ImageInfo {
        self.infos.get(index).copied().unwrap_or(ImageInfo::EMPTY)
    }

    fn texture(&self, index: usize) -> Texture {
        self.decode(index)
    }
}

/// Reads the trailer, then the index table it points to.
///
/// The trailer (`last_offset: u32`, `last_length: u32`, 4 reserved bytes) sits in the last
/// 12 bytes of the file; the index table spans from `last_offset + last_length` to the end of
/// the file, one 12-byte entry per image.
fn read_index<S: Read + Seek>(reader: &mut LeReader<S>) -> WisResult<Vec<IndexEntry>> {
    const CONTEXT: &str = "Wis::read_index";

    let len = reader.len();
    if len < ENTRY_SIZE {
        return Err(WisError::new(
            CONTEXT,
            WisErrorKind::InvalidTrailer {
                reason: "file is smaller than the trailer",
            },
        ));
    }

    reader.seek(len - ENTRY_SIZE).map_err(WisError::read)?;
    let last_offset = u64::from(reader.read_u32().map_err(WisError::read)?);
    let last_length = u64::from(reader.read_u32().map_err(WisError::read)?);

    let index_start = last_offset + last_length;
    if index_start > len {
        return Err(WisError::new(
            CONTEXT,
            WisErrorKind::InvalidTrailer {
                reason: "index table starts past the end of the file",
            },
        ));
    }

    let count = (len - index_start) / ENTRY_SIZE;
    let count = usize::try_from(count).map_err(|_| {
        WisError::new(
            CONTEXT,
            WisErrorKind::InvalidIndex {
                field: "count",
                reason: "too many entries",
            },
        )
    })?;

    reader.seek(index_start).map_err(WisError::read)?;

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let data_offset = reader.read_u32().map_err(WisError::read)?;
        let data_length = reader.read_u32().map_err(WisError::read)?;
        reader.skip(4).map_err(WisError::read)?;

        entries.push(IndexEntry {
            data_offset,
            data_length,
        });
    }

    Ok(entries)
}

/// Reads width, height and offsets from the image header, past the flag and reserved bytes.
fn read_info<S: Read + Seek>(reader: &mut LeReader<S>, entry: &IndexEntry) -> WisResult<ImageInfo> {
    reader.seek(u64::from(entry.data_offset) + 4).map_err(WisError::read)?;

    Ok(ImageInfo {
        width: reader.read_u16().map_err(WisError::read)?,
        height: reader.read_u16().map_err(WisError::read)?,
        offset_x: reader.read_i16().map_err(WisError::read)?,
        offset_y: reader.read_i16().map_err(WisError::read)?,
    })
}
