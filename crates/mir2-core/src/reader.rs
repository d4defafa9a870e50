use core::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::{Error, NotEnoughBytesErr};

/// A result type for [`LeReader`] operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// An error raised by [`LeReader`].
pub type ReadError = Error<ReadErrorKind>;

/// Enum representing the different kinds of read errors.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadErrorKind {
    /// The stream ended before the requested amount of bytes could be read.
    NotEnoughBytes {
        /// Number of bytes received.
        received: usize,
        /// Number of bytes expected.
        expected: usize,
    },
    /// The reader was closed.
    Closed,
    /// The underlying source reported an I/O error (attached as source).
    Io,
}

impl std::error::Error for ReadErrorKind {}

impl fmt::Display for ReadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughBytes { received, expected } => write!(
                f,
                "not enough bytes provided to read: received {received} bytes, expected {expected} bytes"
            ),
            Self::Closed => write!(f, "reader is closed"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl NotEnoughBytesErr for ReadError {
    fn not_enough_bytes(context: &'static str, received: usize, expected: usize) -> Self {
        Self::new(context, ReadErrorKind::NotEnoughBytes { received, expected })
    }
}

fn io_err(context: &'static str, source: io::Error) -> ReadError {
    ReadError::new(context, ReadErrorKind::Io).with_source(source)
}

/// Random-access reader over a file, decoding multi-byte values as little-endian.
///
/// Reads go through a [`BufReader`]. Seeking to an absolute position discards the
/// read-ahead buffer, so the next read always reflects the new position.
///
/// Unlike a raw byte stream, composing a multi-byte value out of a truncated stream is
/// an error ([`ReadErrorKind::NotEnoughBytes`]) rather than a garbage value.
pub struct LeReader<S = File> {
    inner: Option<BufReader<S>>,
    len: u64,
}

impl<S> fmt::Debug for LeReader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeReader")
            .field("len", &self.len)
            .field("closed", &self.inner.is_none())
            .finish()
    }
}

impl LeReader<File> {
    /// Opens the file at `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> ReadResult<Self> {
        let file = File::open(path).map_err(|e| io_err("LeReader::open", e))?;
        Self::new(file)
    }
}

impl<S: Read + Seek> LeReader<S> {
    const NAME: &'static str = "LeReader";

    /// Wraps `source`, measures its length and rewinds it to the start.
    pub fn new(mut source: S) -> ReadResult<Self> {
        let len = source
            .seek(SeekFrom::End(0))
            .and_then(|len| source.rewind().map(|()| len))
            .map_err(|e| io_err(Self::NAME, e))?;

        Ok(Self {
            inner: Some(BufReader::new(source)),
            len,
        })
    }

    /// Total length of the underlying source, in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the underlying source holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` once [`LeReader::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    fn source(&mut self) -> ReadResult<&mut BufReader<S>> {
        self.inner
            .as_mut()
            .ok_or_else(|| ReadError::new(Self::NAME, ReadErrorKind::Closed))
    }

    /// Current absolute position of the cursor.
    pub fn position(&mut self) -> ReadResult<u64> {
        self.source()?.stream_position().map_err(|e| io_err(Self::NAME, e))
    }

    /// Moves the cursor to the absolute position `pos`.
    pub fn seek(&mut self, pos: u64) -> ReadResult<()> {
        // `BufReader::seek` always drops its internal buffer.
        self.source()?
            .seek(SeekFrom::Start(pos))
            .map(|_| ())
            .map_err(|e| io_err(Self::NAME, e))
    }

    /// Advances the cursor by `n` bytes without reading them.
    pub fn skip(&mut self, n: u64) -> ReadResult<()> {
        let offset = i64::try_from(n).map_err(|e| io_err(Self::NAME, io::Error::other(e)))?;

        self.source()?
            .seek_relative(offset)
            .map_err(|e| io_err(Self::NAME, e))
    }

    /// Reads one byte, or `None` at end of stream.
    pub fn read_byte(&mut self) -> ReadResult<Option<u8>> {
        let mut byte = [0u8; 1];

        loop {
            match self.source()?.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_err(Self::NAME, e)),
            }
        }
    }

    /// Fills `buf` entirely, failing if the stream ends first.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> ReadResult<()> {
        let expected = buf.len();
        let source = self.source()?;
        let mut received = 0;

        while received < expected {
            match source.read(&mut buf[received..]) {
                Ok(0) => return Err(crate::not_enough_bytes_err(Self::NAME, received, expected)),
                Ok(n) => received += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(io_err(Self::NAME, e)),
            }
        }

        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let mut bytes = [0u8; N];
        self.read_bytes(&mut bytes)?;
        Ok(bytes)
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> ReadResult<u8> {
        self.read_array::<1>().map(|[b]| b)
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> ReadResult<u16> {
        self.read_array::<2>().map(u16::from_le_bytes)
    }

    /// Reads a little-endian `i16`.
    pub fn read_i16(&mut self) -> ReadResult<i16> {
        self.read_array::<2>().map(i16::from_le_bytes)
    }

    /// Reads a little-endian 2-byte code unit (UTF-16 style character).
    pub fn read_char_code(&mut self) -> ReadResult<u16> {
        self.read_u16()
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> ReadResult<i32> {
        self.read_array::<4>().map(i32::from_le_bytes)
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> ReadResult<u32> {
        self.read_array::<4>().map(u32::from_le_bytes)
    }

    /// Reads a little-endian `u64`, as a low 32-bit word followed by a high 32-bit word.
    pub fn read_u64(&mut self) -> ReadResult<u64> {
        let low = self.read_u32()?;
        let high = self.read_u32()?;
        Ok((u64::from(high) << 32) | u64::from(low))
    }

    /// Reads a little-endian `i64`.
    pub fn read_i64(&mut self) -> ReadResult<i64> {
        self.read_u64().map(|v| i64::from_le_bytes(v.to_le_bytes()))
    }

    /// Reads a little-endian IEEE 754 `f32`.
    pub fn read_f32(&mut self) -> ReadResult<f32> {
        self.read_u32().map(f32::from_bits)
    }

    /// Reads a little-endian IEEE 754 `f64`.
    pub fn read_f64(&mut self) -> ReadResult<f64> {
        self.read_u64().map(f64::from_bits)
    }

    /// Releases the underlying source. Calling it again is a no-op.
    pub fn close(&mut self) {
        self.inner = None;
    }
}
