use core::fmt;

use mir2_core::{Error, ReadError, ReadErrorKind};

pub type WisResult<T> = Result<T, WisError>;

pub type WisError = Error<WisErrorKind>;

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WisErrorKind {
    /// Reading from the archive failed (the [`ReadError`] is attached as source).
    Read,
    /// The archive file could not be opened.
    Io,
    InvalidTrailer { reason: &'static str },
    InvalidIndex { field: &'static str, reason: &'static str },
    /// The image payload ends before its declared size.
    Truncated { index: usize },
    InvalidHeader { field: &'static str, reason: &'static str },
    NotLoaded,
    IndexOutOfRange { index: usize, count: usize },
}

impl std::error::Error for WisErrorKind {}

impl fmt::Display for WisErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read error"),
            Self::Io => write!(f, "I/O error"),
            Self::InvalidTrailer { reason } => write!(f, "invalid archive trailer: {reason}"),
            Self::InvalidIndex { field, reason } => write!(f, "invalid index entry `{field}`: {reason}"),
            Self::Truncated { index } => write!(f, "payload of image {index} is truncated"),
            Self::InvalidHeader { field, reason } => write!(f, "invalid image header `{field}`: {reason}"),
            Self::NotLoaded => write!(f, "archive is not loaded"),
            Self::IndexOutOfRange { index, count } => {
                write!(f, "image index {index} is out of range (archive holds {count} images)")
            }
        }
    }
}

pub trait WisErrorExt {
    fn read(error: ReadError) -> Self;
    fn invalid_field(context: &'static str, field: &'static str, reason: &'static str) -> Self;
    fn truncated(context: &'static str, index: usize, error: ReadError) -> Self;
}

impl WisErrorExt for WisError {
    fn read(error: ReadError) -> Self {
        Self::new(error.context, WisErrorKind::Read).with_source(error)
    }

    fn invalid_field(context: &'static str, field: &'static str, reason: &'static str) -> Self {
        Self::new(context, WisErrorKind::InvalidHeader { field, reason })
    }

    /// Lifts a failed payload read, reporting a short read as [`WisErrorKind::Truncated`].
    fn truncated(context: &'static str, index: usize, error: ReadError) -> Self {
        match error.kind() {
            ReadErrorKind::NotEnoughBytes { .. } => {
                Self::new(context, WisErrorKind::Truncated { index }).with_source(error)
            }
            _ => Self::read(error),
        }
    }
}
