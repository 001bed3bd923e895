use std::io;

use thiserror::Error;

/// Errors internal to the [`crate::index::Index`].
///
/// These never escape the [`crate::segment::Segment`] boundary: a segment
/// translates [`IndexError::EndOfSpace`] into "this segment is full" and
/// [`IndexError::Eof`] into "this segment's index has no entries yet".
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index's memory mapping has no room left for another entry.
    #[error("index is out of space")]
    EndOfSpace,
    /// The requested entry does not exist: the index is empty, or the
    /// requested position is beyond the last written entry.
    #[error("index entry out of range")]
    Eof,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failure to decode a [`crate::record::Record`] from its on-disk encoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame too short to contain a record header: got {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },
    #[error("declared timestamp length {declared} overruns record of {available} remaining bytes")]
    TimestampOverrun { declared: u32, available: usize },
}

/// Error returned by [`crate::log::Log::read`] and [`crate::segment::Segment::read`].
#[derive(Debug, Error)]
pub enum ReadError {
    /// No segment covers the requested offset, or the record has been
    /// truncated away.
    #[error("offset {offset} is out of range")]
    OffsetOutOfRange { offset: u64 },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<IndexError> for io::Error {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::EndOfSpace => io::Error::other("index end of space"),
            IndexError::Eof => io::Error::new(io::ErrorKind::UnexpectedEof, "index end of file"),
            IndexError::Io(e) => e,
        }
    }
}
