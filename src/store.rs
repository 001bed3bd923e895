//! An append-only, length-prefixed byte log backed by a single regular file.
//!
//! Frames are written sequentially through a buffered writer; positional
//! reads flush the buffer first so they observe writes that haven't hit the
//! file yet. The store has no notion of records -- it is purely a framed
//! byte log. [`crate::segment::Segment`] is the layer that knows how to turn
//! frames into [`crate::record::Record`]s.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::os::unix::fs::FileExt as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Width, in bytes, of the big-endian frame length prefix.
const LEN_WIDTH: u64 = 8;

struct Inner {
    file: Option<File>,
    buffer: Option<BufWriter<File>>,
    size: u64,
}

/// A single store file: `[u64 length | payload]*`, framed sequentially.
pub struct Store {
    inner: Mutex<Inner>,
    path: PathBuf,
}

fn closed() -> io::Error {
    io::Error::other("store is closed")
}

impl Store {
    /// Attach a store to an already-open file at `path`.
    ///
    /// The file's current size (by `stat`) becomes the logical tail that new
    /// writes are appended after.
    pub fn new(file: File, path: impl Into<PathBuf>) -> io::Result<Self> {
        let size = file.metadata()?.len();
        let buffer = BufWriter::new(file.try_clone()?);
        Ok(Self {
            inner: Mutex::new(Inner {
                file: Some(file),
                buffer: Some(buffer),
                size,
            }),
            path: path.into(),
        })
    }

    /// Write `payload` as a new frame, returning the number of bytes written
    /// (including the length prefix) and the byte position the frame starts
    /// at.
    pub fn write(&self, payload: &[u8]) -> io::Result<(u64, u64)> {
        let mut inner = self.inner.lock().unwrap();
        let position = inner.size;

        let buffer = inner.buffer.as_mut().ok_or_else(closed)?;
        buffer.write_all(&(payload.len() as u64).to_be_bytes())?;
        buffer.write_all(payload)?;

        let written = LEN_WIDTH + payload.len() as u64;
        inner.size += written;
        Ok((written, position))
    }

    /// Read the frame starting at `position`.
    ///
    /// Flushes the write buffer first so a read observes the most recent
    /// write even if it hasn't reached the file yet.
    pub fn read(&self, position: u64) -> io::Result<Vec<u8>> {
        let mut inner = self.inner.lock().unwrap();
        inner.buffer.as_mut().ok_or_else(closed)?.flush()?;
        let file = inner.file.as_ref().ok_or_else(closed)?;

        let mut len_buf = [0u8; LEN_WIDTH as usize];
        file.read_exact_at(&mut len_buf, position)?;
        let len = u64::from_be_bytes(len_buf);

        let mut data = vec![0u8; len as usize];
        file.read_exact_at(&mut data, position + LEN_WIDTH)?;
        Ok(data)
    }

    /// Positional read into `buf`, used by the log's bulk reader to stream
    /// raw store contents. Flushes the write buffer first, same as [`Self::read`].
    ///
    /// Like [`std::os::unix::fs::FileExt::read_at`], this may return fewer
    /// bytes than `buf.len()` without that being an error (e.g. at EOF).
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        inner.buffer.as_mut().ok_or_else(closed)?.flush()?;
        let file = inner.file.as_ref().ok_or_else(closed)?;
        loop {
            match file.read_at(buf, offset) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Flush the write buffer and close the underlying file.
    ///
    /// Subsequent `write`/`read`/`read_at` calls fail rather than silently
    /// operating on a handle that's supposed to be gone.
    pub fn close(&self) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(mut buffer) = inner.buffer.take() {
            buffer.flush()?;
        }
        inner.file.take();
        Ok(())
    }

    pub fn name(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.inner.lock().unwrap().size
    }
}
