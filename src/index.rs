//! A memory-mapped, fixed-width mapping from a segment-relative offset to
//! the byte position where that record's frame begins in the store.
//!
//! Entries are `12` bytes: a big-endian `u32` relative offset followed by a
//! big-endian `u64` store position. The backing file is pre-truncated to its
//! configured capacity on open so the mapping never needs to be resized; on
//! clean [`Index::close`] it is truncated back down to the number of bytes
//! actually used, which is how a later open learns how many entries are
//! valid (see the module docs on [`crate::segment`] for the recovery story).

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use crate::error::IndexError;

/// Width, in bytes, of one index entry: 4-byte relative offset + 8-byte position.
pub const ENTRY_WIDTH: u64 = 12;

pub struct Index {
    mmap: MmapMut,
    /// Logical number of bytes used -- i.e. `entries_written * ENTRY_WIDTH`.
    /// Distinct from `mmap.len()`, which is always the configured capacity.
    size: u64,
    file: File,
    path: PathBuf,
}

impl Index {
    /// Open (or initialize) an index backed by `file` at `path`.
    ///
    /// `file`'s current length becomes the recovered logical `size` -- on a
    /// freshly created file that's `0`; on a file left over from a prior,
    /// cleanly-closed lifetime it's the size that lifetime truncated down to.
    /// The file is then grown (or shrunk) to `max_index_bytes` and mapped.
    pub fn new(
        file: File,
        path: impl Into<PathBuf>,
        max_index_bytes: u64,
    ) -> Result<Self, IndexError> {
        let size = file.metadata()?.len();
        file.set_len(max_index_bytes)?;
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        Ok(Self {
            mmap,
            size,
            file,
            path: path.into(),
        })
    }

    /// Append `(rel_offset, position)` as the next entry.
    ///
    /// Returns [`IndexError::EndOfSpace`] if the mapping has no room left.
    pub fn write(&mut self, rel_offset: u32, position: u64) -> Result<(), IndexError> {
        let start = self.size;
        if start + ENTRY_WIDTH > self.mmap.len() as u64 {
            return Err(IndexError::EndOfSpace);
        }
        let start = start as usize;
        self.mmap[start..start + 4].copy_from_slice(&rel_offset.to_be_bytes());
        self.mmap[start + 4..start + 12].copy_from_slice(&position.to_be_bytes());
        self.size += ENTRY_WIDTH;
        Ok(())
    }

    /// Read an entry.
    ///
    /// `arg == -1` reads the last entry written; any other non-negative
    /// value reads the entry at that zero-based index. Returns
    /// [`IndexError::Eof`] if the index is empty or the requested entry is
    /// beyond the last one written.
    pub fn read(&self, arg: i64) -> Result<(u32, u64), IndexError> {
        if self.size == 0 {
            return Err(IndexError::Eof);
        }

        let entry_count = self.size / ENTRY_WIDTH;
        let index = if arg == -1 {
            entry_count - 1
        } else {
            arg as u64
        };

        if (index + 1) * ENTRY_WIDTH > self.size {
            return Err(IndexError::Eof);
        }

        let start = (index * ENTRY_WIDTH) as usize;
        let rel_offset = u32::from_be_bytes(self.mmap[start..start + 4].try_into().unwrap());
        let position = u64::from_be_bytes(self.mmap[start + 4..start + 12].try_into().unwrap());
        Ok((rel_offset, position))
    }

    /// Sync the mapping and file, then truncate the file back down to the
    /// logical size so a later open can recover exactly how many entries are
    /// valid.
    pub fn close(&mut self) -> Result<(), IndexError> {
        self.mmap.flush()?;
        self.file.sync_all()?;
        self.file.set_len(self.size)?;
        Ok(())
    }

    pub fn name(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}
