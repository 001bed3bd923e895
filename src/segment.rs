//! A segment pairs one [`Store`] and one [`Index`] under a shared base
//! offset. It is the unit at which the log enforces size limits and rolls
//! over to a new active segment.
//!
//! Recovering `next_offset` from an existing segment is just "read the
//! index's last entry": if it has one at relative offset `r`, the segment
//! already holds records `[base_offset, base_offset + r]`, so the next
//! append is assigned `base_offset + r + 1`. An empty index means the
//! segment (however long its store file is) has never completed a write, so
//! `next_offset` falls back to `base_offset`.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::Config;
use crate::error::{IndexError, ReadError};
use crate::index::Index;
use crate::record::Record;
use crate::store::Store;

fn store_path(dir: &Path, base_offset: u64) -> PathBuf {
    dir.join(format!("{base_offset}.store"))
}

fn index_path(dir: &Path, base_offset: u64) -> PathBuf {
    dir.join(format!("{base_offset}.index"))
}

pub struct Segment {
    store: Store,
    index: Index,
    base_offset: u64,
    next_offset: u64,
    config: Config,
}

impl Segment {
    /// Open or create the segment rooted at `base_offset` within `directory`.
    pub fn new(directory: &Path, base_offset: u64, config: Config) -> std::io::Result<Self> {
        let store_file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(store_path(directory, base_offset))?;
        let store = Store::new(store_file, store_path(directory, base_offset))?;

        let index_file = open_or_create(&index_path(directory, base_offset))?;
        let index = Index::new(
            index_file,
            index_path(directory, base_offset),
            config.max_index_bytes,
        )?;

        let next_offset = match index.read(-1) {
            Ok((rel_offset, _)) => base_offset + rel_offset as u64 + 1,
            Err(IndexError::Eof) => base_offset,
            Err(e) => return Err(e.into()),
        };

        debug!("segment {base_offset} opened at {directory:?}, next_offset={next_offset}");

        Ok(Self {
            store,
            index,
            base_offset,
            next_offset,
            config,
        })
    }

    /// Assign `record` the next offset, append it, and return that offset.
    pub fn write(&mut self, mut record: Record) -> std::io::Result<u64> {
        let cursor = self.next_offset;
        record.offset = cursor;

        let encoded = record.encode();
        let (_, position) = self.store.write(&encoded)?;

        let rel_offset = (cursor - self.base_offset) as u32;
        self.index.write(rel_offset, position)?;

        self.next_offset += 1;
        Ok(cursor)
    }

    /// Read the record previously written at `offset`.
    pub fn read(&self, offset: u64) -> Result<Record, ReadError> {
        let rel_offset: i64 = offset
            .checked_sub(self.base_offset)
            .and_then(|r| i64::try_from(r).ok())
            .ok_or(ReadError::OffsetOutOfRange { offset })?;
        let (_, position) = self
            .index
            .read(rel_offset)
            .map_err(|_| ReadError::OffsetOutOfRange { offset })?;
        let bytes = self.store.read(position)?;
        Ok(Record::decode(&bytes)?)
    }

    /// True once either the store or the index has reached its configured cap.
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.max_store_bytes
            || self.index.size() >= self.config.max_index_bytes
    }

    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// The underlying store, exposed so the log's bulk reader can stream raw
    /// frames without going through record decoding.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Close the index (performing its clean-shutdown truncate) then the store.
    pub fn close(&mut self) -> std::io::Result<()> {
        self.index.close()?;
        self.store.close()
    }

    /// Close, then delete both backing files.
    pub fn remove(mut self) -> std::io::Result<()> {
        self.close()?;
        std::fs::remove_file(self.index.name())?;
        std::fs::remove_file(self.store.name())?;
        Ok(())
    }
}

fn open_or_create(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
}
