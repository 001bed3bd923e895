//! The top-level commit log: an ordered collection of [`Segment`]s, one of
//! which is always active and receiving writes. Handles recovery from an
//! existing directory, segment rollover, random reads, truncation, and bulk
//! streaming.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::{debug, warn};

use crate::config::Config;
use crate::error::ReadError;
use crate::record::Record;
use crate::segment::Segment;

/// State protected by the log's reader/writer lock: the ordered segment
/// collection. The active segment is always `segments.last()`.
struct State {
    segments: Vec<Segment>,
}

impl State {
    fn active(&mut self) -> &mut Segment {
        self.segments
            .last_mut()
            .expect("log always has at least one segment")
    }

    fn active_ref(&self) -> &Segment {
        self.segments
            .last()
            .expect("log always has at least one segment")
    }

    fn find(&self, offset: u64) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| s.base_offset() <= offset && offset < s.next_offset())
    }
}

/// The append-only, segmented commit log.
///
/// Multiple threads may hold a `&Log` concurrently: writes are serialized by
/// an internal reader/writer lock, while reads proceed in parallel with each
/// other (but not with writes or truncation). See the crate-level docs for
/// the full concurrency story.
pub struct Log {
    directory: PathBuf,
    config: Config,
    state: RwLock<State>,
}

impl Log {
    /// Open the log rooted at `directory`, recovering any existing segments.
    ///
    /// `directory` is created if it does not already exist.
    pub fn open(directory: impl Into<PathBuf>, config: Config) -> io::Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        let config = config.resolved();

        let segments = recover_segments(&directory, config)?;
        Ok(Self {
            directory,
            config,
            state: RwLock::new(State { segments }),
        })
    }

    /// Append `record`, assigning it the next offset, and return that offset.
    pub fn write(&self, record: Record) -> io::Result<u64> {
        let mut state = self.state.write().unwrap();
        let offset = state.active().write(record)?;

        if state.active_ref().is_maxed() {
            let new_base = offset + 1;
            debug!("segment at offset {offset} maxed, rolling over to {new_base}");
            let segment = Segment::new(&self.directory, new_base, self.config)?;
            state.segments.push(segment);
        }

        Ok(offset)
    }

    /// Read the record at `offset`.
    pub fn read(&self, offset: u64) -> Result<Record, ReadError> {
        let state = self.state.read().unwrap();
        let segment = state
            .find(offset)
            .filter(|s| s.next_offset() > offset)
            .ok_or(ReadError::OffsetOutOfRange { offset })?;
        segment.read(offset)
    }

    /// The base offset of the first retained segment.
    pub fn read_lowest_offset(&self) -> u64 {
        let state = self.state.read().unwrap();
        state
            .segments
            .first()
            .expect("at least one segment")
            .base_offset()
    }

    /// The offset of the last written record, or `0` if none has ever been written.
    pub fn read_highest_offset(&self) -> u64 {
        let state = self.state.read().unwrap();
        let next = state
            .segments
            .last()
            .expect("at least one segment")
            .next_offset();
        next.saturating_sub(1)
    }

    /// Remove every segment entirely at or below `offset`.
    pub fn truncate_lowest(&self, offset: u64) -> io::Result<()> {
        let mut state = self.state.write().unwrap();
        let old = std::mem::take(&mut state.segments);

        let mut retained = Vec::with_capacity(old.len());
        for segment in old {
            if segment.next_offset() <= offset + 1 {
                debug!(
                    "truncating segment {} (cutoff {offset})",
                    segment.base_offset()
                );
                segment.remove()?;
            } else {
                retained.push(segment);
            }
        }
        state.segments = retained;
        Ok(())
    }

    /// A lazy, sequential byte stream of every segment's raw store contents,
    /// concatenated in base-offset order. Yields the same length-prefixed
    /// frames the store writes -- callers must re-parse them into records.
    pub fn reader(&self) -> Reader<'_> {
        let state = self.state.read().unwrap();
        let offsets: Vec<u64> = state.segments.iter().map(Segment::base_offset).collect();
        Reader {
            log: self,
            offsets,
            current: 0,
            position: 0,
        }
    }

    /// Close every segment, flushing buffers and truncating indexes down to size.
    pub fn close(&self) -> io::Result<()> {
        let mut state = self.state.write().unwrap();
        for segment in &mut state.segments {
            segment.close()?;
        }
        Ok(())
    }

    /// Close the log, then delete its entire directory.
    pub fn remove(self) -> io::Result<()> {
        self.close()?;
        fs::remove_dir_all(&self.directory)
    }

    /// Remove the log's directory and reopen a fresh, empty log in its place.
    pub fn reset(self) -> io::Result<Self> {
        let directory = self.directory.clone();
        let config = self.config;
        self.remove()?;
        Self::open(directory, config)
    }
}

/// Recovers the segment collection from an on-disk directory.
///
/// Lists `directory`, parses each file's stem as a decimal base offset,
/// de-duplicates and sorts ascending, then opens one segment per offset --
/// each exactly once. (A past implementation of this recovery loop advanced
/// its index twice per iteration and silently skipped every other segment;
/// this version iterates the sorted offsets directly and cannot repeat that
/// mistake.)
fn recover_segments(directory: &Path, config: Config) -> io::Result<Vec<Segment>> {
    let mut base_offsets: Vec<u64> = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match stem.parse::<u64>() {
            Ok(offset) => base_offsets.push(offset),
            Err(_) => warn!("skipping non-numeric entry in log directory: {path:?}"),
        }
    }
    base_offsets.sort_unstable();
    base_offsets.dedup();

    let mut segments = Vec::with_capacity(base_offsets.len().max(1));
    for base_offset in base_offsets {
        segments.push(Segment::new(directory, base_offset, config)?);
    }

    if segments.is_empty() {
        segments.push(Segment::new(directory, config.initial_offset, config)?);
    }

    Ok(segments)
}

/// Lazy, sequential byte stream over every segment's raw store contents, in
/// base-offset order. Returned by [`Log::reader`].
pub struct Reader<'a> {
    log: &'a Log,
    offsets: Vec<u64>,
    current: usize,
    position: u64,
}

impl io::Read for Reader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let Some(&base_offset) = self.offsets.get(self.current) else {
                return Ok(0);
            };

            let state = self.log.state.read().unwrap();
            let Some(segment) = state
                .segments
                .iter()
                .find(|s| s.base_offset() == base_offset)
            else {
                // Segment was truncated away since the reader was created; skip it.
                drop(state);
                self.current += 1;
                self.position = 0;
                continue;
            };

            let n = segment.store().read_at(buf, self.position)?;
            if n == 0 {
                drop(state);
                self.current += 1;
                self.position = 0;
                continue;
            }
            self.position += n as u64;
            return Ok(n);
        }
    }
}
