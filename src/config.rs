/// [`crate::log::Log`] configuration.
///
/// A zero value for either byte cap is replaced by [`Config::DEFAULT_BYTES`]
/// when the config is resolved (see [`Config::resolved`]); this mirrors how
/// the teacher crate's `Options` fills in sizing defaults rather than
/// rejecting a zero as invalid input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Cap on a segment's store size in bytes. Once reached, the segment is
    /// considered maxed.
    pub max_store_bytes: u64,
    /// Cap on a segment's index file size in bytes. The index file is
    /// pre-truncated to this size and memory-mapped at that length.
    pub max_index_bytes: u64,
    /// Base offset of the first segment when starting an empty log.
    pub initial_offset: u64,
}

impl Config {
    /// Default byte cap applied to `max_store_bytes`/`max_index_bytes` when
    /// the caller supplies zero.
    pub const DEFAULT_BYTES: u64 = 1024;

    /// Returns a copy of this config with zero-valued byte caps replaced by
    /// [`Self::DEFAULT_BYTES`].
    pub(crate) fn resolved(mut self) -> Self {
        if self.max_store_bytes == 0 {
            self.max_store_bytes = Self::DEFAULT_BYTES;
        }
        if self.max_index_bytes == 0 {
            self.max_index_bytes = Self::DEFAULT_BYTES;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_store_bytes: Self::DEFAULT_BYTES,
            max_index_bytes: Self::DEFAULT_BYTES,
            initial_offset: 0,
        }
    }
}
