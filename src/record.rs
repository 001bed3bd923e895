//! The record format appended to, and read back from, a [`crate::store::Store`].
//!
//! A record carries an opaque payload and an opaque timestamp, both chosen by
//! the application, plus the offset the engine assigned it at append time.
//! The encoding is a small hand-rolled, big-endian layout rather than an
//! external serialization crate: the wire format is part of this crate's
//! contract, and must not silently drift with a dependency upgrade.
//!
//! ```text
//! record := offset:u64(BE) | timestamp_len:u32(BE) | timestamp:u8[timestamp_len] | payload:u8[..]
//! ```

use crate::error::DecodeError;

/// A single entry in the commit log.
///
/// `payload` and `timestamp` are both opaque byte strings; the engine never
/// interprets their contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    /// Assigned by the engine at append time. Ignored on encode of a record
    /// that is about to be written -- the caller-supplied value is
    /// overwritten by [`crate::segment::Segment::write`].
    pub offset: u64,
    pub timestamp: Vec<u8>,
    pub payload: Vec<u8>,
}

/// Minimum size of an encoded record: the 8-byte offset plus the 4-byte
/// timestamp length prefix.
const HEADER_LEN: usize = 8 + 4;

impl Record {
    /// Encode this record to its on-disk byte representation.
    ///
    /// The returned bytes are exactly what [`crate::store::Store::write`]
    /// should be given as a payload; the store adds its own 8-byte frame
    /// length prefix on top.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.timestamp.len() + self.payload.len());
        buf.extend_from_slice(&self.offset.to_be_bytes());
        buf.extend_from_slice(&(self.timestamp.len() as u32).to_be_bytes());
        buf.extend_from_slice(&self.timestamp);
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Decode a record previously produced by [`Self::encode`].
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_LEN {
            return Err(DecodeError::TooShort {
                len: buf.len(),
                min: HEADER_LEN,
            });
        }

        let offset = u64::from_be_bytes(buf[0..8].try_into().unwrap());
        let timestamp_len = u32::from_be_bytes(buf[8..12].try_into().unwrap());
        let rest = &buf[HEADER_LEN..];
        if timestamp_len as usize > rest.len() {
            return Err(DecodeError::TimestampOverrun {
                declared: timestamp_len,
                available: rest.len(),
            });
        }

        let (timestamp, payload) = rest.split_at(timestamp_len as usize);
        Ok(Self {
            offset,
            timestamp: timestamp.to_vec(),
            payload: payload.to_vec(),
        })
    }
}
