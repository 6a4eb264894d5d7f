//! Chunk records carrying the encrypted payload
//!
//! ```text
//! ┌────────────┬──────────────────┬────────────────┐
//! │ last (bool)│ nonce (bin | nil)│ data (bin|nil) │   fixarray(3)
//! └────────────┴──────────────────┴────────────────┘
//! ```
//!
//! A stream carries zero or more records with `last = false` followed by
//! exactly one record with `last = true`. The nonce is only populated by
//! AEAD ciphers.

use crate::binary::msgpack::{
    bin_header_size, expect_array, expect_array_from_marker, read_bin, read_bool,
    write_array_header, write_bin, write_bool,
};
use crate::binary::{try_read_u8, BinaryRead, BinaryWrite, DecodeLimits};
use crate::error::WireError;
use rmp::Marker;
use std::io::{Read, Write};

/// Number of fields in a chunk record
pub const CHUNK_FIELDS: usize = 3;

/// One framed unit of ciphertext
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkRecord {
    /// Marks the terminal record of the stream
    pub last: bool,
    /// Per-chunk nonce plus associated data (AEAD only)
    pub nonce: Vec<u8>,
    /// Encrypted payload
    pub data: Vec<u8>,
}

impl ChunkRecord {
    pub fn new(last: bool, nonce: Vec<u8>, data: Vec<u8>) -> Self {
        Self { last, nonce, data }
    }

    /// Read the next record, or `None` if the input ends cleanly before it
    pub fn read_next<R: Read>(
        reader: &mut R,
        limits: &DecodeLimits,
    ) -> Result<Option<Self>, WireError> {
        let Some(marker) = try_read_u8(reader)? else {
            return Ok(None);
        };
        expect_array_from_marker(reader, Marker::from_u8(marker), CHUNK_FIELDS)?;
        Self::read_fields(reader, limits).map(Some)
    }

    fn read_fields<R: Read>(reader: &mut R, limits: &DecodeLimits) -> Result<Self, WireError> {
        let last = read_bool(reader)?;
        let nonce = read_bin(reader, limits)?;
        let data = read_bin(reader, limits)?;
        Ok(Self { last, nonce, data })
    }
}

/// Write a chunk record from borrowed parts
///
/// Lets the stream writer emit records straight from its working buffers.
pub fn write_chunk<W: Write>(
    writer: &mut W,
    last: bool,
    nonce: &[u8],
    data: &[u8],
) -> Result<(), WireError> {
    write_array_header(writer, CHUNK_FIELDS)?;
    write_bool(writer, last)?;
    write_bin(writer, nonce)?;
    write_bin(writer, data)
}

/// Encoded size of a chunk record with the given part lengths
pub fn chunk_size(nonce_len: usize, data_len: usize) -> usize {
    2 + bin_header_size(nonce_len) + nonce_len + bin_header_size(data_len) + data_len
}

impl BinaryRead for ChunkRecord {
    fn read_from<R: Read>(reader: &mut R, limits: &DecodeLimits) -> Result<Self, WireError> {
        expect_array(reader, CHUNK_FIELDS)?;
        Self::read_fields(reader, limits)
    }
}

impl BinaryWrite for ChunkRecord {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), WireError> {
        write_chunk(writer, self.last, &self.nonce, &self.data)
    }

    fn serialized_size(&self) -> usize {
        chunk_size(self.nonce.len(), self.data.len())
    }
}
