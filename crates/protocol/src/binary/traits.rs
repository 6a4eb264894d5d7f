//! Traits for binary serialization and deserialization

use crate::binary::DecodeLimits;
use crate::error::WireError;
use std::io::{Read, Write};

/// Trait for records that can be read from the container format
pub trait BinaryRead: Sized {
    /// Read one record, enforcing the field size limits
    fn read_from<R: Read>(reader: &mut R, limits: &DecodeLimits) -> Result<Self, WireError>;
}

/// Trait for records that can be written to the container format
pub trait BinaryWrite {
    /// Write this record to a binary writer
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), WireError>;

    /// Get the size in bytes when serialized
    fn serialized_size(&self) -> usize;
}
