//! The preamble record that opens every container
//!
//! ```text
//! ┌──────────────┬──────────────┬────────────────┐
//! │ opaque (bin) │ pk_algo (str)│ encoding (str) │   fixarray(3)
//! └──────────────┴──────────────┴────────────────┘
//! ```

use crate::binary::msgpack::{
    bin_header_size, expect_array, read_bin, read_str, str_header_size, write_array_header,
    write_bin, write_str,
};
use crate::binary::{BinaryRead, BinaryWrite, DecodeLimits};
use crate::error::WireError;
use std::io::{Read, Write};

/// Number of fields in a preamble record
pub const PREAMBLE_FIELDS: usize = 3;

/// Key-exchange metadata written once at the start of a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    /// Key-exchange ciphertext or ephemeral public value
    pub opaque: Vec<u8>,
    /// Identifier of the PK algorithm that produced `opaque`
    pub pk_algo: String,
    /// Identifier of the symmetric cipher used for the chunks
    pub encoding: String,
}

impl Preamble {
    pub fn new(opaque: Vec<u8>, pk_algo: impl Into<String>, encoding: impl Into<String>) -> Self {
        Self {
            opaque,
            pk_algo: pk_algo.into(),
            encoding: encoding.into(),
        }
    }
}

impl BinaryRead for Preamble {
    fn read_from<R: Read>(reader: &mut R, limits: &DecodeLimits) -> Result<Self, WireError> {
        expect_array(reader, PREAMBLE_FIELDS)?;
        let opaque = read_bin(reader, limits)?;
        let pk_algo = read_str(reader, limits)?;
        let encoding = read_str(reader, limits)?;
        Ok(Self {
            opaque,
            pk_algo,
            encoding,
        })
    }
}

impl BinaryWrite for Preamble {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), WireError> {
        write_array_header(writer, PREAMBLE_FIELDS)?;
        write_bin(writer, &self.opaque)?;
        write_str(writer, &self.pk_algo)?;
        write_str(writer, &self.encoding)
    }

    fn serialized_size(&self) -> usize {
        1 + bin_header_size(self.opaque.len())
            + self.opaque.len()
            + str_header_size(self.pk_algo.len())
            + self.pk_algo.len()
            + str_header_size(self.encoding.len())
            + self.encoding.len()
    }
}
