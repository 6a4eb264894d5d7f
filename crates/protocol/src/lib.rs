//! cryptoinfra Protocol Types
//!
//! This crate contains the wire records of the streaming container:
//! - the [`Preamble`] naming the key-exchange and cipher algorithms
//! - [`ChunkRecord`]s carrying encrypted payload
//! - the MessagePack-based binary encoding both use
//!
//! This crate contains NO cryptographic operations.
//! It is purely focused on data structures and serialization.

pub mod binary;
pub mod chunk;
pub mod error;
pub mod preamble;

// Re-export commonly used types
pub use binary::{BinaryRead, BinaryWrite, DecodeLimits, DEFAULT_MAX_FIELD_LEN};
pub use chunk::{chunk_size, write_chunk, ChunkRecord};
pub use error::WireError;
pub use preamble::Preamble;
