//! MessagePack framing for container records
//!
//! Records only need arrays, nil, booleans, byte strings and UTF-8 strings.
//! Encoding goes through `rmp`, which always picks the most compact width;
//! readers accept every width. An empty byte string is written as `nil`, and
//! `nil` reads back as empty. Field lengths are checked against the
//! [`DecodeLimits`] before anything is allocated.

use crate::binary::{read_bytes, DecodeLimits};
use crate::error::WireError;
use rmp::decode::{read_marker, RmpRead};
use rmp::{encode, Marker};
use std::io::{Read, Write};

/// Size of the header that precedes a byte string of `len` bytes
pub fn bin_header_size(len: usize) -> usize {
    match len {
        0 => 1,
        1..=0xff => 2,
        0x100..=0xffff => 3,
        _ => 5,
    }
}

/// Size of the header that precedes a string of `len` bytes
pub fn str_header_size(len: usize) -> usize {
    match len {
        0..=31 => 1,
        32..=0xff => 2,
        0x100..=0xffff => 3,
        _ => 5,
    }
}

fn wire_len(len: usize) -> Result<u32, WireError> {
    u32::try_from(len).map_err(|_| WireError::Unencodable(len))
}

fn unexpected(expected: &'static str, marker: Marker) -> WireError {
    WireError::UnexpectedMarker {
        expected,
        found: marker.to_u8(),
    }
}

/// Write an array header for `len` elements
pub fn write_array_header<W: Write>(writer: &mut W, len: usize) -> Result<(), WireError> {
    encode::write_array_len(writer, wire_len(len)?)?;
    Ok(())
}

pub fn write_bool<W: Write>(writer: &mut W, value: bool) -> Result<(), WireError> {
    encode::write_bool(writer, value)?;
    Ok(())
}

/// Write a byte string, or `nil` when it is empty
pub fn write_bin<W: Write>(writer: &mut W, data: &[u8]) -> Result<(), WireError> {
    if data.is_empty() {
        encode::write_nil(writer)?;
        return Ok(());
    }
    wire_len(data.len())?;
    encode::write_bin(writer, data)?;
    Ok(())
}

pub fn write_str<W: Write>(writer: &mut W, value: &str) -> Result<(), WireError> {
    wire_len(value.len())?;
    encode::write_str(writer, value)?;
    Ok(())
}

/// Decode an array length from an already consumed marker
pub fn array_len_from_marker<R: Read>(reader: &mut R, marker: Marker) -> Result<usize, WireError> {
    match marker {
        Marker::FixArray(len) => Ok(len as usize),
        Marker::Array16 => Ok(reader.read_data_u16()? as usize),
        Marker::Array32 => Ok(reader.read_data_u32()? as usize),
        other => Err(unexpected("array", other)),
    }
}

/// Read an array header and require exactly `expected` elements
pub fn expect_array<R: Read>(reader: &mut R, expected: usize) -> Result<(), WireError> {
    let marker = read_marker(reader)?;
    expect_array_from_marker(reader, marker, expected)
}

/// Same as [`expect_array`] for a marker the caller already consumed
pub fn expect_array_from_marker<R: Read>(
    reader: &mut R,
    marker: Marker,
    expected: usize,
) -> Result<(), WireError> {
    let got = array_len_from_marker(reader, marker)?;
    if got != expected {
        return Err(WireError::ArrayLength { expected, got });
    }
    Ok(())
}

pub fn read_bool<R: Read>(reader: &mut R) -> Result<bool, WireError> {
    match read_marker(reader)? {
        Marker::True => Ok(true),
        Marker::False => Ok(false),
        other => Err(unexpected("bool", other)),
    }
}

/// Read a raw payload (bin, str or nil) as bytes
pub fn read_bin<R: Read>(reader: &mut R, limits: &DecodeLimits) -> Result<Vec<u8>, WireError> {
    let len = match read_marker(reader)? {
        Marker::Null => return Ok(Vec::new()),
        Marker::FixStr(len) => len as usize,
        Marker::Bin8 | Marker::Str8 => reader.read_data_u8()? as usize,
        Marker::Bin16 | Marker::Str16 => reader.read_data_u16()? as usize,
        Marker::Bin32 | Marker::Str32 => reader.read_data_u32()? as usize,
        other => return Err(unexpected("bytes", other)),
    };
    if len > limits.max_field_len {
        return Err(WireError::FieldTooLarge {
            len,
            max: limits.max_field_len,
        });
    }
    Ok(read_bytes(reader, len)?)
}

pub fn read_str<R: Read>(reader: &mut R, limits: &DecodeLimits) -> Result<String, WireError> {
    let bytes = read_bin(reader, limits)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const NIL: u8 = 0xc0;
    const TRUE: u8 = 0xc3;
    const FALSE: u8 = 0xc2;
    const BIN8: u8 = 0xc4;
    const BIN16: u8 = 0xc5;
    const BIN32: u8 = 0xc6;
    const STR8: u8 = 0xd9;

    #[test]
    fn test_bin_widths() {
        let mut buf = Vec::new();
        write_bin(&mut buf, &[0xaa; 3]).unwrap();
        assert_eq!(buf, vec![BIN8, 3, 0xaa, 0xaa, 0xaa]);

        let mut buf = Vec::new();
        write_bin(&mut buf, &[0u8; 300]).unwrap();
        assert_eq!(&buf[..3], &[BIN16, 0x01, 0x2c]);
        assert_eq!(buf.len(), 300 + bin_header_size(300));

        let mut buf = Vec::new();
        write_bin(&mut buf, &[0u8; 70_000]).unwrap();
        assert_eq!(&buf[..5], &[BIN32, 0x00, 0x01, 0x11, 0x70]);
        let decoded = read_bin(&mut Cursor::new(buf), &DecodeLimits::default()).unwrap();
        assert_eq!(decoded.len(), 70_000);
    }

    #[test]
    fn test_empty_bin_is_nil() {
        let mut buf = Vec::new();
        write_bin(&mut buf, &[]).unwrap();
        assert_eq!(buf, vec![NIL]);

        let decoded = read_bin(&mut Cursor::new(buf), &DecodeLimits::default()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_str_widths() {
        let mut buf = Vec::new();
        write_str(&mut buf, "x448").unwrap();
        assert_eq!(buf, vec![0xa4, b'x', b'4', b'4', b'8']);

        let long = "a".repeat(40);
        let mut buf = Vec::new();
        write_str(&mut buf, &long).unwrap();
        assert_eq!(&buf[..2], &[STR8, 40]);
        assert_eq!(buf.len(), 40 + str_header_size(40));
        let decoded = read_str(&mut Cursor::new(buf), &DecodeLimits::default()).unwrap();
        assert_eq!(decoded, long);
    }

    #[test]
    fn test_field_limit_checked_before_payload() {
        let mut buf = Vec::new();
        write_bin(&mut buf, &[1u8; 64]).unwrap();
        let err = read_bin(&mut Cursor::new(buf), &DecodeLimits::new(63)).unwrap_err();
        assert!(matches!(err, WireError::FieldTooLarge { len: 64, max: 63 }));

        // A huge declared length with no payload behind it
        let header = vec![BIN32, 0xff, 0xff, 0xff, 0xff];
        let err = read_bin(&mut Cursor::new(header), &DecodeLimits::default()).unwrap_err();
        assert!(matches!(err, WireError::FieldTooLarge { len: 0xffff_ffff, .. }));
    }

    #[test]
    fn test_bool_rejects_other_markers() {
        assert!(read_bool(&mut Cursor::new(vec![TRUE])).unwrap());
        assert!(!read_bool(&mut Cursor::new(vec![FALSE])).unwrap());
        let err = read_bool(&mut Cursor::new(vec![NIL])).unwrap_err();
        assert!(matches!(err, WireError::UnexpectedMarker { found: NIL, .. }));

        let mut buf = Vec::new();
        write_bool(&mut buf, true).unwrap();
        assert_eq!(buf, vec![TRUE]);
    }

    #[test]
    fn test_array_header_forms() {
        let mut buf = Vec::new();
        write_array_header(&mut buf, 3).unwrap();
        assert_eq!(buf, vec![0x93]);
        expect_array(&mut Cursor::new(buf), 3).unwrap();

        let wide = vec![0xdc, 0x00, 0x03];
        expect_array(&mut Cursor::new(wide), 3).unwrap();

        let err = expect_array(&mut Cursor::new(vec![0x92]), 3).unwrap_err();
        assert!(matches!(
            err,
            WireError::ArrayLength {
                expected: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn test_short_length_prefix_is_eof() {
        let err = read_bin(&mut Cursor::new(vec![BIN16, 0x01]), &DecodeLimits::default())
            .unwrap_err();
        assert!(err.is_eof());

        let err = expect_array(&mut Cursor::new(Vec::new()), 3).unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn test_invalid_utf8() {
        let buf = vec![0xa2, 0xff, 0xfe];
        let err = read_str(&mut Cursor::new(buf), &DecodeLimits::default()).unwrap_err();
        assert!(matches!(err, WireError::InvalidUtf8(_)));
    }
}
