//! This module contains the kernels that frame a single entry on top of the
//! bit cursor.
//!
//! Layout, starting at the entry's first bit:
//!
//! ```text
//! [ id : 8 ][ size : 3 ][ value : width(size) ]
//! ```
//!
//! Decoding trusts the stored size field verbatim, including a size field of 7,
//! which declares a 64-bit value field of which only the low 32 bits are kept.
//! Encoding always re-derives the minimal size class from the value, so every
//! encoded stream is canonical.

use crate::error::Result;
use crate::kernels::bit_cursor::{read_field, write_field, write_field_in_place};
use crate::types::{Entry, SizeClass, HEADER_BITS, ID_BITS, SIZE_BITS, TERMINATOR_ID};

/// What one decode step found at a bit offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// A live entry.
    Entry(Entry),
    /// An id field of 0: the stream ends here.
    Terminator,
}

/// Bits loaded per entry: the header plus the widest value the decoder keeps.
pub const MAX_ENTRY_BITS: u32 = HEADER_BITS + 32;

/// Reads the entry starting at `bit_offset`.
///
/// The id, size and value fields are sliced out of a single window loaded at the
/// entry's first byte, so only that one window has to be available.
///
/// Returns the frame and the offset just past it. For [`Frame::Terminator`] the
/// returned offset points just past the id field; callers stop there. A
/// [`SizeClass::Bits64`] entry advances past its full 64-bit value field.
pub fn decode_one(buffer: &[u8], bit_offset: usize) -> Result<(Frame, usize)> {
    let window = read_field(buffer, bit_offset, MAX_ENTRY_BITS)?;

    let id = (window & 0xFF) as u8;
    if id == TERMINATOR_ID {
        return Ok((Frame::Terminator, bit_offset + ID_BITS as usize));
    }

    let size = SizeClass::from_field((window >> ID_BITS) as u8);
    let kept_bits = size.width().min(32);
    let value = ((window >> HEADER_BITS) & ((1u64 << kept_bits) - 1)) as u32;
    let entry = Entry { id, value, size };
    Ok((Frame::Entry(entry), bit_offset + entry.total_len() as usize))
}

/// Appends `entry` at `bit_offset`, growing `buffer` as needed.
///
/// The stored size class of `entry` is ignored; the minimal class for its value
/// is written instead. Returns the offset just past the written entry.
pub fn encode_one(buffer: &mut Vec<u8>, bit_offset: usize, entry: &Entry) -> Result<usize> {
    let canonical = entry.canonical();
    let (id_at, size_at, value_at) = field_offsets(bit_offset);

    write_field(buffer, id_at, ID_BITS, canonical.id as u64)?;
    write_field(buffer, size_at, SIZE_BITS, canonical.size.as_raw() as u64)?;
    write_field(buffer, value_at, canonical.size.width(), canonical.value as u64)?;

    Ok(bit_offset + canonical.total_len() as usize)
}

/// Like [`encode_one`], but into a fixed-size slice that must already hold
/// every window the entry touches.
pub fn encode_one_in_place(buffer: &mut [u8], bit_offset: usize, entry: &Entry) -> Result<usize> {
    let canonical = entry.canonical();
    let (id_at, size_at, value_at) = field_offsets(bit_offset);

    write_field_in_place(buffer, id_at, ID_BITS, canonical.id as u64)?;
    write_field_in_place(buffer, size_at, SIZE_BITS, canonical.size.as_raw() as u64)?;
    write_field_in_place(buffer, value_at, canonical.size.width(), canonical.value as u64)?;

    Ok(bit_offset + canonical.total_len() as usize)
}

#[inline]
fn field_offsets(bit_offset: usize) -> (usize, usize, usize) {
    (
        bit_offset,
        bit_offset + ID_BITS as usize,
        bit_offset + HEADER_BITS as usize,
    )
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::bit_cursor::read_field;

    #[test]
    fn test_encode_one_field_layout() {
        let mut buf = Vec::new();
        let next = encode_one(&mut buf, 0, &Entry::new(2, 1)).unwrap();
        assert_eq!(next, 12);
        assert_eq!(read_field(&buf, 0, 8).unwrap(), 2);
        assert_eq!(read_field(&buf, 8, 3).unwrap(), SizeClass::Bits1.as_raw() as u64);
        assert_eq!(read_field(&buf, 11, 1).unwrap(), 1);
    }

    #[test]
    fn test_decode_one_reads_back_entry() {
        let mut buf = Vec::new();
        let entry = Entry::new(0x42, 0xBEEF);
        let end = encode_one(&mut buf, 5, &entry).unwrap();
        let (frame, next) = decode_one(&buf, 5).unwrap();
        assert_eq!(frame, Frame::Entry(entry));
        assert_eq!(next, end);
        assert_eq!(next, 5 + 11 + 16);
    }

    #[test]
    fn test_encode_canonicalises_stored_size() {
        let wide = Entry {
            id: 7,
            value: 3,
            size: SizeClass::Bits32,
        };
        let mut buf = Vec::new();
        let next = encode_one(&mut buf, 0, &wide).unwrap();
        assert_eq!(next, 13);
        let (frame, _) = decode_one(&buf, 0).unwrap();
        assert_eq!(frame, Frame::Entry(Entry::new(7, 3)));
    }

    #[test]
    fn test_decode_trusts_wide_stored_size() {
        // id 9, size class 6 (32 bits), value 1: wider than needed.
        let mut buf = Vec::new();
        write_field(&mut buf, 0, 8, 9).unwrap();
        write_field(&mut buf, 8, 3, 6).unwrap();
        write_field(&mut buf, 11, 32, 1).unwrap();
        let (frame, next) = decode_one(&buf, 0).unwrap();
        assert_eq!(
            frame,
            Frame::Entry(Entry {
                id: 9,
                value: 1,
                size: SizeClass::Bits32
            })
        );
        assert_eq!(next, 43);
    }

    #[test]
    fn test_zero_id_is_terminator() {
        let mut buf = vec![0x00, 0xFF, 0xFF];
        buf.extend_from_slice(&[0u8; 8]);
        let (frame, _) = decode_one(&buf, 0).unwrap();
        assert_eq!(frame, Frame::Terminator);
    }

    #[test]
    fn test_raw_size_seven_keeps_low_word_and_skips_64_bits() {
        let mut buf = Vec::new();
        write_field(&mut buf, 0, 8, 3).unwrap();
        write_field(&mut buf, 8, 3, 7).unwrap();
        write_field(&mut buf, 11, 32, 0xDEAD_BEEF).unwrap();
        write_field(&mut buf, 43, 32, 0x1234_5678).unwrap();
        let (frame, next) = decode_one(&buf, 0).unwrap();
        assert_eq!(
            frame,
            Frame::Entry(Entry {
                id: 3,
                value: 0xDEAD_BEEF,
                size: SizeClass::Bits64
            })
        );
        assert_eq!(next, 75);
    }

    #[test]
    fn test_in_place_encode_matches_growing_encode() {
        let entry = Entry::new(200, 0x1234_5678);
        let mut grown = Vec::new();
        encode_one(&mut grown, 13, &entry).unwrap();

        let mut fixed = vec![0u8; grown.len()];
        encode_one_in_place(&mut fixed, 13, &entry).unwrap();
        assert_eq!(fixed, grown);
    }

    #[test]
    fn test_decode_unpadded_is_error() {
        let buf = [0x05u8];
        assert!(decode_one(&buf, 0).is_err());
    }
}
