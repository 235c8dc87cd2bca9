//! This module contains the pure, stateless kernels for reading and writing an
//! arbitrary-width unsigned field at an arbitrary bit offset inside a byte buffer.
//!
//! Every access goes through an 8-byte little-endian window that starts at the
//! byte containing the target bit. Fields are stored least-significant-bit first.
//! Because the window is shifted by at most 7 bits, a field can be at most 56 bits
//! wide; the widest field the entry codec uses is 43 bits.
//!
//! Writes are read-modify-write on the whole window so that a field never
//! disturbs neighbouring bits that share its bytes. This module is panic-free.

use crate::error::{ConflibError, Result};

//==================================================================================
// 1. Constants
//==================================================================================

/// Size of the load/store window, and of every growth step of a buffer.
pub const WINDOW_BYTES: usize = 8;

/// The widest field that fits a window after the worst-case 7-bit sub-offset.
pub const MAX_FIELD_BITS: u32 = 56;

//==================================================================================
// 2. Private Helpers
//==================================================================================

#[inline]
fn low_mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[inline]
fn check_width(width: u32) -> Result<()> {
    if width > MAX_FIELD_BITS {
        return Err(ConflibError::FieldTooWide(width));
    }
    Ok(())
}

/// Borrows the 8-byte window that holds `bit_offset`, or reports truncation.
#[inline]
fn window_range(len: usize, bit_offset: usize, width: u32) -> Result<std::ops::Range<usize>> {
    let start = bit_offset >> 3;
    let end = start + WINDOW_BYTES;
    if end > len {
        return Err(ConflibError::TruncatedInput {
            bit_offset,
            width,
            available: len.saturating_sub(start),
        });
    }
    Ok(start..end)
}

//==================================================================================
// 3. Public API
//==================================================================================

/// Reads a `width`-bit field starting at `bit_offset`.
///
/// The buffer must hold a full window from the field's first byte; callers that
/// decode a stream pad it with [`WINDOW_BYTES`] zero bytes first. A short buffer
/// yields [`ConflibError::TruncatedInput`] instead of an out-of-bounds read.
pub fn read_field(buffer: &[u8], bit_offset: usize, width: u32) -> Result<u64> {
    check_width(width)?;
    let range = window_range(buffer.len(), bit_offset, width)?;

    let mut raw = [0u8; WINDOW_BYTES];
    raw.copy_from_slice(&buffer[range]);
    let window = u64::from_le_bytes(raw);

    Ok((window >> (bit_offset & 0x7)) & low_mask(width))
}

/// Writes the low `width` bits of `value` at `bit_offset` into a fixed-size slice.
///
/// Bits of `value` above `width` are dropped. Fails with
/// [`ConflibError::TruncatedInput`] if the slice cannot hold the window.
pub fn write_field_in_place(
    buffer: &mut [u8],
    bit_offset: usize,
    width: u32,
    value: u64,
) -> Result<()> {
    check_width(width)?;
    let range = window_range(buffer.len(), bit_offset, width)?;
    let slot = &mut buffer[range];

    let mut raw = [0u8; WINDOW_BYTES];
    raw.copy_from_slice(slot);
    let mut window = u64::from_le_bytes(raw);

    let shift = bit_offset & 0x7;
    let mask = low_mask(width) << shift;
    window &= !mask;
    window |= (value << shift) & mask;

    slot.copy_from_slice(&window.to_le_bytes());
    Ok(())
}

/// Writes a field into a growable buffer, extending it in [`WINDOW_BYTES`]
/// steps until the target window fits.
pub fn write_field(buffer: &mut Vec<u8>, bit_offset: usize, width: u32, value: u64) -> Result<()> {
    check_width(width)?;
    grow_to(buffer, (bit_offset >> 3) + WINDOW_BYTES);
    write_field_in_place(buffer, bit_offset, width, value)
}

/// Zero-extends `buffer` in whole windows until it is at least `min_len` bytes.
pub fn grow_to(buffer: &mut Vec<u8>, min_len: usize) {
    while buffer.len() < min_len {
        buffer.extend_from_slice(&[0u8; WINDOW_BYTES]);
    }
}
