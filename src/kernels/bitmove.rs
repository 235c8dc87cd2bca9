//! This module contains bit-granular memory moves used when an entry is cut out
//! of a packed buffer and everything behind it has to slide down.
//!
//! It is a thin, bounds-checked layer over `bitvec`'s `Lsb0` view, which matches
//! the least-significant-bit-first order of the bit cursor.

use bitvec::prelude::*;

use crate::error::{ConflibError, Result};

fn check_span(buf_bits: usize, start: usize, len: usize) -> Result<()> {
    if start + len > buf_bits {
        return Err(ConflibError::TruncatedInput {
            bit_offset: start,
            width: len.min(u32::MAX as usize) as u32,
            available: (buf_bits.saturating_sub(start)) / 8,
        });
    }
    Ok(())
}

/// Copies `len` bits from `src_bit` to `dst_bit` within `buf`. The ranges may overlap.
pub fn copy_bits(buf: &mut [u8], src_bit: usize, dst_bit: usize, len: usize) -> Result<()> {
    let bits = buf.view_bits_mut::<Lsb0>();
    check_span(bits.len(), src_bit, len)?;
    check_span(bits.len(), dst_bit, len)?;
    bits.copy_within(src_bit..src_bit + len, dst_bit);
    Ok(())
}

/// Clears every bit in `from_bit..to_bit`.
pub fn clear_bits(buf: &mut [u8], from_bit: usize, to_bit: usize) -> Result<()> {
    let bits = buf.view_bits_mut::<Lsb0>();
    let len = to_bit.saturating_sub(from_bit);
    check_span(bits.len(), from_bit, len)?;
    bits[from_bit..from_bit + len].fill(false);
    Ok(())
}

/// Clears every bit from `from_bit` to the end of `buf`. A start past the end
/// clears nothing.
pub fn clear_tail(buf: &mut [u8], from_bit: usize) {
    if let Some(tail) = buf.view_bits_mut::<Lsb0>().get_mut(from_bit..) {
        tail.fill(false);
    }
}
