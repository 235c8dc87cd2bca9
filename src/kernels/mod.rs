//! This module serves as the public API for the collection of pure, stateless
//! bit-level kernels that the `Container` and the in-place `Library` are built on.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Layer 1: Field access at arbitrary bit offsets
pub mod bit_cursor;

/// Layer 2: Entry framing
pub mod entry_codec;

/// Layer 3: Bit-granular moves for in-place editing
pub mod bitmove;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use bit_cursor::{read_field, write_field, MAX_FIELD_BITS, WINDOW_BYTES};
pub use entry_codec::{decode_one, encode_one, Frame};
