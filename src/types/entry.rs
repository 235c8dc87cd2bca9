//! The in-memory form of one packed record.

use serde::{Deserialize, Serialize};

use super::size_class::{SizeClass, SIZE_BITS};

/// Number of bits the identifier field occupies on the wire.
pub const ID_BITS: u32 = 8;

/// Bits taken by the fixed part of every entry (identifier + size field).
pub const HEADER_BITS: u32 = ID_BITS + SIZE_BITS;

/// The identifier that ends a stream. Never a user-addressable key.
pub const TERMINATOR_ID: u8 = 0;

/// One `(id, value, size class)` record.
///
/// Entries built through [`Entry::new`] always carry the minimal size class for
/// their value. Entries produced by decoding carry whatever class the stream
/// recorded, which may be wider than necessary.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry {
    pub id: u8,
    pub value: u32,
    pub size: SizeClass,
}

impl Entry {
    /// Builds a canonical entry, classifying `value`.
    pub fn new(id: u8, value: u32) -> Self {
        Self {
            id,
            value,
            size: SizeClass::classify(value),
        }
    }

    /// Bits this entry occupies on the wire: `8 + 3 + width(size)`.
    pub fn total_len(&self) -> u32 {
        HEADER_BITS + self.size.width()
    }

    /// `false` for the terminator.
    pub fn is_valid(&self) -> bool {
        self.id != TERMINATOR_ID
    }

    /// The same entry with its size class recomputed from the value.
    pub fn canonical(&self) -> Self {
        Self::new(self.id, self.value)
    }
}

/// An entry together with the bit offset it starts at inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedEntry {
    pub entry: Entry,
    pub bit_offset: usize,
}

impl LocatedEntry {
    /// Bit offset just past this entry.
    pub fn end(&self) -> usize {
        self.bit_offset + self.entry.total_len() as usize
    }
}
