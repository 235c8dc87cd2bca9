//! This module defines the canonical, type-safe representation of the value
//! size classes used by the conflib wire format, together with the classifier
//! that maps a value to its minimal class.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bits the size field occupies on the wire.
pub const SIZE_BITS: u32 = 3;

/// The bucket that selects how many bits a value occupies.
///
/// The discriminant is the raw 3-bit value stored on the wire. The encoder only
/// ever emits the seven classes in [`SizeClass::ALL`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SizeClass {
    /// The value is always 0 and takes no bits.
    Nil = 0,
    Bits1 = 1,
    Bits2 = 2,
    Bits4 = 3,
    Bits8 = 4,
    Bits16 = 5,
    Bits32 = 6,
    /// A size field of 7 declares a 64-bit value field. Only its low 32 bits
    /// are kept when decoding.
    Bits64 = 7,
}

impl SizeClass {
    /// Every class the classifier can produce, ordered from narrowest to widest.
    pub const ALL: [SizeClass; 7] = [
        Self::Nil,
        Self::Bits1,
        Self::Bits2,
        Self::Bits4,
        Self::Bits8,
        Self::Bits16,
        Self::Bits32,
    ];

    /// Returns the smallest class able to hold `value`.
    pub fn classify(value: u32) -> Self {
        match u32::BITS - value.leading_zeros() {
            0 => Self::Nil,
            1 => Self::Bits1,
            2 => Self::Bits2,
            3..=4 => Self::Bits4,
            5..=8 => Self::Bits8,
            9..=16 => Self::Bits16,
            _ => Self::Bits32,
        }
    }

    /// The number of value bits this class stores.
    pub fn width(self) -> u32 {
        match self {
            Self::Nil => 0,
            other => 1 << (other as u8 - 1),
        }
    }

    /// Interprets a raw size field. `None` if `raw` does not fit in 3 bits.
    pub fn from_raw(raw: u8) -> Option<Self> {
        (raw <= 0x7).then(|| Self::from_field(raw))
    }

    /// Interprets the low 3 bits of `raw`. Every bit pattern names a class.
    pub fn from_field(raw: u8) -> Self {
        match raw & 0x7 {
            0 => Self::Nil,
            1 => Self::Bits1,
            2 => Self::Bits2,
            3 => Self::Bits4,
            4 => Self::Bits8,
            5 => Self::Bits16,
            6 => Self::Bits32,
            _ => Self::Bits64,
        }
    }

    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

/// Free-function form of [`SizeClass::classify`].
pub fn classify(value: u32) -> SizeClass {
    SizeClass::classify(value)
}

/// Free-function form of [`SizeClass::width`].
pub fn width_of(class: SizeClass) -> u32 {
    class.width()
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}b", self.width())
    }
}
