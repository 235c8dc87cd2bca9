//! An editor that works directly on a fixed-capacity packed buffer.
//!
//! Unlike [`Container`], which decodes into a map and re-encodes the whole
//! stream, a `Library` keeps the bytes as the source of truth: lookups scan the
//! stream, overwrites of the same size class patch bits in place, and removals
//! slide the remainder of the stream down over the hole. The bytes are always a
//! valid stream for [`Container::decode`].
//!
//! Every bit behind the last live entry is kept zero, so appending never has to
//! write a terminator and never exposes stale bits as entries.

use std::fmt;

use crate::config::ConflibConfig;
use crate::container::{validate_id, validate_value, Container};
use crate::error::{ConflibError, Result};
use crate::kernels::bit_cursor::WINDOW_BYTES;
use crate::kernels::bitmove::{clear_bits, clear_tail, copy_bits};
use crate::kernels::entry_codec::{decode_one, encode_one_in_place, Frame};
use crate::types::{Entry, LocatedEntry, HEADER_BITS};

/// Result of searching a `Library` for an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found(LocatedEntry),
    /// Not present; `end` is the bit offset where the next entry would be appended.
    Missing { end: usize },
}

/// Zero bytes kept behind the payload. An entry starting inside the payload
/// ends at most 75 bits later, so two windows cover every entry and window.
const PADDING_BYTES: usize = 2 * WINDOW_BYTES;

/// A fixed-capacity packed buffer edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    /// `capacity` payload bytes followed by [`PADDING_BYTES`] zero bytes.
    buf: Vec<u8>,
    capacity: usize,
}

impl Library {
    /// An empty library able to hold `capacity` bytes of packed entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity + PADDING_BYTES],
            capacity,
        }
    }

    pub fn with_config(config: &ConflibConfig) -> Self {
        Self::new(config.library_capacity_bytes)
    }

    /// Wraps an existing stream. The capacity is the length of `bytes`.
    ///
    /// Bits behind the first zero id are dropped, so the library holds exactly
    /// the entries [`Container::decode`] sees in `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = Vec::with_capacity(bytes.len() + PADDING_BYTES);
        buf.extend_from_slice(bytes);
        buf.extend_from_slice(&[0u8; PADDING_BYTES]);
        let mut lib = Self {
            buf,
            capacity: bytes.len(),
        };
        let used = lib.used_bits();
        if used < lib.capacity_bits() {
            log::trace!("library: clearing stale bits from bit {}", used);
        }
        clear_tail(&mut lib.buf, used);
        lib
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn capacity_bits(&self) -> usize {
        self.capacity * 8
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.capacity]
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buf.truncate(self.capacity);
        self.buf
    }

    //==============================================================================
    // Scanning
    //==============================================================================

    /// Live entries in stream order, with their bit offsets.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            lib: self,
            bit_offset: 0,
            done: false,
        }
    }

    /// Bit offset just past the last live entry.
    pub fn used_bits(&self) -> usize {
        self.entries().last().map_or(0, |located| located.end())
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    pub fn find(&self, id: u8) -> Lookup {
        let mut end = 0;
        for located in self.entries() {
            if located.entry.id == id {
                return Lookup::Found(located);
            }
            end = located.end();
        }
        Lookup::Missing { end }
    }

    pub fn get(&self, id: u8) -> Option<Entry> {
        match self.find(id) {
            Lookup::Found(located) => Some(located.entry),
            Lookup::Missing { .. } => None,
        }
    }

    /// The value stored for `id`, or 0 if absent.
    pub fn get_value(&self, id: u8) -> u32 {
        self.get(id).map_or(0, |entry| entry.value)
    }

    pub fn to_container(&self) -> Container {
        self.entries().map(|located| located.entry).collect()
    }

    //==============================================================================
    // Editing
    //==============================================================================

    /// Inserts or overwrites `id`.
    ///
    /// A value of the same size class is patched in place. Otherwise the old
    /// entry is cut out and the new one appended at the end of the stream.
    ///
    /// # Errors
    /// Besides the identifier/value checks of [`Container::add`], fails with
    /// [`ConflibError::CapacityExceeded`] before touching the buffer if the
    /// resulting stream would not fit.
    pub fn add(&mut self, id: u32, value: u64) -> Result<()> {
        let id = validate_id(id)?;
        let value = validate_value(value)?;
        let entry = Entry::new(id, value);

        match self.find(id) {
            Lookup::Found(existing) if existing.entry.size == entry.size => {
                log::trace!("library: id {} rewritten in place at bit {}", id, existing.bit_offset);
                encode_one_in_place(&mut self.buf, existing.bit_offset, &entry)?;
            }
            Lookup::Found(existing) => {
                let tail = self.used_bits();
                let required = tail - existing.entry.total_len() as usize + entry.total_len() as usize;
                self.check_fits(required)?;
                self.cut(existing, tail)?;
                let end = tail - existing.entry.total_len() as usize;
                log::trace!("library: id {} resized, moved to bit {}", id, end);
                encode_one_in_place(&mut self.buf, end, &entry)?;
            }
            Lookup::Missing { end } => {
                self.check_fits(end + entry.total_len() as usize)?;
                log::trace!("library: id {} appended at bit {}", id, end);
                encode_one_in_place(&mut self.buf, end, &entry)?;
            }
        }
        Ok(())
    }

    /// Removes `id`, compacting the stream. Returns whether it was present.
    pub fn remove(&mut self, id: u8) -> Result<bool> {
        match self.find(id) {
            Lookup::Found(existing) => {
                let tail = self.used_bits();
                self.cut(existing, tail)?;
                log::debug!("library: removed id {} ({} bits)", id, existing.entry.total_len());
                Ok(true)
            }
            Lookup::Missing { .. } => Ok(false),
        }
    }

    fn check_fits(&self, required_bits: usize) -> Result<()> {
        if required_bits > self.capacity_bits() {
            return Err(ConflibError::CapacityExceeded {
                required_bits,
                capacity_bits: self.capacity_bits(),
            });
        }
        Ok(())
    }

    /// Slides `tail - existing.end()` bits down over `existing` and zeroes the
    /// vacated bits, which leaves a zero id right after the new last entry.
    fn cut(&mut self, existing: LocatedEntry, tail: usize) -> Result<()> {
        let start = existing.bit_offset;
        let moved = tail - existing.end();
        copy_bits(&mut self.buf, existing.end(), start, moved)?;
        clear_bits(&mut self.buf, start + moved, tail)
    }
}

/// Iterator over the live entries of a [`Library`].
pub struct Entries<'a> {
    lib: &'a Library,
    bit_offset: usize,
    done: bool,
}

impl Iterator for Entries<'_> {
    type Item = LocatedEntry;

    fn next(&mut self) -> Option<LocatedEntry> {
        if self.done || self.bit_offset >= self.lib.capacity_bits() {
            return None;
        }
        match decode_one(&self.lib.buf, self.bit_offset) {
            Ok((Frame::Entry(entry), next)) => {
                let located = LocatedEntry {
                    entry,
                    bit_offset: self.bit_offset,
                };
                self.bit_offset = next;
                Some(located)
            }
            _ => {
                self.done = true;
                None
            }
        }
    }
}

//==================================================================================
// Table display
//==================================================================================

const LIBRARY_RULE: &str = "---  ----------  --------  -----  -----  ----------";

impl fmt::Display for Library {
    /// Renders the entries in stream order with their bit offsets.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " ID   Value (d)   Val (x)   vlen   tlen        bidx")?;
        writeln!(f, "{}", LIBRARY_RULE)?;

        let mut value_bits = 0u32;
        let mut total_bits = 0u32;
        for located in self.entries() {
            let entry = located.entry;
            let vlen = entry.size.width();
            let tlen = HEADER_BITS + vlen;
            writeln!(
                f,
                "{:3}  {:10}  {:08x}  {:5}  {:5}  {:10}",
                entry.id, entry.value, entry.value, vlen, tlen, located.bit_offset
            )?;
            value_bits += vlen;
            total_bits += tlen;
        }

        writeln!(f, "{}", LIBRARY_RULE)?;
        writeln!(f, "                 Totals:   {:5}  {:5}", value_bits, total_bits)
    }
}
