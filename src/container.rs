//! The owned id -> entry mapping and its two whole-buffer operations.
//!
//! `decode` turns any byte string into a `Container`; `encode` packs a
//! `Container` back into a canonical byte stream. Both are pure in-memory
//! transformations built on the `entry_codec` kernels.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::{ConflibConfig, EntryOrder};
use crate::error::{ConflibError, Result};
use crate::kernels::bit_cursor::WINDOW_BYTES;
use crate::kernels::entry_codec::{decode_one, encode_one, Frame};
use crate::types::{Entry, SizeClass, HEADER_BITS, TERMINATOR_ID};

/// Largest identifier the 8-bit id field can frame.
pub const MAX_ID: u32 = u8::MAX as u32;

/// Checks a caller-supplied identifier and narrows it to the wire type.
pub fn validate_id(id: u32) -> Result<u8> {
    if id == TERMINATOR_ID as u32 || id > MAX_ID {
        return Err(ConflibError::InvalidIdentifier(id));
    }
    Ok(id as u8)
}

/// Checks a caller-supplied value against the widest size class.
pub fn validate_value(value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| ConflibError::ValueOutOfRange(value))
}

/// An in-memory mapping from identifier (1..=255) to [`Entry`].
///
/// Entries added through [`Container::add`] always carry their minimal size
/// class. Entries produced by [`Container::decode`] keep the size class the
/// stream recorded. [`Container::encode`] canonicalises either way.
#[derive(Debug, Clone, Default)]
pub struct Container {
    entries: BTreeMap<u8, Entry>,
    /// First-insertion order of the live ids. Only consulted for `EntryOrder::Insertion`.
    insertion: Vec<u8>,
    order: EntryOrder,
}

/// Two containers are equal when they hold the same entries; the iteration
/// order setting and insertion history do not take part.
impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Container {}

impl Container {
    //==============================================================================
    // Construction
    //==============================================================================

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(order: EntryOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn with_config(config: &ConflibConfig) -> Self {
        Self::with_order(config.entry_order)
    }

    pub fn order(&self) -> EntryOrder {
        self.order
    }

    //==============================================================================
    // CRUD
    //==============================================================================

    /// Inserts or overwrites the entry for `id`.
    ///
    /// # Errors
    /// [`ConflibError::InvalidIdentifier`] for `id == 0` or `id > 255`,
    /// [`ConflibError::ValueOutOfRange`] for values wider than 32 bits.
    pub fn add(&mut self, id: u32, value: u64) -> Result<()> {
        let id = validate_id(id)?;
        let value = validate_value(value)?;
        self.insert(Entry::new(id, value));
        Ok(())
    }

    /// Stores `entry` verbatim, keeping its size class.
    fn insert(&mut self, entry: Entry) -> Option<Entry> {
        let previous = self.entries.insert(entry.id, entry);
        if previous.is_none() {
            self.insertion.push(entry.id);
        }
        previous
    }

    pub fn get(&self, id: u8) -> Option<&Entry> {
        self.entries.get(&id)
    }

    /// The value stored for `id`, or 0 if absent.
    pub fn get_value(&self, id: u8) -> u32 {
        self.get(id).map_or(0, |entry| entry.value)
    }

    pub fn remove(&mut self, id: u8) -> Option<Entry> {
        let removed = self.entries.remove(&id);
        if removed.is_some() {
            self.insertion.retain(|&live| live != id);
        }
        removed
    }

    pub fn contains(&self, id: u8) -> bool {
        self.entries.contains_key(&id)
    }

    /// Every entry, keyed by identifier.
    pub fn all(&self) -> &BTreeMap<u8, Entry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion.clear();
    }

    /// Iterates entries in the container's configured [`EntryOrder`].
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Entry> + '_> {
        match self.order {
            EntryOrder::Ascending => Box::new(self.entries.values()),
            EntryOrder::Insertion => Box::new(
                self.insertion
                    .iter()
                    .filter_map(move |id| self.entries.get(id)),
            ),
        }
    }

    /// Projects out the plain id -> value mapping.
    pub fn to_value_map(&self) -> BTreeMap<u8, u32> {
        self.entries
            .iter()
            .map(|(&id, entry)| (id, entry.value))
            .collect()
    }

    /// Pretty JSON object of `{ "id": value }`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value_map())?)
    }

    /// Bits the canonical encoding of this container occupies (no padding).
    pub fn bit_len(&self) -> usize {
        self.entries
            .values()
            .map(|entry| entry.canonical().total_len() as usize)
            .sum()
    }

    //==============================================================================
    // Whole-buffer operations
    //==============================================================================

    /// Decodes `bytes` with the default configuration.
    pub fn decode(bytes: &[u8]) -> Self {
        Self::decode_with_order(bytes, EntryOrder::default())
    }

    pub fn decode_with_config(bytes: &[u8], config: &ConflibConfig) -> Self {
        Self::decode_with_order(bytes, config.entry_order)
    }

    /// Decodes `bytes` into a container. Never fails.
    ///
    /// The input is copied and padded with [`WINDOW_BYTES`] zero bytes so every
    /// window read is in bounds. The scan stops at the first zero id or once the
    /// offset leaves the original payload (from there on the id field reads zero
    /// padding). A repeated id overwrites the earlier occurrence. A size field of
    /// 7 keeps the low 32 bits of its 64-bit value and the scan continues behind it.
    pub fn decode_with_order(bytes: &[u8], order: EntryOrder) -> Self {
        let mut padded = Vec::with_capacity(bytes.len() + WINDOW_BYTES);
        padded.extend_from_slice(bytes);
        padded.extend_from_slice(&[0u8; WINDOW_BYTES]);

        let payload_bits = bytes.len() * 8;
        let mut container = Self::with_order(order);
        let mut bit_offset = 0usize;

        while bit_offset < payload_bits {
            let (frame, next) = match decode_one(&padded, bit_offset) {
                Ok(step) => step,
                Err(e) => {
                    log::warn!("decode stopped at bit {}: {}", bit_offset, e);
                    break;
                }
            };
            match frame {
                Frame::Entry(entry) => {
                    if entry.size == SizeClass::Bits64 {
                        log::warn!(
                            "id {} at bit {} has a 64-bit value field; keeping its low 32 bits",
                            entry.id,
                            bit_offset
                        );
                    }
                    log::trace!(
                        "decoded id={} value={:#x} size={:?} at bit {}",
                        entry.id,
                        entry.value,
                        entry.size,
                        bit_offset
                    );
                    if let Some(previous) = container.insert(entry) {
                        log::warn!(
                            "duplicate id {} at bit {}: value {:#x} replaces {:#x}",
                            entry.id,
                            bit_offset,
                            entry.value,
                            previous.value
                        );
                    }
                    bit_offset = next;
                }
                Frame::Terminator => break,
            }
        }

        log::debug!(
            "decoded {} entries from {} bytes ({} bits scanned)",
            container.len(),
            bytes.len(),
            bit_offset.min(payload_bits)
        );
        log_metric!("event" = "decode", "bytes" = bytes.len(), "entries" = container.len());
        container
    }

    /// Packs every entry contiguously from bit 0, in iteration order.
    ///
    /// The buffer starts as one zero window and grows in whole windows, so the
    /// id field following the last entry is left zero: the implicit terminator.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; WINDOW_BYTES];
        let mut bit_offset = 0usize;

        for entry in self.iter() {
            bit_offset = encode_one(&mut buffer, bit_offset, entry)?;
        }

        log::debug!(
            "encoded {} entries into {} bits ({} bytes)",
            self.len(),
            bit_offset,
            buffer.len()
        );
        log_metric!("event" = "encode", "bits" = bit_offset, "bytes" = buffer.len());
        Ok(buffer)
    }
}

//==================================================================================
// Conversions
//==================================================================================

impl TryFrom<&BTreeMap<u32, u64>> for Container {
    type Error = ConflibError;

    fn try_from(map: &BTreeMap<u32, u64>) -> Result<Self> {
        let mut container = Container::new();
        for (&id, &value) in map {
            container.add(id, value)?;
        }
        Ok(container)
    }
}

impl FromIterator<Entry> for Container {
    /// Collects entries verbatim. Terminator entries (id 0) are skipped.
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut container = Container::new();
        for entry in iter.into_iter().filter(Entry::is_valid) {
            container.insert(entry);
        }
        container
    }
}

//==================================================================================
// Table display
//==================================================================================

pub(crate) const TABLE_RULE: &str = "---  ----------  --------  -----  -----";

impl fmt::Display for Container {
    /// Renders the entries as a table sorted by id, with size totals and averages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " ID       Value   Hex Val  Vsize  Tsize")?;
        writeln!(f, "{}", TABLE_RULE)?;

        let mut value_bits = 0u32;
        let mut total_bits = 0u32;
        for (id, entry) in &self.entries {
            let vlen = entry.size.width();
            let tlen = HEADER_BITS + vlen;
            writeln!(
                f,
                "{:3}  {:10}  {:08x}  {:5}  {:5}",
                id, entry.value, entry.value, vlen, tlen
            )?;
            value_bits += vlen;
            total_bits += tlen;
        }

        writeln!(f, "{}", TABLE_RULE)?;
        writeln!(f, "                  Totals:  {:5}  {:5}", value_bits, total_bits)?;
        if !self.is_empty() {
            let n = self.len() as f64;
            writeln!(
                f,
                "                  Avg:     {:4.2}  {:4.2}",
                value_bits as f64 / n,
                total_bits as f64 / n
            )?;
        }
        Ok(())
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::bit_cursor::{read_field, write_field};
    use crate::types::SizeClass;

    fn sample() -> Container {
        let mut c = Container::new();
        c.add(1, 0).unwrap();
        c.add(2, 1).unwrap();
        c.add(255, 0xFFFF_FFFF).unwrap();
        c
    }

    #[test]
    fn test_end_to_end_example_bit_ranges() {
        let bytes = sample().encode().unwrap();

        // [0, 11): id 1, size 0
        assert_eq!(read_field(&bytes, 0, 8).unwrap(), 1);
        assert_eq!(read_field(&bytes, 8, 3).unwrap(), 0);
        // [11, 23): id 2, size 1, value 1
        assert_eq!(read_field(&bytes, 11, 8).unwrap(), 2);
        assert_eq!(read_field(&bytes, 19, 3).unwrap(), 1);
        assert_eq!(read_field(&bytes, 22, 1).unwrap(), 1);
        // [23, 66): id 255, size 6, value 0xFFFFFFFF
        assert_eq!(read_field(&bytes, 23, 8).unwrap(), 255);
        assert_eq!(read_field(&bytes, 31, 3).unwrap(), 6);
        assert_eq!(read_field(&bytes, 34, 32).unwrap(), 0xFFFF_FFFF);
        // Implicit terminator right after.
        assert_eq!(read_field(&bytes, 66, 8).unwrap(), 0);

        let decoded = Container::decode(&bytes);
        assert_eq!(decoded, sample());
        assert_eq!(
            decoded.to_value_map(),
            BTreeMap::from([(1, 0), (2, 1), (255, 0xFFFF_FFFF)])
        );
    }

    #[test]
    fn test_encode_length_is_whole_windows() {
        let bytes = sample().encode().unwrap();
        // Last field written is the 32-bit value at bit 34: window at byte 4.
        assert_eq!(bytes.len(), 16);
        assert_eq!(Container::new().encode().unwrap(), vec![0u8; 8]);
    }

    #[test]
    fn test_overwrite_semantics() {
        let mut c = Container::new();
        c.add(5, 10).unwrap();
        c.add(5, 20).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.get_value(5), 20);
        assert_eq!(c.get(5).unwrap().size, SizeClass::Bits8);
    }

    #[test]
    fn test_rejects_reserved_and_wide_ids() {
        let mut c = Container::new();
        assert!(matches!(c.add(0, 1), Err(ConflibError::InvalidIdentifier(0))));
        assert!(matches!(c.add(256, 1), Err(ConflibError::InvalidIdentifier(256))));
        assert!(c.is_empty());
    }

    #[test]
    fn test_rejects_value_over_32_bits() {
        let mut c = Container::new();
        assert!(matches!(
            c.add(1, 1u64 << 32),
            Err(ConflibError::ValueOutOfRange(v)) if v == 1u64 << 32
        ));
        c.add(1, u32::MAX as u64).unwrap();
    }

    #[test]
    fn test_get_value_defaults_to_zero_and_remove() {
        let mut c = sample();
        assert_eq!(c.get_value(77), 0);
        assert!(c.get(77).is_none());
        assert_eq!(c.remove(2), Some(Entry::new(2, 1)));
        assert_eq!(c.remove(2), None);
        assert!(!c.contains(2));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_terminator_precedence() {
        let bytes = [0x00, 0xFF, 0x12, 0x34, 0x56];
        assert!(Container::decode(&bytes).is_empty());
    }

    #[test]
    fn test_empty_and_all_zero_inputs_decode_empty() {
        assert!(Container::decode(&[]).is_empty());
        assert!(Container::decode(&[0u8; 32]).is_empty());
    }

    #[test]
    fn test_decode_keeps_stored_wide_size_and_reencode_canonicalises() {
        let mut raw = Vec::new();
        write_field(&mut raw, 0, 8, 9).unwrap();
        write_field(&mut raw, 8, 3, 6).unwrap();
        write_field(&mut raw, 11, 32, 1).unwrap();

        let decoded = Container::decode(&raw);
        assert_eq!(decoded.get(9).unwrap().size, SizeClass::Bits32);
        assert_eq!(decoded.get(9).unwrap().canonical().size, SizeClass::Bits1);

        let reencoded = decoded.encode().unwrap();
        let again = Container::decode(&reencoded);
        assert_eq!(again.get(9), Some(&Entry::new(9, 1)));
        assert_eq!(again.to_value_map(), decoded.to_value_map());
    }

    #[test]
    fn test_duplicate_ids_last_wins() {
        let mut raw = Vec::new();
        let mut at = 0;
        at = encode_one(&mut raw, at, &Entry::new(4, 100)).unwrap();
        at = encode_one(&mut raw, at, &Entry::new(6, 3)).unwrap();
        encode_one(&mut raw, at, &Entry::new(4, 7)).unwrap();

        let decoded = Container::decode(&raw);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get_value(4), 7);
        assert_eq!(decoded.get_value(6), 3);
    }

    #[test]
    fn test_size_field_seven_is_skipped_as_64_bits() {
        // [10: size 3, value 5][11: size 7, 64 zero bits][12: size 4, value 9]
        let mut raw = Vec::new();
        let at = encode_one(&mut raw, 0, &Entry::new(10, 5)).unwrap();
        write_field(&mut raw, at, 8, 11).unwrap();
        write_field(&mut raw, at + 8, 3, 7).unwrap();
        let after_wide = at + 11 + 64;
        let end = encode_one(&mut raw, after_wide, &Entry::new(12, 9)).unwrap();
        assert_eq!(end, after_wide + 15);

        let decoded = Container::decode(&raw);
        assert_eq!(decoded.to_value_map(), BTreeMap::from([(10, 5), (11, 0), (12, 9)]));
        assert_eq!(decoded.get(11).unwrap().size, SizeClass::Bits64);

        // Re-encoding shrinks the wide entry to its minimal class.
        let reencoded = decoded.encode().unwrap();
        assert_eq!(Container::decode(&reencoded).get(11).unwrap().size, SizeClass::Nil);
    }

    #[test]
    fn test_garbage_decodes_without_panic() {
        let garbage: Vec<u8> = (0..=255u8).rev().collect();
        let decoded = Container::decode(&garbage);
        assert!(decoded.len() <= 255);
        let single = Container::decode(&[0xFF]);
        assert!(single.len() <= 1);
    }

    #[test]
    fn test_insertion_order_changes_bytes_not_content() {
        let mut asc = Container::new();
        let mut ins = Container::with_order(EntryOrder::Insertion);
        for (id, value) in [(200u32, 9u64), (3, 70_000), (50, 0)] {
            asc.add(id, value).unwrap();
            ins.add(id, value).unwrap();
        }
        let asc_bytes = asc.encode().unwrap();
        let ins_bytes = ins.encode().unwrap();
        assert_ne!(asc_bytes, ins_bytes);
        assert_eq!(read_field(&ins_bytes, 0, 8).unwrap(), 200);
        assert_eq!(read_field(&asc_bytes, 0, 8).unwrap(), 3);
        assert_eq!(Container::decode(&asc_bytes), Container::decode(&ins_bytes));
    }

    #[test]
    fn test_insertion_order_after_overwrite_and_readd() {
        let mut c = Container::with_order(EntryOrder::Insertion);
        c.add(7, 1).unwrap();
        c.add(3, 1).unwrap();
        c.add(7, 2).unwrap();
        let ids: Vec<u8> = c.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![7, 3]);

        c.remove(7);
        c.add(7, 5).unwrap();
        let ids: Vec<u8> = c.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 7]);
    }

    #[test]
    fn test_config_selects_order() {
        let config = ConflibConfig::from_json(r#"{"entry_order": "insertion"}"#).unwrap();
        let mut c = Container::with_config(&config);
        assert_eq!(c.order(), EntryOrder::Insertion);
        c.add(9, 1).unwrap();
        c.add(4, 1).unwrap();
        let bytes = c.encode().unwrap();

        let decoded = Container::decode_with_config(&bytes, &config);
        let ids: Vec<u8> = decoded.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![9, 4]);
    }

    #[test]
    fn test_display_table() {
        let table = sample().to_string();
        assert!(table.starts_with(" ID       Value   Hex Val  Vsize  Tsize\n"));
        assert!(table.contains("255  4294967295  ffffffff     32     43"));
        assert!(table.contains("Totals:     33     66"));
        assert!(table.contains("Avg:     11.00  22.00"));

        let empty = Container::new().to_string();
        assert!(empty.contains("Totals:      0      0"));
        assert!(!empty.contains("Avg"));
    }

    #[test]
    fn test_to_json_and_bit_len() {
        let c = sample();
        assert_eq!(c.bit_len(), 66);
        let json: serde_json::Value = serde_json::from_str(&c.to_json().unwrap()).unwrap();
        assert_eq!(json["255"], 4294967295u64);
        assert_eq!(json["1"], 0);
    }

    #[test]
    fn test_try_from_map_and_from_iter() {
        let map = BTreeMap::from([(1u32, 2u64), (9, 300)]);
        let c = Container::try_from(&map).unwrap();
        assert_eq!(c.get_value(9), 300);

        let bad = BTreeMap::from([(0u32, 1u64)]);
        assert!(Container::try_from(&bad).is_err());

        let collected: Container = vec![Entry::new(0, 1), Entry::new(8, 8)].into_iter().collect();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected.get_value(8), 8);
    }
}
