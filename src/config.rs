// In: src/config.rs

//! The single source of truth for conflib configuration.
//!
//! `ConflibConfig` is created once at the application boundary (e.g., from a JSON
//! file or a Python dictionary) and handed to the `Container` / `Library`
//! constructors. Every field is defaulted, so an empty JSON object is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

//==================================================================================
// I. Core Configuration Enums
//==================================================================================

/// The order in which a `Container` iterates, and therefore encodes, its entries.
///
/// The order only decides the bit position each entry lands at. Both orders
/// round-trip to the same id -> value mapping.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrder {
    /// **Default:** Ascending identifier order. Output bytes depend only on the
    /// entry set, never on the history of `add`/`remove` calls.
    #[default]
    Ascending,

    /// First-insertion order, as a plain dictionary would iterate. Overwriting an
    /// id keeps its original position; removing and re-adding moves it to the end.
    Insertion,
}

//==================================================================================
// II. The Unified ConflibConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ConflibConfig {
    /// Iteration and encode order for `Container`.
    #[serde(default)]
    pub entry_order: EntryOrder,

    /// Capacity in bytes of a `Library` created via `Library::with_config`.
    #[serde(default = "default_library_capacity_bytes")]
    pub library_capacity_bytes: usize,

    /// Log level name (`"info"`, `"debug"`, ...) read by `observability::init_logging_from_config`.
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for ConflibConfig {
    fn default() -> Self {
        Self {
            entry_order: EntryOrder::default(),
            library_capacity_bytes: default_library_capacity_bytes(),
            log_level: None,
        }
    }
}

impl ConflibConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// The configured log level, falling back to `Info` for absent or unknown names.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level
            .as_deref()
            .and_then(|name| name.parse().ok())
            .unwrap_or(log::LevelFilter::Info)
    }
}

/// Helper for `serde` to provide a default for `library_capacity_bytes`.
fn default_library_capacity_bytes() -> usize {
    256
}
