// In: src/error.rs

//! This module defines the single, unified error type for the entire conflib library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! The wire format itself is permissive: any byte string decodes to *some*
//! container. The variants below therefore only cover caller mistakes (bad ids,
//! oversized values), direct kernel misuse (unpadded reads) and the outer I/O shims.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConflibError {
    // =========================================================================
    // === High-Level, Semantic Errors (Container / Library API)
    // =========================================================================
    /// Identifier 0 is the stream terminator; anything above 255 cannot be framed.
    #[error("Invalid identifier {0}: must be in 1..=255")]
    InvalidIdentifier(u32),

    #[error("Value {0:#x} does not fit in 32 bits")]
    ValueOutOfRange(u64),

    #[error("Library capacity exceeded: need {required_bits} bits, have {capacity_bits}")]
    CapacityExceeded {
        required_bits: usize,
        capacity_bits: usize,
    },

    // =========================================================================
    // === Low-Level Kernel Errors
    // =========================================================================
    #[error(
        "Truncated input: reading {width} bits at bit {bit_offset} needs an 8-byte window, only {available} bytes available"
    )]
    TruncatedInput {
        bit_offset: usize,
        width: u32,
        available: usize,
    },

    #[error("Field width {0} exceeds the 56-bit window limit")]
    FieldTooWide(u32),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem (e.g., file not found).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, during config loading or map export.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

/// A specialized Result type for conflib operations.
pub type Result<T> = std::result::Result<T, ConflibError>;

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

#[cfg(feature = "python")]
impl From<ConflibError> for pyo3::PyErr {
    fn from(err: ConflibError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
