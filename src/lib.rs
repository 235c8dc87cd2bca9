//! This file is the root of the `conflib` Rust crate: a compact bit-packed codec
//! for sparse `id (1..=255) -> u32` configuration maps.
//!
//! Every entry is stored as `[id:8][size:3][value:width]`, where `width` is the
//! smallest of `0, 1, 2, 4, 8, 16, 32` bits that holds the value. Entries are
//! packed bit-contiguously, least-significant bit first, and the stream ends at
//! the first zero id.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`kernels`, `container`, etc.)
//!     and re-exporting the everyday API.
//! 2.  Defining the `#[pymodule]` entry point when built with the `python` feature.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod container;
pub mod error;
pub mod kernels;
pub mod library;
pub mod types;

#[cfg(feature = "python")]
mod ffi;

pub use bridge::{bytes_to_map, load_from_bytes, load_from_file, map_to_bytes, save_to_bytes, save_to_file};
pub use config::{ConflibConfig, EntryOrder};
pub use container::Container;
pub use error::{ConflibError, Result};
pub use library::{Library, Lookup};
pub use types::{classify, width_of, Entry, SizeClass};

//==================================================================================
// 2. Python Module Definition
//==================================================================================
#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The `conflib` Python module.
#[cfg(feature = "python")]
#[pymodule]
fn conflib(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ffi::loads_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::saves_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::enable_verbose_logging_py, m)?)?;

    // --- Expose version string as a module attribute ---
    m.add("__version__", VERSION)?;

    Ok(())
}
