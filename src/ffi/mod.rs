//! This module serves as the public API for the Foreign Function Interface (FFI) layer.
//!
//! It is only compiled with the `python` feature and holds the thin `pyo3`
//! wrappers that expose the bridge to Python as dict <-> bytes helpers.

/// Contains all logic for interfacing with the Python/CPython ecosystem.
pub mod python;

pub use self::python::{enable_verbose_logging_py, loads_py, saves_py};
