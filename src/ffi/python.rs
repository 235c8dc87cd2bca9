// In: src/ffi/python.rs

use pyo3::prelude::*;
use pyo3::types::PyBytes;
use std::collections::BTreeMap;
use std::path::Path;

use crate::bridge;
use crate::config::ConflibConfig;
use crate::observability;

//==================================================================================
// I. Dictionary <-> bytes
//==================================================================================

/// Decodes a packed conflib buffer into a `{id: value}` dict.
#[pyfunction]
#[pyo3(name = "loads")]
pub fn loads_py(py: Python, data: &[u8]) -> BTreeMap<u8, u32> {
    py.allow_threads(move || bridge::bytes_to_map(data))
}

/// Encodes a `{id: value}` dict into a packed conflib buffer.
///
/// Raises `ValueError` for ids outside 1..=255 or values wider than 32 bits.
#[pyfunction]
#[pyo3(name = "saves")]
pub fn saves_py(py: Python, mapping: BTreeMap<u32, u64>) -> PyResult<Py<PyBytes>> {
    let bytes = py.allow_threads(move || bridge::map_to_bytes(mapping))?;
    Ok(PyBytes::new_bound(py, &bytes).unbind())
}

//==================================================================================
// II. Diagnostics
//==================================================================================

/// Installs the crate logger. `level` is a name such as `"debug"`; unknown or
/// missing names log at `info`.
#[pyfunction]
#[pyo3(name = "enable_verbose_logging", signature = (log_file = None, level = None))]
pub fn enable_verbose_logging_py(log_file: Option<String>, level: Option<String>) -> PyResult<()> {
    let config = ConflibConfig {
        log_level: level,
        ..Default::default()
    };
    observability::init_logging_from_config(&config, log_file.as_deref().map(Path::new))?;
    Ok(())
}
