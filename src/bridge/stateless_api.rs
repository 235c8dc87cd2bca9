// In: src/bridge/stateless_api.rs

use std::collections::BTreeMap;
use std::path::Path;

use crate::container::Container;
use crate::error::Result;

/// Decodes a packed stream. Never fails; see [`Container::decode`].
pub fn load_from_bytes(bytes: &[u8]) -> Container {
    Container::decode(bytes)
}

/// Encodes a container into its canonical packed form.
pub fn save_to_bytes(container: &Container) -> Result<Vec<u8>> {
    container.encode()
}

/// Builds a container from plain `(id, value)` pairs and encodes it.
///
/// Fails on the first pair that [`Container::add`] rejects.
pub fn map_to_bytes<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Vec<u8>>
where
    K: Into<u32>,
    V: Into<u64>,
{
    let mut container = Container::new();
    for (id, value) in pairs {
        container.add(id.into(), value.into())?;
    }
    container.encode()
}

/// Decodes a packed stream and keeps only the id -> value mapping.
pub fn bytes_to_map(bytes: &[u8]) -> BTreeMap<u8, u32> {
    Container::decode(bytes).to_value_map()
}

/// Reads the whole file at `path` and decodes it.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Container> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    log::debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(load_from_bytes(&bytes))
}

/// Encodes `container` and writes the whole buffer to `path`.
pub fn save_to_file(path: impl AsRef<Path>, container: &Container) -> Result<()> {
    let path = path.as_ref();
    let bytes = save_to_bytes(container)?;
    std::fs::write(path, &bytes)?;
    log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
