// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the public-facing convenience API of the conflib library. It
// wraps the `Container` codec for callers that only deal in bytes, files or plain
// id -> value maps.
//
// Data Flow (Saving):
//
//   [plain map]  -> map_to_bytes  -> Container::add (classify) -> Container::encode
//   [Container]  -> save_to_bytes -> Container::encode
//   [Container]  -> save_to_file  -> save_to_bytes -> fs::write (whole buffer)
//
// Data Flow (Loading):
//
//   [bytes]      -> load_from_bytes -> Container::decode
//   [bytes]      -> bytes_to_map    -> Container::decode -> project values
//   [path]       -> load_from_file  -> fs::read (whole file) -> load_from_bytes
//
// ====================================================================================
pub mod stateless_api;

pub use stateless_api::{
    bytes_to_map, load_from_bytes, load_from_file, map_to_bytes, save_to_bytes, save_to_file,
};
