//! Parser cache store (spec §6 external collaborator): `{load, store}`
//! backed by a file, serializing `LrData` with `bincode` the way the
//! persistent LR-table cache is described in spec §4.3. This module
//! provides the serialization; the actual file I/O is left to the binary,
//! consistent with the rest of the crate keeping I/O at the edges.

use crate::lrparser::LrData;

/// Serializes `data` for persistent storage.
pub fn encode(data: &LrData) -> Result<Vec<u8>, bincode::Error> {
    bincode::serialize(data)
}

/// Deserializes previously-stored cache bytes. Returns `None` on any
/// decoding error rather than propagating it: a corrupt or
/// version-mismatched cache file should fall back to rebuilding the
/// table, not abort the caller.
pub fn decode(bytes: &[u8]) -> Option<LrData> {
    bincode::deserialize(bytes).ok()
}
