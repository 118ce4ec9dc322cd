//! Presence-history decoding.

use crate::errors::MappingError;

/// Convert a candidate's per-frame visibility history into its light
/// index.
///
/// Slot 0 is the least-significant bit, matching the order the pattern
/// schedule was captured in. Any unobserved slot means the orchestrator
/// skipped a frame for this candidate, which is a contract violation and
/// fails with `IncompleteHistory` rather than guessing.
///
/// Pure function: identical input always yields the identical index.
pub fn decode_index(presence: &[Option<bool>]) -> Result<usize, MappingError> {
    let mut index = 0usize;
    for (bit, slot) in presence.iter().enumerate() {
        match slot {
            Some(true) => index |= 1 << bit,
            Some(false) => {}
            None => return Err(MappingError::IncompleteHistory { frame_index: bit }),
        }
    }
    Ok(index)
}
