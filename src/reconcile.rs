//! Assembly of the final coordinate map from decoded candidates.

use crate::errors::MappingError;
use crate::types::{CoordinateMap, Point};
use serde::{Deserialize, Serialize};

/// How reconciliation treats candidates that decode badly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Keep the first candidate seen for an index, surface the conflict
    /// and continue. Calibration environments are noisy; this is the
    /// default.
    #[default]
    KeepFirst,
    /// Any collision or out-of-range index aborts the run.
    Strict,
}

/// Two candidates decoded to the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConflict {
    pub index: usize,
    pub kept: Point,
    pub rejected: Point,
}

/// Candidate whose decoded index falls outside the strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedCandidate {
    pub index: usize,
    pub position: Point,
}

/// Coordinate map plus everything reconciliation had to discard.
#[derive(Debug, Clone)]
pub struct MappingOutcome {
    pub map: CoordinateMap,
    pub conflicts: Vec<IndexConflict>,
    pub out_of_range: Vec<RejectedCandidate>,
}

/// Place each decoded `(index, position)` pair into a fixed array of
/// `light_count` slots.
///
/// The returned map always has exactly `light_count` entries. An index
/// past the strand signals a pattern/decoder mismatch or severe
/// detection noise; a filled slot signals two candidates claiming one
/// light. Under `KeepFirst` both are surfaced in the outcome and logged,
/// never silently dropped or overwritten; under `Strict` either aborts.
pub fn reconcile(
    decoded: &[(usize, Point)],
    light_count: usize,
    policy: CollisionPolicy,
) -> Result<MappingOutcome, MappingError> {
    let mut slots: Vec<Option<Point>> = vec![None; light_count];
    let mut conflicts = Vec::new();
    let mut out_of_range = Vec::new();

    for &(index, position) in decoded {
        if index >= light_count {
            if policy == CollisionPolicy::Strict {
                return Err(MappingError::OutOfRangeIndex {
                    index,
                    light_count,
                    position,
                });
            }
            log::warn!(
                "decoded index {} out of range for {} lights (candidate at {}), skipping",
                index,
                light_count,
                position
            );
            out_of_range.push(RejectedCandidate { index, position });
            continue;
        }

        match slots[index] {
            None => slots[index] = Some(position),
            Some(kept) => {
                if policy == CollisionPolicy::Strict {
                    return Err(MappingError::IndexCollision {
                        index,
                        kept,
                        rejected: position,
                    });
                }
                log::warn!(
                    "index {} claimed by {} and {}, keeping first",
                    index,
                    kept,
                    position
                );
                conflicts.push(IndexConflict {
                    index,
                    kept,
                    rejected: position,
                });
            }
        }
    }

    Ok(MappingOutcome {
        map: CoordinateMap::from_slots(slots),
        conflicts,
        out_of_range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_length_is_always_light_count() {
        let outcome = reconcile(&[], 6, CollisionPolicy::KeepFirst).unwrap();
        assert_eq!(outcome.map.len(), 6);
        assert_eq!(outcome.map.mapped_count(), 0);
    }

    #[test]
    fn test_pairs_land_in_their_slots() {
        let decoded = [(2, Point::new(5, 5)), (0, Point::new(1, 1))];
        let outcome = reconcile(&decoded, 3, CollisionPolicy::KeepFirst).unwrap();
        assert_eq!(outcome.map.get(0), Some(Point::new(1, 1)));
        assert_eq!(outcome.map.get(1), None);
        assert_eq!(outcome.map.get(2), Some(Point::new(5, 5)));
        assert!(outcome.conflicts.is_empty());
        assert!(outcome.out_of_range.is_empty());
    }

    #[test]
    fn test_collision_keeps_first_and_reports() {
        let decoded = [(1, Point::new(5, 5)), (1, Point::new(9, 9))];
        let outcome = reconcile(&decoded, 2, CollisionPolicy::KeepFirst).unwrap();
        assert_eq!(outcome.map.get(1), Some(Point::new(5, 5)));
        assert_eq!(
            outcome.conflicts,
            vec![IndexConflict {
                index: 1,
                kept: Point::new(5, 5),
                rejected: Point::new(9, 9),
            }]
        );
    }

    #[test]
    fn test_collision_is_fatal_under_strict() {
        let decoded = [(1, Point::new(5, 5)), (1, Point::new(9, 9))];
        let error = reconcile(&decoded, 2, CollisionPolicy::Strict).unwrap_err();
        assert_eq!(
            error,
            MappingError::IndexCollision {
                index: 1,
                kept: Point::new(5, 5),
                rejected: Point::new(9, 9),
            }
        );
    }

    #[test]
    fn test_out_of_range_skipped_and_reported() {
        let decoded = [(7, Point::new(5, 5)), (0, Point::new(1, 1))];
        let outcome = reconcile(&decoded, 2, CollisionPolicy::KeepFirst).unwrap();
        assert_eq!(outcome.map.len(), 2);
        assert_eq!(outcome.map.get(0), Some(Point::new(1, 1)));
        assert_eq!(
            outcome.out_of_range,
            vec![RejectedCandidate {
                index: 7,
                position: Point::new(5, 5),
            }]
        );
    }

    #[test]
    fn test_out_of_range_is_fatal_under_strict() {
        let error = reconcile(&[(2, Point::new(5, 5))], 2, CollisionPolicy::Strict).unwrap_err();
        assert_eq!(
            error,
            MappingError::OutOfRangeIndex {
                index: 2,
                light_count: 2,
                position: Point::new(5, 5),
            }
        );
    }
}
