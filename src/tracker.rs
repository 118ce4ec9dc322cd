//! Blob-to-candidate correspondence across pattern frames.
//!
//! The detector preserves no identity between frames: blob order is
//! arbitrary and counts change as lights switch on and off. Physical
//! lights do not move during a session, so correspondence is re-derived
//! every frame by nearest-neighbor matching against each candidate's
//! fixed position from the all-on reference frame.

use crate::errors::MappingError;
use crate::types::Point;

/// A light position hypothesised from the reference frame, together with
/// its per-frame visibility history.
///
/// Created once per reference blob and never re-created; the history is
/// filled in one frame at a time and read exactly once at decode.
#[derive(Debug, Clone)]
pub struct LightCandidate {
    position: Point,
    presence: Vec<Option<bool>>,
}

impl LightCandidate {
    fn new(position: Point, bit_width: u32) -> Self {
        Self {
            position,
            presence: vec![None; bit_width as usize],
        }
    }

    /// Position in the reference frame.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Visibility history, one slot per pattern frame. `None` marks a
    /// frame the tracker never observed.
    pub fn presence(&self) -> &[Option<bool>] {
        &self.presence
    }
}

/// Tracks which candidates are visible in each pattern frame.
#[derive(Debug)]
pub struct CorrespondenceTracker {
    candidates: Vec<LightCandidate>,
    bit_width: u32,
    tolerance_sq: f64,
}

impl CorrespondenceTracker {
    /// One candidate per blob found in the all-on reference frame.
    ///
    /// `tolerance_px` is the match radius: a candidate counts as present
    /// in a frame when some blob lies within this distance of its
    /// reference position. Two lights closer together than the tolerance
    /// can alias onto one blob; spacing above the tolerance is a
    /// precondition of the capture setup, not something the tracker
    /// enforces.
    pub fn from_reference(blobs: &[Point], bit_width: u32, tolerance_px: f64) -> Self {
        Self {
            candidates: blobs
                .iter()
                .map(|blob| LightCandidate::new(*blob, bit_width))
                .collect(),
            bit_width,
            tolerance_sq: tolerance_px * tolerance_px,
        }
    }

    /// Record presence or absence of every candidate in one pattern
    /// frame.
    pub fn observe(
        &mut self,
        frame_blobs: &[Point],
        frame_index: u32,
    ) -> Result<(), MappingError> {
        if frame_index >= self.bit_width {
            return Err(MappingError::InvalidFrameIndex {
                frame_index,
                bit_width: self.bit_width,
            });
        }
        let slot = frame_index as usize;

        // Nothing lit resolves every candidate to absent without any
        // distance work.
        if frame_blobs.is_empty() {
            for candidate in &mut self.candidates {
                candidate.presence[slot] = Some(false);
            }
            return Ok(());
        }

        for candidate in &mut self.candidates {
            let nearest_sq = frame_blobs
                .iter()
                .map(|blob| candidate.position.distance_sq(blob))
                .min()
                .unwrap_or(i64::MAX);
            candidate.presence[slot] = Some(nearest_sq as f64 <= self.tolerance_sq);
        }
        Ok(())
    }

    pub fn candidates(&self) -> &[LightCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(coords: &[(i32, i32)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_one_candidate_per_reference_blob() {
        let tracker =
            CorrespondenceTracker::from_reference(&points(&[(10, 10), (50, 50)]), 3, 2.0);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.candidates()[0].position(), Point::new(10, 10));
        assert!(tracker.candidates()[0].presence().iter().all(Option::is_none));
    }

    #[test]
    fn test_observe_marks_nearby_blob_present() {
        let mut tracker =
            CorrespondenceTracker::from_reference(&points(&[(10, 10), (50, 50)]), 1, 2.0);
        // Blob within tolerance of the first candidate only.
        tracker.observe(&points(&[(11, 10)]), 0).unwrap();
        assert_eq!(tracker.candidates()[0].presence(), &[Some(true)]);
        assert_eq!(tracker.candidates()[1].presence(), &[Some(false)]);
    }

    #[test]
    fn test_observe_respects_tolerance_boundary() {
        let mut tracker = CorrespondenceTracker::from_reference(&points(&[(10, 10)]), 2, 2.0);
        tracker.observe(&points(&[(12, 10)]), 0).unwrap(); // exactly 2 px away
        tracker.observe(&points(&[(13, 10)]), 1).unwrap(); // 3 px away
        assert_eq!(tracker.candidates()[0].presence(), &[Some(true), Some(false)]);
    }

    #[test]
    fn test_empty_frame_short_circuits_to_absent() {
        let mut tracker =
            CorrespondenceTracker::from_reference(&points(&[(10, 10), (50, 50)]), 1, 2.0);
        tracker.observe(&[], 0).unwrap();
        for candidate in tracker.candidates() {
            assert_eq!(candidate.presence(), &[Some(false)]);
        }
    }

    #[test]
    fn test_multiple_candidates_may_share_a_blob() {
        // Two candidates inside one tolerance radius both match; the
        // tracker does not enforce exclusivity.
        let mut tracker =
            CorrespondenceTracker::from_reference(&points(&[(10, 10), (11, 10)]), 1, 2.0);
        tracker.observe(&points(&[(10, 10)]), 0).unwrap();
        assert_eq!(tracker.candidates()[0].presence(), &[Some(true)]);
        assert_eq!(tracker.candidates()[1].presence(), &[Some(true)]);
    }

    #[test]
    fn test_observe_out_of_schedule_frame_fails() {
        let mut tracker = CorrespondenceTracker::from_reference(&points(&[(10, 10)]), 2, 2.0);
        let result = tracker.observe(&points(&[(10, 10)]), 2);
        assert_eq!(
            result,
            Err(MappingError::InvalidFrameIndex {
                frame_index: 2,
                bit_width: 2
            })
        );
    }
}
