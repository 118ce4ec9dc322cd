//! Collaborator contracts for the physical rig.
//!
//! The session owns one implementation of each trait exclusively for its
//! whole run; dropping the session releases them on every exit path.

use crate::errors::MappingError;
use crate::types::{CameraFrame, Pattern};

/// Source of camera frames.
pub trait FrameSource {
    /// Acquire the next frame, blocking.
    ///
    /// Errors are fatal to a running session: a skipped or retried frame
    /// would desynchronise the pattern index from the capture index.
    fn acquire(&mut self) -> Result<CameraFrame, MappingError>;
}

/// Control channel to the light strand.
pub trait LightController {
    /// Number of addressable lights. Queried once at session start and
    /// held immutable for the session.
    fn light_count(&mut self) -> Result<usize, MappingError>;

    /// Apply an illumination pattern. Fire-and-forget: the settle delay
    /// after this call is what guarantees the strand has transitioned
    /// before the next capture.
    fn set_pattern(&mut self, pattern: &Pattern) -> Result<(), MappingError>;

    /// Strand master brightness in `[0.0, 1.0]`.
    fn brightness(&mut self) -> Result<f32, MappingError>;

    fn set_brightness(&mut self, level: f32) -> Result<(), MappingError>;
}
