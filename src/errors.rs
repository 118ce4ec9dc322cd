use crate::types::Point;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum MappingError {
    NoReferenceDetection,
    IncompleteHistory { frame_index: usize },
    InvalidFrameIndex { frame_index: u32, bit_width: u32 },
    OutOfRangeIndex { index: usize, light_count: usize, position: Point },
    IndexCollision { index: usize, kept: Point, rejected: Point },
    CaptureFailure(String),
    DetectionFailure(String),
    ControllerFailure(String),
    ConfigError(String),
    OutputError(String),
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MappingError::NoReferenceDetection => {
                write!(f, "No reference detection: all-on frame produced no blobs")
            }
            MappingError::IncompleteHistory { frame_index } => write!(
                f,
                "Incomplete history: pattern frame {} was never observed",
                frame_index
            ),
            MappingError::InvalidFrameIndex {
                frame_index,
                bit_width,
            } => write!(
                f,
                "Invalid frame index: {} outside schedule of {} frames",
                frame_index, bit_width
            ),
            MappingError::OutOfRangeIndex {
                index,
                light_count,
                position,
            } => write!(
                f,
                "Decoded index {} out of range for {} lights (candidate at {})",
                index, light_count, position
            ),
            MappingError::IndexCollision {
                index,
                kept,
                rejected,
            } => write!(
                f,
                "Index collision: {} claimed by {} and {}",
                index, kept, rejected
            ),
            MappingError::CaptureFailure(msg) => write!(f, "Capture failure: {}", msg),
            MappingError::DetectionFailure(msg) => write!(f, "Detection failure: {}", msg),
            MappingError::ControllerFailure(msg) => write!(f, "Controller failure: {}", msg),
            MappingError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            MappingError::OutputError(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl std::error::Error for MappingError {}
