//! LedMap: camera-driven position mapping for addressable LED strings
//!
//! Point a camera at a strand of individually addressable lights, drive
//! the strand through a short sequence of illumination patterns, and
//! recover the physical 2D position of every light index.
//!
//! # Features
//! - Binary structured-light mapping: `ceil(log2 N)` pattern frames
//!   uniquely encode every light index
//! - Linear single-light fallback: N frames, no decoding step
//! - Nearest-neighbor correspondence against a fixed reference frame
//! - Threshold blob detection with morphological cleanup
//! - Coordinate map export as flagged `[x, y, flag]` triples plus an
//!   overlay PNG
//! - Hardware-free simulated rig for offline testing
//!
//! # Usage
//! ```rust,ignore
//! use ledmap::{CalibrationSession, MapperConfig, ThresholdDetector};
//!
//! let config = MapperConfig::load_or_default();
//! let detector = ThresholdDetector::new(config.detection.erosion_size);
//! let mut session = CalibrationSession::open(camera, lights, detector, config)?;
//! let report = session.run()?;
//! ledmap::output::write_artifacts(&report, &output_config)?;
//! ```
pub mod config;
pub mod decode;
pub mod detector;
pub mod device;
pub mod errors;
pub mod output;
pub mod pattern;
pub mod reconcile;
pub mod session;
pub mod tracker;
pub mod types;

// Testing utilities - synthetic rig for offline testing
pub mod testing;

// Re-exports for convenience
pub use config::{MapperConfig, MappingMethod};
pub use decode::decode_index;
pub use detector::{BlobDetector, ThresholdDetector};
pub use device::{FrameSource, LightController};
pub use errors::MappingError;
pub use reconcile::{reconcile, CollisionPolicy, MappingOutcome};
pub use session::{CalibrationSession, MappingReport, SessionState};
pub use tracker::{CorrespondenceTracker, LightCandidate};
pub use types::{CameraFrame, CoordinateMap, Pattern, Point};

/// Initialize logging for the mapper
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "ledmap=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[cfg(test)]
mod lib_tests {
    #[test]
    fn test_crate_metadata() {
        assert_eq!(super::NAME, "ledmap");
        assert!(!super::VERSION.is_empty());
        assert!(!super::DESCRIPTION.is_empty());
    }
}
