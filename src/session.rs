//! Calibration session orchestration.
//!
//! Drives the rig through the reference capture and each pattern frame,
//! strictly sequentially: set pattern, blocking settle delay, capture,
//! detect, observe. There is no concurrency and no capture retry
//! anywhere: a retried frame would silently shift the pattern-to-frame
//! alignment that decoding depends on, so any capture fault aborts the
//! session instead.

use crate::config::{MapperConfig, MappingMethod};
use crate::decode::decode_index;
use crate::detector::BlobDetector;
use crate::device::{FrameSource, LightController};
use crate::errors::MappingError;
use crate::pattern;
use crate::reconcile::{reconcile, MappingOutcome};
use crate::tracker::CorrespondenceTracker;
use crate::types::{CameraFrame, CoordinateMap, Pattern, Point};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    CapturingReference,
    CapturingPattern(u32),
    Decoding,
    Done,
    Failed,
}

/// Result of a completed mapping run.
#[derive(Debug, Clone)]
pub struct MappingReport {
    pub method: MappingMethod,
    pub light_count: usize,
    /// Frames used for mapping: `1 + bit_width(N)` for binary, `N` for
    /// linear.
    pub frames_captured: usize,
    pub outcome: MappingOutcome,
    /// All-on frame kept for overlay rendering. Absent when the overlay
    /// capture failed, which is not fatal to the mapping itself.
    pub reference_frame: Option<CameraFrame>,
}

impl MappingReport {
    pub fn map(&self) -> &CoordinateMap {
        &self.outcome.map
    }
}

/// Owns the camera, the light controller and the detector for the
/// duration of one mapping run.
pub struct CalibrationSession<C, L, D> {
    camera: C,
    lights: L,
    detector: D,
    config: MapperConfig,
    light_count: usize,
    state: SessionState,
}

impl<C, L, D> CalibrationSession<C, L, D>
where
    C: FrameSource,
    L: LightController,
    D: BlobDetector,
{
    /// Open a session over an exclusive camera + controller pair.
    ///
    /// The light count is queried once here and held immutable for the
    /// whole session.
    pub fn open(
        camera: C,
        mut lights: L,
        detector: D,
        config: MapperConfig,
    ) -> Result<Self, MappingError> {
        config.validate().map_err(MappingError::ConfigError)?;
        let light_count = lights.light_count()?;
        if light_count == 0 {
            return Err(MappingError::ControllerFailure(
                "controller reports zero lights".to_string(),
            ));
        }
        Ok(Self {
            camera,
            lights,
            detector,
            config,
            light_count,
            state: SessionState::Idle,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn light_count(&self) -> usize {
        self.light_count
    }

    /// Run the configured strategy to completion.
    pub fn run(&mut self) -> Result<MappingReport, MappingError> {
        let result = match self.config.mapping.method {
            MappingMethod::Binary => self.run_binary(),
            MappingMethod::Linear => self.run_linear(),
        };
        if result.is_err() {
            self.state = SessionState::Failed;
        }
        result
    }

    fn run_binary(&mut self) -> Result<MappingReport, MappingError> {
        let n = self.light_count;
        let width = pattern::bit_width(n);
        log::info!(
            "Starting binary mapping of {} lights ({} pattern frames)",
            n,
            width
        );
        let original_brightness = self.begin_calibration()?;

        self.state = SessionState::CapturingReference;
        self.discard_warmup_frames()?;
        let reference = self.capture_with_pattern(&pattern::all_on(n))?;
        let blobs = self.detect(&reference)?;
        if blobs.is_empty() {
            // Abort before a single pattern frame is commanded.
            return Err(MappingError::NoReferenceDetection);
        }
        log::info!("Reference frame yielded {} candidate blobs", blobs.len());

        let mut tracker = CorrespondenceTracker::from_reference(
            &blobs,
            width,
            self.config.mapping.proximity_tolerance_px,
        );
        for bit in 0..width {
            self.state = SessionState::CapturingPattern(bit);
            let frame = self.capture_with_pattern(&pattern::bit_pattern(n, bit))?;
            let frame_blobs = self.detect(&frame)?;
            log::debug!("Pattern frame {}: {} blobs visible", bit, frame_blobs.len());
            tracker.observe(&frame_blobs, bit)?;
        }

        self.state = SessionState::Decoding;
        let mut decoded = Vec::with_capacity(tracker.len());
        for candidate in tracker.candidates() {
            let index = decode_index(candidate.presence())?;
            decoded.push((index, candidate.position()));
        }
        let outcome = reconcile(&decoded, n, self.config.mapping.collision_policy)?;
        log::info!("Mapped {}/{} lights", outcome.map.mapped_count(), n);

        self.lights.set_brightness(original_brightness)?;
        self.state = SessionState::Done;
        Ok(MappingReport {
            method: MappingMethod::Binary,
            light_count: n,
            frames_captured: 1 + width as usize,
            outcome,
            reference_frame: Some(reference),
        })
    }

    /// One light at a time, in index order. The largest blob per frame
    /// is that light's position; no correspondence or decoding involved.
    fn run_linear(&mut self) -> Result<MappingReport, MappingError> {
        let n = self.light_count;
        log::info!("Starting linear mapping of {} lights", n);
        let original_brightness = self.begin_calibration()?;
        self.discard_warmup_frames()?;

        let mut slots: Vec<Option<Point>> = Vec::with_capacity(n);
        for index in 0..n {
            self.state = SessionState::CapturingPattern(index as u32);
            let frame = self.capture_with_pattern(&pattern::single(n, index))?;
            let center = self.detector.detect_primary(
                &frame,
                self.config.detection.threshold,
                self.config.detection.min_blob_size,
            )?;
            if center.is_none() {
                log::debug!("Light {} not found", index);
            }
            slots.push(center);
        }
        let map = CoordinateMap::from_slots(slots);
        log::info!("Mapped {}/{} lights", map.mapped_count(), n);

        // One extra all-on capture for the overlay artifact; losing it
        // does not invalidate an otherwise complete mapping.
        let reference_frame = match self.capture_with_pattern(&pattern::all_on(n)) {
            Ok(frame) => Some(frame),
            Err(e) => {
                log::warn!("Overlay capture failed: {}", e);
                None
            }
        };

        self.lights.set_brightness(original_brightness)?;
        self.state = SessionState::Done;
        Ok(MappingReport {
            method: MappingMethod::Linear,
            light_count: n,
            frames_captured: n,
            outcome: MappingOutcome {
                map,
                conflicts: Vec::new(),
                out_of_range: Vec::new(),
            },
            reference_frame,
        })
    }

    /// Save the strand's brightness and apply the calibration level.
    fn begin_calibration(&mut self) -> Result<f32, MappingError> {
        let original = self.lights.brightness()?;
        self.lights
            .set_brightness(self.config.mapping.calibration_brightness)?;
        Ok(original)
    }

    fn discard_warmup_frames(&mut self) -> Result<(), MappingError> {
        for _ in 0..self.config.camera.warmup_frames {
            self.camera.acquire()?;
        }
        Ok(())
    }

    fn capture_with_pattern(&mut self, pattern: &Pattern) -> Result<CameraFrame, MappingError> {
        self.lights.set_pattern(pattern)?;
        self.settle();
        self.camera.acquire()
    }

    fn settle(&self) {
        let delay = Duration::from_millis(self.config.mapping.settle_delay_ms);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }

    fn detect(&self, frame: &CameraFrame) -> Result<Vec<Point>, MappingError> {
        self.detector.detect(
            frame,
            self.config.detection.threshold,
            self.config.detection.min_blob_size,
        )
    }
}
