//! Synthetic frames and a simulated light rig.

use crate::device::{FrameSource, LightController};
use crate::errors::MappingError;
use crate::types::{CameraFrame, Pattern, Point};
use std::sync::{Arc, Mutex};

/// Render a frame with bright disks at the given positions on a dark
/// background.
pub fn synthetic_frame(width: u32, height: u32, lit: &[Point], radius: i32) -> CameraFrame {
    // Dim noise floor rather than pure black; real sensors are never 0.
    let mut data = vec![8u8; (width * height * 3) as usize];
    for point in lit {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let x = point.x + dx;
                let y = point.y + dy;
                if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
                    continue;
                }
                let idx = ((y as u32 * width + x as u32) * 3) as usize;
                data[idx] = 255;
                data[idx + 1] = 255;
                data[idx + 2] = 250;
            }
        }
    }
    CameraFrame::new(data, width, height)
}

/// Evenly spaced grid layout for a simulated strand.
pub fn grid_layout(count: usize, columns: usize, spacing: i32, origin: Point) -> Vec<Point> {
    let columns = columns.max(1);
    (0..count)
        .map(|i| {
            Point::new(
                origin.x + (i % columns) as i32 * spacing,
                origin.y + (i / columns) as i32 * spacing,
            )
        })
        .collect()
}

struct RigState {
    layout: Vec<Point>,
    lit: Vec<bool>,
    brightness: f32,
    dead_lights: Vec<usize>,
    frames_served: usize,
    fail_after: Option<usize>,
    width: u32,
    height: u32,
    radius: i32,
}

/// Scripted strand + camera pair sharing one state.
///
/// The camera renders whatever the controller last lit, so a session
/// driving both behaves exactly like a session over real hardware,
/// minus the physics.
#[derive(Clone)]
pub struct SimulatedRig {
    state: Arc<Mutex<RigState>>,
}

impl SimulatedRig {
    pub fn new(layout: Vec<Point>, width: u32, height: u32) -> Self {
        let count = layout.len();
        Self {
            state: Arc::new(Mutex::new(RigState {
                layout,
                lit: vec![false; count],
                brightness: 1.0,
                dead_lights: Vec::new(),
                frames_served: 0,
                fail_after: None,
                width,
                height,
                radius: 3,
            })),
        }
    }

    /// Lights that never show up on camera, whatever the pattern says.
    pub fn with_dead_lights(self, dead: &[usize]) -> Self {
        self.state.lock().expect("lock poisoned").dead_lights = dead.to_vec();
        self
    }

    /// Make every capture past the first `frames` fail.
    pub fn with_capture_failure_after(self, frames: usize) -> Self {
        self.state.lock().expect("lock poisoned").fail_after = Some(frames);
        self
    }

    pub fn frames_served(&self) -> usize {
        self.state.lock().expect("lock poisoned").frames_served
    }

    pub fn brightness(&self) -> f32 {
        self.state.lock().expect("lock poisoned").brightness
    }

    /// Camera and controller handles over the shared rig state.
    pub fn split(&self) -> (RigCamera, RigController) {
        (
            RigCamera {
                state: self.state.clone(),
            },
            RigController {
                state: self.state.clone(),
            },
        )
    }
}

pub struct RigCamera {
    state: Arc<Mutex<RigState>>,
}

impl FrameSource for RigCamera {
    fn acquire(&mut self) -> Result<CameraFrame, MappingError> {
        let mut state = self.state.lock().expect("lock poisoned");
        if let Some(limit) = state.fail_after {
            if state.frames_served >= limit {
                return Err(MappingError::CaptureFailure(
                    "simulated end of stream".to_string(),
                ));
            }
        }
        state.frames_served += 1;

        let visible: Vec<Point> = state
            .layout
            .iter()
            .enumerate()
            .filter(|(i, _)| state.lit[*i] && !state.dead_lights.contains(i))
            .map(|(_, point)| *point)
            .collect();
        Ok(synthetic_frame(
            state.width,
            state.height,
            &visible,
            state.radius,
        ))
    }
}

pub struct RigController {
    state: Arc<Mutex<RigState>>,
}

impl LightController for RigController {
    fn light_count(&mut self) -> Result<usize, MappingError> {
        Ok(self.state.lock().expect("lock poisoned").layout.len())
    }

    fn set_pattern(&mut self, pattern: &Pattern) -> Result<(), MappingError> {
        let mut state = self.state.lock().expect("lock poisoned");
        if pattern.len() != state.layout.len() {
            return Err(MappingError::ControllerFailure(format!(
                "pattern has {} entries for a {}-light strand",
                pattern.len(),
                state.layout.len()
            )));
        }
        state.lit = pattern.bits().to_vec();
        Ok(())
    }

    fn brightness(&mut self) -> Result<f32, MappingError> {
        Ok(self.state.lock().expect("lock poisoned").brightness)
    }

    fn set_brightness(&mut self, level: f32) -> Result<(), MappingError> {
        if !(0.0..=1.0).contains(&level) {
            return Err(MappingError::ControllerFailure(format!(
                "brightness {} outside [0.0, 1.0]",
                level
            )));
        }
        self.state.lock().expect("lock poisoned").brightness = level;
        Ok(())
    }
}
