//! Hardware-free testing support.
//!
//! A simulated strand-and-camera rig plus synthetic frame builders so
//! the full mapping pipeline can run offline, in tests and in the CLI's
//! `simulate` command.

pub mod synthetic;

pub use synthetic::{grid_layout, synthetic_frame, RigCamera, RigController, SimulatedRig};
