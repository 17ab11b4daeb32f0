//! A mask-layout generator for superconducting coplanar-waveguide circuits.
//!
//! Everything is expressed as negative masks: the shapes emitted are the
//! ground-plane cutouts, obtained by subtracting each trace from its
//! trace-plus-gap envelope. The crate synthesizes feedlines, launcher pads,
//! length-targeted meandered resonators, terminations, DC test strips, and
//! whole-chip assemblies placing resonator banks along a shared feedline.

pub mod blocks;
pub mod cli;
pub mod component;
pub mod config;
pub mod error;
pub mod geometry;
pub mod pdk;
pub mod primitives;
pub mod route;

pub use error::{CpwgenError, Result};
