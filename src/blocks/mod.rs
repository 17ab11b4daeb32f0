//! Generated cell families.

pub mod array;
pub mod chip;
pub mod cpw;
pub mod meander;
pub mod resonator;
pub mod strips;
pub mod termination;
pub mod twpa;
