//! Kinetic-inductance traveling-wave parametric amplifier cells.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentBuilder};
use crate::error::{CpwgenError, Result};
use crate::geometry::transform::Transformation;
use crate::geometry::Point;
use crate::primitives::straight;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FingersCellParams {
    /// Trace width of the line and of each finger.
    pub width: f64,
    /// Length of the through line.
    pub line_length: f64,
    /// Finger length measured from the line centerline.
    pub finger_length: f64,
}

impl Default for FingersCellParams {
    fn default() -> Self {
        Self {
            width: 1.,
            line_length: 5.,
            finger_length: 20.,
        }
    }
}

/// Base cell of a fingered transmission line: a straight through line with
/// one capacitive finger above and one below at mid-length.
///
/// Tiling this cell end to end loads the line periodically, setting the
/// dispersion of the amplifier. Ports `o1`/`o2` are the through line's;
/// metadata records the through `length`.
pub fn fingers_cell(params: &FingersCellParams) -> Result<Component> {
    let &FingersCellParams {
        width,
        line_length,
        finger_length,
    } = params;
    let w2 = width / 2.;
    if finger_length <= w2 {
        return Err(CpwgenError::invalid_dimension(
            "finger_length",
            format!("finger_length={finger_length} must exceed width / 2 = {w2}"),
        ));
    }
    let line = Arc::new(straight(line_length, width)?);
    let finger = Arc::new(straight(finger_length - w2, width)?);

    let mut b = ComponentBuilder::new("fingers_cell");
    let through = b.place(Arc::clone(&line), Transformation::identity());
    b.place(
        Arc::clone(&finger),
        Transformation {
            translation: Point::new(line_length / 2., w2),
            rotation: 90.,
            reflect_vert: false,
        },
    );
    b.place(
        finger,
        Transformation {
            translation: Point::new(line_length / 2., -w2),
            rotation: 270.,
            reflect_vert: false,
        },
    );
    b.add_port(through.port("o1")?);
    b.add_port(through.port("o2")?);
    b.set_info("length", line_length);
    Ok(b.finish())
}
