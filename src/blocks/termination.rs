//! CPW terminations.
//!
//! An open termination leaves the center trace floating inside a rounded
//! ground cutout; a closed termination shorts it to ground, leaving only the
//! gap arcs in the mask. Both expose a single port `o1` at the trace end,
//! facing back along the line.

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentBuilder, Port};
use crate::error::{CpwgenError, Result};
use crate::geometry::boolean::subtract;
use crate::geometry::{Layer, Point, Polygon, Shape};
use crate::primitives::ANGLE_RESOLUTION;

use super::cpw::{GAP, WIDTH};

fn check_term_dims(width: f64, gap: f64) -> Result<()> {
    if width <= 0. {
        return Err(CpwgenError::invalid_dimension(
            "width",
            format!("width={width} must be > 0"),
        ));
    }
    if gap <= 0. {
        return Err(CpwgenError::invalid_dimension(
            "gap",
            format!("gap={gap} must be > 0"),
        ));
    }
    Ok(())
}

/// Samples a circular arc counterclockwise from `start_deg` to `end_deg`.
fn arc(center: Point, radius: f64, start_deg: f64, end_deg: f64, step_deg: f64) -> Vec<Point> {
    let sweep = end_deg - start_deg;
    let steps = (sweep.abs() / step_deg).ceil().max(1.) as usize;
    (0..=steps)
        .map(|i| {
            let phi = (start_deg + sweep * i as f64 / steps as f64).to_radians();
            Point::new(center.x + radius * phi.cos(), center.y + radius * phi.sin())
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenTerminationParams {
    /// Trace width of the terminated line.
    pub width: f64,
    /// Gap of the terminated line.
    pub gap: f64,
    /// Overlap of the trace stub into the line.
    pub dt: f64,
    /// Corner radius of the ground cutout.
    pub r: f64,
    pub angle_resolution: f64,
}

impl Default for OpenTerminationParams {
    fn default() -> Self {
        Self {
            width: WIDTH,
            gap: GAP,
            dt: GAP,
            r: GAP,
            angle_resolution: ANGLE_RESOLUTION,
        }
    }
}

/// Open (capacitive) termination.
///
/// The ground cutout is a rectangle of half-width `width / 2 + gap` with its
/// top corners rounded at radius `r`; the floating trace stub is a half-disc
/// on a short straight run that overlaps the line by `dt`.
pub fn termination_open(params: &OpenTerminationParams) -> Result<Component> {
    let &OpenTerminationParams {
        width,
        gap,
        dt,
        r,
        angle_resolution,
    } = params;
    check_term_dims(width, gap)?;
    if dt < 0. {
        return Err(CpwgenError::invalid_dimension(
            "dt",
            format!("dt={dt} must be >= 0"),
        ));
    }
    let hw = width / 2. + gap;
    if r < 0. || r > hw {
        return Err(CpwgenError::invalid_dimension(
            "r",
            format!("corner radius r={r} must lie in [0, width / 2 + gap] = [0, {hw}]"),
        ));
    }

    let mut outer = vec![Point::new(-hw, -dt), Point::new(hw, -dt)];
    outer.extend(arc(
        Point::new(hw - r, hw - r),
        r,
        0.,
        90.,
        angle_resolution,
    ));
    outer.extend(arc(
        Point::new(-hw + r, hw - r),
        r,
        90.,
        180.,
        angle_resolution,
    ));
    let outer = Shape::new(Layer::MASK, vec![Polygon::from_verts(outer)]);

    let w2 = width / 2.;
    let mut stub = vec![Point::new(w2, -dt), Point::new(w2, 0.)];
    stub.extend(arc(Point::zero(), w2, 0., 180., angle_resolution));
    stub.push(Point::new(-w2, -dt));
    let stub = Shape::new(Layer::MASK, vec![Polygon::from_verts(stub)]);

    let mask = subtract(&outer, &stub)?;
    let mut b = ComponentBuilder::new("termination_open");
    b.add_shape(mask);
    b.add_port(Port::new("o1", Point::zero(), 270., width));
    b.set_info("width", width);
    b.set_info("gap", gap);
    b.set_info("dt", dt);
    Ok(b.finish())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosedTerminationParams {
    /// Trace width of the terminated line.
    pub width: f64,
    /// Gap of the terminated line.
    pub gap: f64,
    pub angle_resolution: f64,
}

impl Default for ClosedTerminationParams {
    fn default() -> Self {
        Self {
            width: WIDTH,
            gap: GAP,
            angle_resolution: ANGLE_RESOLUTION,
        }
    }
}

/// Closed (inductive) termination.
///
/// The trace merges into ground, so the mask keeps only the gap region: a
/// square block minus the trace half-disc, with quarter-disc bites of radius
/// `gap` taken out of the two far corners so the gap arcs rejoin the line
/// gaps tangentially.
pub fn termination_close(params: &ClosedTerminationParams) -> Result<Component> {
    let &ClosedTerminationParams {
        width,
        gap,
        angle_resolution,
    } = params;
    check_term_dims(width, gap)?;
    let hw = width / 2. + gap;

    let block = Shape::new(
        Layer::MASK,
        vec![Polygon::from_verts(vec![
            Point::new(-hw, 0.),
            Point::new(hw, 0.),
            Point::new(hw, hw),
            Point::new(-hw, hw),
        ])],
    );
    let w2 = width / 2.;
    let mut half_disc = vec![Point::new(w2, 0.)];
    half_disc.extend(arc(Point::zero(), w2, 0., 180., angle_resolution));
    let half_disc = Shape::new(Layer::MASK, vec![Polygon::from_verts(half_disc)]);

    let mut mask = subtract(&block, &half_disc)?;
    for corner in [Point::new(-hw, hw), Point::new(hw, hw)] {
        let bite = Shape::new(
            Layer::MASK,
            vec![Polygon::from_verts(arc(corner, gap, 0., 360., angle_resolution))],
        );
        mask = subtract(&mask, &bite)?;
    }

    let mut b = ComponentBuilder::new("termination_close");
    b.add_shape(mask);
    b.add_port(Port::new("o1", Point::zero(), 270., width));
    b.set_info("width", width);
    b.set_info("gap", gap);
    Ok(b.finish())
}
