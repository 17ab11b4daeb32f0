//! Resonator assembly: meandered CPW plus terminations.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentBuilder};
use crate::error::Result;
use crate::geometry::transform::Transformation;
use crate::primitives::{Bend90, ANGLE_RESOLUTION};
use crate::route::round_corners;

use super::cpw::cpw;
use super::meander::{meander_waypoints, MeanderParams};
use super::termination::{
    termination_close, termination_open, ClosedTerminationParams, OpenTerminationParams,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResonatorParams {
    pub meander: MeanderParams,
    /// Ground gap of the resonator CPW.
    pub gap: f64,
    /// Quarter-wave resonators keep the far end shorted and the coupling end
    /// open; half-wave resonators are shorted at both ends.
    pub quarter_wave: bool,
    pub angle_resolution: f64,
}

impl Default for ResonatorParams {
    fn default() -> Self {
        Self {
            meander: MeanderParams::default(),
            gap: 1.,
            quarter_wave: true,
            angle_resolution: ANGLE_RESOLUTION,
        }
    }
}

/// Builds a meandered CPW resonator with its terminations.
///
/// The negative mask is the difference of two corner-rounded routes over the
/// same waypoints, one at the trace-plus-gap envelope width and one at the
/// trace width. Ports `o1` (far end) and `o2` (coupling stub) are exposed at
/// the trace width; metadata records the realized `length`, `width`, and
/// `gap`.
pub fn resonator(params: &ResonatorParams) -> Result<Component> {
    let m = &params.meander;
    // The bend arc length depends only on the radius, so both route widths
    // share one waypoint solution.
    let curve = Bend90::new(m.radius, m.width)?.length();
    let waypoints = meander_waypoints(m, curve)?;

    let line = cpw(
        |w| {
            let bend = Bend90::new(m.radius, w)?;
            round_corners(&waypoints, &bend, w)
        },
        m.width,
        params.gap,
    )?;
    let realized = line.require_info("length")?;

    let mut b = ComponentBuilder::new("resonator");
    for port in line.ports() {
        b.add_port(port.clone());
    }
    let o1 = line.port("o1")?.clone();
    let o2 = line.port("o2")?.clone();
    b.place(Arc::new(line), Transformation::identity());

    let t1 = Arc::new(termination_close(&ClosedTerminationParams {
        width: m.width,
        gap: params.gap,
        angle_resolution: params.angle_resolution,
    })?);
    b.connect(t1, "o1", &o1)?;

    if params.quarter_wave {
        let t2 = Arc::new(termination_open(&OpenTerminationParams {
            width: m.width,
            gap: params.gap,
            dt: params.gap,
            r: params.gap,
            angle_resolution: params.angle_resolution,
        })?);
        b.connect(t2, "o1", &o2)?;
    } else {
        let t2 = Arc::new(termination_close(&ClosedTerminationParams {
            width: m.width,
            gap: params.gap,
            angle_resolution: params.angle_resolution,
        })?);
        b.connect(t2, "o1", &o2)?;
    }

    b.set_info("length", realized);
    b.set_info("width", m.width);
    b.set_info("gap", params.gap);
    debug!(
        "resonator: target={} realized={realized} width={} gap={}",
        m.length, m.width, params.gap
    );
    Ok(b.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::geometry::{Layer, GRID};

    #[test]
    fn test_resonator_realizes_target_length() {
        let params = ResonatorParams::default();
        let c = resonator(&params).unwrap();
        assert_abs_diff_eq!(
            c.info().get("length").unwrap(),
            params.meander.length,
            epsilon = 10. * GRID
        );
        assert_eq!(c.info().get("width"), Some(params.meander.width));
        assert_eq!(c.info().get("gap"), Some(params.gap));
    }

    #[test]
    fn test_coupling_port_location() {
        let params = ResonatorParams::default();
        let m = &params.meander;
        let c = resonator(&params).unwrap();
        let o2 = c.port("o2").unwrap();
        assert_abs_diff_eq!(o2.orientation, 90., epsilon = 1e-9);
        assert_abs_diff_eq!(o2.width, m.width, epsilon = 1e-9);
        assert_abs_diff_eq!(
            o2.center.y,
            -4. * m.n as f64 * m.dy + m.radius + m.dc,
            epsilon = 2. * GRID
        );
    }

    #[test]
    fn test_quarter_wave_selects_open_coupling_end() {
        let quarter = resonator(&ResonatorParams::default()).unwrap();
        assert!(quarter
            .children()
            .iter()
            .any(|inst| inst.cell().name() == "termination_open"));

        let half = resonator(&ResonatorParams {
            quarter_wave: false,
            ..Default::default()
        })
        .unwrap();
        assert!(!half
            .children()
            .iter()
            .any(|inst| inst.cell().name() == "termination_open"));
        let n_closed = half
            .children()
            .iter()
            .filter(|inst| inst.cell().name() == "termination_close")
            .count();
        assert_eq!(n_closed, 2);
    }

    #[test]
    fn test_mask_is_nonempty_negative() {
        let c = resonator(&ResonatorParams::default()).unwrap();
        let mask = c.merged(Layer::MASK);
        assert!(mask.area() > 0.);
        // The cutout is two gap strips; its area is close to
        // 2 * gap * realized_length, up to corner and termination detail.
        let approx_area = 2. * c.info().get("gap").unwrap() * c.info().get("length").unwrap();
        assert!(mask.area() > 0.5 * approx_area);
        assert!(mask.area() < 2. * approx_area);
    }
}
