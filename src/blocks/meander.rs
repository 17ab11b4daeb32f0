//! Path-length-matching meander synthesis.
//!
//! Callers specify an *electrical* length target; the closed form below
//! solves for the straight-run length per fold so that, once every corner is
//! rounded, the realized centerline length equals the request. The bend
//! correction uses the arc length reported by the bend cell, which is
//! shorter than an ideal quarter circle.

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::error::{CpwgenError, Result};
use crate::geometry::Point;
use crate::primitives::Bend90;
use crate::route::round_corners;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanderParams {
    /// Target electrical length of the full path.
    pub length: f64,
    /// Lead-in length.
    pub l0: f64,
    /// Number of folds.
    pub n: usize,
    /// Bend radius.
    pub radius: f64,
    /// Half-meander pitch.
    pub dy: f64,
    /// Feedline offset of the coupling stub.
    pub dx: f64,
    /// Coupling-stub length.
    pub dc: f64,
    /// Trace width.
    pub width: f64,
}

impl Default for MeanderParams {
    fn default() -> Self {
        Self {
            length: 400.,
            l0: 30.,
            n: 1,
            radius: 10.,
            dy: 15.,
            dx: 40.,
            dc: 5.,
            width: 2.,
        }
    }
}

/// Solves for the straight-run length per fold given the measured arc
/// length `curve` of one rounded bend.
///
/// Inverts the forward accounting of [`round_corners`]: `2n + 1` straight
/// runs, `4n` fold corners, one fold-exit corner merged into the coupling
/// run, and one coupling corner absorbed into the termination allowance
/// `lc = dx - r + curve + dc`.
pub fn straight_run(params: &MeanderParams, curve: f64) -> Result<f64> {
    let &MeanderParams {
        length,
        l0,
        n,
        radius,
        dy,
        dx,
        dc,
        ..
    } = params;
    if dy < 0. {
        return Err(CpwgenError::invalid_dimension(
            "dy",
            format!("dy={dy} must be > 0"),
        ));
    }
    if dy < radius {
        return Err(CpwgenError::invalid_dimension(
            "dy",
            format!("dy={dy} must be >= the bend radius {radius}; a half-meander pitch smaller than the bend radius cannot be routed"),
        ));
    }
    let n = n as f64;
    let lc = dx - radius + curve + dc;
    let dl = (length + l0 + 4. * n * (2. * radius - curve - dy) - lc) / (2. * n + 1.);
    let l2 = dl - l0;
    if l2 < 0. {
        return Err(CpwgenError::InfeasibleGeometry(format!(
            "meander is too short (L2 = {l2:.3}): reduce L0 ({l0}), reduce dy ({dy}), \
             increase the total length ({length}), or decrease n ({n})"
        )));
    }
    Ok(l2)
}

/// Ordered waypoints of the folded path, snapped to the layout grid.
///
/// `4n + 3` points describe the meander body and coupling run; the final
/// point appends the coupling-stub rise of `r + dc`.
pub fn meander_waypoints(params: &MeanderParams, curve: f64) -> Result<Vec<Point>> {
    let l2 = straight_run(params, curve)?;
    let &MeanderParams {
        l0,
        n,
        radius,
        dy,
        dx,
        dc,
        ..
    } = params;

    let mut y = 0.;
    let mut path = vec![Point::new(0., y), Point::new(l2, y)];
    for _ in 0..n {
        y -= 2. * dy;
        path.push(Point::new(l2, y));
        path.push(Point::new(-l0, y));
        y -= 2. * dy;
        path.push(Point::new(-l0, y));
        path.push(Point::new(l2, y));
    }
    path.push(Point::new(l2 + dx, y));
    path.push(Point::new(l2 + dx, y + radius + dc));
    Ok(path.iter().map(Point::snap_to_grid).collect())
}

/// Synthesizes the routed meander path.
///
/// Returns a component with ports `o1` (far end) and `o2` (coupling stub)
/// and the realized length in its `length` metadata.
pub fn meander_path(params: &MeanderParams) -> Result<Component> {
    let bend = Bend90::new(params.radius, params.width)?;
    let waypoints = meander_waypoints(params, bend.length())?;
    round_corners(&waypoints, &bend, params.width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::geometry::GRID;

    #[test]
    fn test_scenario_waypoint_count() {
        // length=400, L0=30, n=1, r=10, dy=15, dx=40, dc=5.
        let params = MeanderParams::default();
        let bend = Bend90::new(params.radius, params.width).unwrap();
        let l2 = straight_run(&params, bend.length()).unwrap();
        assert!(l2 >= 0.);
        let wp = meander_waypoints(&params, bend.length()).unwrap();
        // 4n + 3 points before the coupling-stub rise.
        assert_eq!(wp.len(), 4 * params.n + 4);
        let last = wp[wp.len() - 1];
        let prev = wp[wp.len() - 2];
        assert_abs_diff_eq!(last.y - prev.y, params.radius + params.dc, epsilon = 2. * GRID);
    }

    #[test]
    fn test_length_inversion() {
        for (length, n, dy) in [(400., 1, 15.), (1200., 3, 20.), (800., 2, 12.)] {
            let params = MeanderParams {
                length,
                n,
                dy,
                radius: 10.,
                ..Default::default()
            };
            let path = meander_path(&params).unwrap();
            let realized = path.info().get("length").unwrap();
            // Within one grid unit per coordinate round-off.
            assert_abs_diff_eq!(realized, length, epsilon = 10. * GRID);
        }
    }

    #[test]
    fn test_feasibility_boundary_on_dy() {
        let bend = Bend90::new(10., 2.).unwrap();
        let at_radius = MeanderParams {
            dy: 10.,
            length: 500.,
            ..Default::default()
        };
        assert!(straight_run(&at_radius, bend.length()).is_ok());

        let below = MeanderParams {
            dy: 10. - 1e-6,
            length: 500.,
            ..Default::default()
        };
        let err = straight_run(&below, bend.length()).unwrap_err();
        assert!(matches!(
            err,
            CpwgenError::InvalidDimension { param: "dy", .. }
        ));
    }

    #[test]
    fn test_too_short_length_is_infeasible() {
        let params = MeanderParams {
            length: 50.,
            n: 4,
            ..Default::default()
        };
        let bend = Bend90::new(params.radius, params.width).unwrap();
        let err = straight_run(&params, bend.length()).unwrap_err();
        match err {
            CpwgenError::InfeasibleGeometry(msg) => {
                // The message names the parameters a caller can relax.
                assert!(msg.contains("L0"));
                assert!(msg.contains("dy"));
                assert!(msg.contains("length"));
                assert!(msg.contains("n"));
            }
            other => panic!("expected InfeasibleGeometry, got {other:?}"),
        }
    }

    #[test]
    fn test_ports_at_path_extremities() {
        let params = MeanderParams::default();
        let path = meander_path(&params).unwrap();
        let o1 = path.port("o1").unwrap();
        let o2 = path.port("o2").unwrap();
        assert_abs_diff_eq!(o1.center.x, 0., epsilon = 1e-9);
        assert_abs_diff_eq!(o1.center.y, 0., epsilon = 1e-9);
        assert_abs_diff_eq!(o1.orientation, 180., epsilon = 1e-9);
        // Coupling stub rises at the end of the dx run.
        assert_abs_diff_eq!(o2.orientation, 90., epsilon = 1e-9);
        assert_abs_diff_eq!(
            o2.center.y,
            -4. * params.n as f64 * params.dy + params.radius + params.dc,
            epsilon = 2. * GRID
        );
    }
}
