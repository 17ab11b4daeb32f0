//! Manhattan corner-rounding rasterizer.
//!
//! Takes a waypoint polyline, replaces every 90-degree corner with a placed
//! bend cell, and fills the rest with straight strips. The realized length it
//! reports is `sum(segments) - n_corners * (2r - curve)`: each corner trades
//! `r` of straight run on both legs for one bend arc of length `curve`.

use std::sync::Arc;

use crate::component::{Component, ComponentBuilder, Port};
use crate::error::{CpwgenError, Result};
use crate::geometry::transform::Transformation;
use crate::geometry::{Point, GRID};
use crate::primitives::{straight, Bend90};

const EPS: f64 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq)]
struct Dir {
    dx: f64,
    dy: f64,
}

impl Dir {
    fn between(a: Point, b: Point) -> Result<Self> {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        if dx.abs() > EPS && dy.abs() > EPS {
            return Err(CpwgenError::Geometry(format!(
                "non-manhattan segment from ({}, {}) to ({}, {})",
                a.x, a.y, b.x, b.y
            )));
        }
        let len = dx.abs() + dy.abs();
        Ok(Self {
            dx: dx / len,
            dy: dy / len,
        })
    }

    fn heading(&self) -> f64 {
        self.dy.atan2(self.dx).to_degrees().rem_euclid(360.)
    }

    /// z-component of the cross product; positive for a left turn.
    fn cross(&self, other: &Dir) -> f64 {
        self.dx * other.dy - self.dy * other.dx
    }

    fn advance(&self, p: Point, dist: f64) -> Point {
        Point::new(p.x + self.dx * dist, p.y + self.dy * dist)
    }
}

/// Drops duplicate and collinear waypoints.
///
/// Collinear elision matters for length accounting: a waypoint in the middle
/// of a straight run is not a corner and must not consume a bend.
fn simplify(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if let Some(&last) = out.last() {
            if last.distance_to(p) < GRID / 2. {
                continue;
            }
        }
        out.push(p);
    }
    let mut i = 1;
    while i + 1 < out.len() {
        let a = out[i - 1];
        let b = out[i];
        let c = out[i + 1];
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        let dot = (b.x - a.x) * (c.x - b.x) + (b.y - a.y) * (c.y - b.y);
        if cross.abs() < EPS && dot > 0. {
            out.remove(i);
        } else {
            i += 1;
        }
    }
    out
}

/// Routes a filled polyline of the given width along `points`, rounding
/// every corner with `bend`.
///
/// Returns a component with ports `o1` (start) and `o2` (end) and the
/// realized centerline length in its `length` metadata.
pub fn round_corners(points: &[Point], bend: &Bend90, width: f64) -> Result<Component> {
    if points.iter().any(|p| !p.is_finite()) {
        return Err(CpwgenError::Geometry(
            "waypoints contain non-finite coordinates".to_string(),
        ));
    }
    let pts = simplify(points);
    if pts.len() < 2 {
        return Err(CpwgenError::Geometry(
            "a path needs at least 2 distinct waypoints".to_string(),
        ));
    }
    let r = bend.radius();

    let mut dirs = Vec::with_capacity(pts.len() - 1);
    for w in pts.windows(2) {
        dirs.push(Dir::between(w[0], w[1])?);
    }

    let mut b = ComponentBuilder::new("route");
    let mut realized = 0.;
    let mut n_bends = 0usize;
    let mut cursor = pts[0];
    let bend_cell = Arc::clone(bend.cell());

    for i in 1..pts.len() - 1 {
        let corner = pts[i];
        let d_in = dirs[i - 1];
        let d_out = dirs[i];
        if d_in.cross(&d_out).abs() < EPS {
            return Err(CpwgenError::Geometry(format!(
                "path reverses on itself at ({}, {})",
                corner.x, corner.y
            )));
        }
        let entry = d_in.advance(corner, -r);
        let run = d_in.dx * (entry.x - cursor.x) + d_in.dy * (entry.y - cursor.y);
        if run < -EPS {
            return Err(CpwgenError::InfeasibleGeometry(format!(
                "segment into corner ({}, {}) is too short for bend radius {r}; \
                 increase segment lengths or decrease the radius",
                corner.x, corner.y
            )));
        }
        if run > GRID / 2. {
            let cell = Arc::new(straight(run, width)?);
            b.place(
                cell,
                Transformation {
                    translation: cursor,
                    rotation: d_in.heading(),
                    reflect_vert: false,
                },
            );
        }
        realized += run.max(0.);

        b.place(
            Arc::clone(&bend_cell),
            Transformation {
                translation: entry,
                rotation: d_in.heading(),
                reflect_vert: d_in.cross(&d_out) < 0.,
            },
        );
        realized += bend.length();
        n_bends += 1;
        cursor = d_out.advance(corner, r);
    }

    let d_last = *dirs.last().unwrap();
    let end = *pts.last().unwrap();
    let run = d_last.dx * (end.x - cursor.x) + d_last.dy * (end.y - cursor.y);
    if run < -EPS {
        return Err(CpwgenError::InfeasibleGeometry(format!(
            "final segment is too short for bend radius {r}"
        )));
    }
    if run > GRID / 2. {
        let cell = Arc::new(straight(run, width)?);
        b.place(
            cell,
            Transformation {
                translation: cursor,
                rotation: d_last.heading(),
                reflect_vert: false,
            },
        );
    }
    realized += run.max(0.);

    b.add_port(Port::new("o1", pts[0], dirs[0].heading() + 180., width));
    b.add_port(Port::new("o2", end, d_last.heading(), width));
    b.set_info("length", realized);
    b.set_info("n_bends", n_bends as f64);
    b.set_info("width", width);
    Ok(b.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_straight_route_length() {
        let bend = Bend90::new(10., 2.).unwrap();
        let route = round_corners(&pts(&[(0., 0.), (100., 0.)]), &bend, 2.).unwrap();
        assert_abs_diff_eq!(route.info().get("length").unwrap(), 100., epsilon = 1e-9);
        assert_eq!(route.info().get("n_bends"), Some(0.));
    }

    #[test]
    fn test_l_route_length_accounting() {
        let bend = Bend90::new(10., 2.).unwrap();
        let route = round_corners(&pts(&[(0., 0.), (50., 0.), (50., 40.)]), &bend, 2.).unwrap();
        let expected = 50. + 40. - (2. * 10. - bend.length());
        assert_abs_diff_eq!(route.info().get("length").unwrap(), expected, epsilon = 1e-9);
        assert_eq!(route.info().get("n_bends"), Some(1.));

        let o1 = route.port("o1").unwrap();
        let o2 = route.port("o2").unwrap();
        assert_abs_diff_eq!(o1.orientation, 180.);
        assert_abs_diff_eq!(o2.center.x, 50.);
        assert_abs_diff_eq!(o2.center.y, 40.);
        assert_abs_diff_eq!(o2.orientation, 90.);
    }

    #[test]
    fn test_collinear_waypoints_are_not_corners() {
        let bend = Bend90::new(10., 2.).unwrap();
        let route = round_corners(
            &pts(&[(0., 0.), (30., 0.), (80., 0.), (80., 40.)]),
            &bend,
            2.,
        )
        .unwrap();
        assert_eq!(route.info().get("n_bends"), Some(1.));
        let expected = 80. + 40. - (2. * 10. - bend.length());
        assert_abs_diff_eq!(route.info().get("length").unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_short_segment_rejected() {
        let bend = Bend90::new(10., 2.).unwrap();
        // The middle run (15) cannot host two radius-10 bend entries.
        let err = round_corners(
            &pts(&[(0., 0.), (50., 0.), (50., 15.), (100., 15.)]),
            &bend,
            2.,
        )
        .unwrap_err();
        assert!(matches!(err, CpwgenError::InfeasibleGeometry(_)));
    }

    #[test]
    fn test_non_manhattan_rejected() {
        let bend = Bend90::new(10., 2.).unwrap();
        let err = round_corners(&pts(&[(0., 0.), (50., 30.)]), &bend, 2.).unwrap_err();
        assert!(matches!(err, CpwgenError::Geometry(_)));
    }

    #[test]
    fn test_right_turn_is_mirrored_bend() {
        let bend = Bend90::new(10., 2.).unwrap();
        let route = round_corners(&pts(&[(0., 0.), (50., 0.), (50., -40.)]), &bend, 2.).unwrap();
        let mirrored = route
            .children()
            .iter()
            .any(|inst| inst.transformation().reflect_vert);
        assert!(mirrored);
        let o2 = route.port("o2").unwrap();
        assert_abs_diff_eq!(o2.orientation, 270.);
    }
}
