//! Polygon boolean operations.
//!
//! The domain convention throughout the generator is
//! `subtract(outer, inner) = ground-plane cutout`: the outer envelope of a
//! trace (width plus twice the gap) minus the bare trace leaves exactly the
//! gap fill that must be etched out of the ground plane.

use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon as GeoPolygon};

use crate::error::{CpwgenError, Result};
use super::{Point, Polygon, Shape};

/// Minimum area for a contour to survive a boolean operation. Anything
/// smaller is a numerical sliver.
const SLIVER_AREA: f64 = 1e-9;

fn ring(points: &[Point]) -> LineString<f64> {
    LineString::from(
        points
            .iter()
            .map(|p| Coord { x: p.x, y: p.y })
            .collect::<Vec<_>>(),
    )
}

fn check_finite(shape: &Shape, role: &str) -> Result<()> {
    if shape.polygons.iter().all(Polygon::is_finite) {
        Ok(())
    } else {
        Err(CpwgenError::Geometry(format!(
            "{role} operand contains non-finite coordinates"
        )))
    }
}

/// Merges all contours of a shape into one backend multi-polygon.
///
/// Contours of a single shape are allowed to overlap (routed paths overlap
/// slightly at segment joints), so they are unioned rather than collected.
fn to_multipolygon(shape: &Shape) -> MultiPolygon<f64> {
    let mut acc = MultiPolygon::<f64>(Vec::new());
    for poly in &shape.polygons {
        if poly.outer().len() < 3 {
            continue;
        }
        let gp = GeoPolygon::new(
            ring(poly.outer()),
            poly.holes().iter().map(|h| ring(h)).collect(),
        );
        acc = acc.union(&MultiPolygon(vec![gp]));
    }
    acc
}

fn from_multipolygon(mp: MultiPolygon<f64>, shape: &Shape) -> Result<Shape> {
    let mut polygons = Vec::new();
    for gp in mp.0 {
        let outer: Vec<Point> = gp
            .exterior()
            .0
            .iter()
            .map(|c| Point::new(c.x, c.y))
            .collect();
        if outer.iter().any(|p| !p.is_finite()) {
            return Err(CpwgenError::Geometry(
                "boolean backend produced non-finite coordinates".to_string(),
            ));
        }
        let holes: Vec<Vec<Point>> = gp
            .interiors()
            .iter()
            .map(|h| h.0.iter().map(|c| Point::new(c.x, c.y)).collect())
            .collect();
        let poly = Polygon::with_holes(outer, holes);
        if poly.outer().len() >= 3 && poly.area() > SLIVER_AREA {
            polygons.push(poly);
        }
    }
    Ok(Shape::new(shape.layer, polygons))
}

/// Returns the polygon set obtained by removing `inner`'s area from
/// `outer`'s area.
///
/// An empty result for genuinely disjoint or covered operands is not an
/// error; only degenerate inputs or backend failures are.
pub fn subtract(outer: &Shape, inner: &Shape) -> Result<Shape> {
    check_finite(outer, "outer")?;
    check_finite(inner, "inner")?;
    let a = to_multipolygon(outer);
    let b = to_multipolygon(inner);
    if a.0.is_empty() && !outer.is_empty() {
        return Err(CpwgenError::Geometry(
            "outer operand collapsed to nothing; contours are degenerate".to_string(),
        ));
    }
    from_multipolygon(a.difference(&b), outer)
}

/// Union of two shapes, on the layer of the first.
pub fn union(a: &Shape, b: &Shape) -> Result<Shape> {
    check_finite(a, "left")?;
    check_finite(b, "right")?;
    let merged = to_multipolygon(a).union(&to_multipolygon(b));
    from_multipolygon(merged, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Layer;
    use approx::assert_abs_diff_eq;

    fn square(x0: f64, y0: f64, side: f64) -> Shape {
        Shape::new(
            Layer::MASK,
            vec![Polygon::from_verts(vec![
                Point::new(x0, y0),
                Point::new(x0 + side, y0),
                Point::new(x0 + side, y0 + side),
                Point::new(x0, y0 + side),
            ])],
        )
    }

    #[test]
    fn test_subtract_self_is_empty() {
        let s = square(0., 0., 10.);
        let diff = subtract(&s, &s).unwrap();
        assert!(diff.is_empty());
        assert_abs_diff_eq!(diff.area(), 0.);
    }

    #[test]
    fn test_subtract_empty_is_identity() {
        let s = square(0., 0., 10.);
        let diff = subtract(&s, &Shape::empty(Layer::MASK)).unwrap();
        assert_abs_diff_eq!(diff.area(), s.area(), epsilon = 1e-6);
    }

    #[test]
    fn test_subtract_contained_leaves_hole() {
        let outer = square(0., 0., 10.);
        let inner = square(4., 4., 2.);
        let diff = subtract(&outer, &inner).unwrap();
        assert_abs_diff_eq!(diff.area(), 96., epsilon = 1e-6);
        assert!(diff.polygons.iter().any(|p| !p.holes().is_empty()));
    }

    #[test]
    fn test_subtract_disjoint() {
        let a = square(0., 0., 2.);
        let b = square(10., 10., 2.);
        let diff = subtract(&a, &b).unwrap();
        assert_abs_diff_eq!(diff.area(), 4., epsilon = 1e-6);
    }

    #[test]
    fn test_overlapping_contours_are_merged() {
        let mut s = square(0., 0., 4.);
        s.polygons.extend(square(2., 0., 4.).polygons);
        let merged = subtract(&s, &Shape::empty(Layer::MASK)).unwrap();
        // 4x4 + 4x4 overlapping by 2x4.
        assert_abs_diff_eq!(merged.area(), 24., epsilon = 1e-6);
    }

    #[test]
    fn test_union_merges_disjoint_shapes() {
        let a = square(0., 0., 2.);
        let b = square(5., 0., 3.);
        let merged = union(&a, &b).unwrap();
        assert_eq!(merged.polygons.len(), 2);
        assert_abs_diff_eq!(merged.area(), 13., epsilon = 1e-6);
    }

    #[test]
    fn test_non_finite_input_fails() {
        let mut s = square(0., 0., 2.);
        s.polygons.push(Polygon::from_verts(vec![
            Point::new(f64::NAN, 0.),
            Point::new(1., 0.),
            Point::new(1., 1.),
        ]));
        let err = subtract(&s, &Shape::empty(Layer::MASK)).unwrap_err();
        assert!(matches!(err, CpwgenError::Geometry(_)));
    }

    #[test]
    fn test_cpw_strip_mask() {
        // outer = widened trace, inner = bare trace: result is the gap fill.
        let outer = Shape::new(
            Layer::MASK,
            vec![Polygon::from_verts(vec![
                Point::new(0., -2.),
                Point::new(10., -2.),
                Point::new(10., 2.),
                Point::new(0., 2.),
            ])],
        );
        let inner = Shape::new(
            Layer::MASK,
            vec![Polygon::from_verts(vec![
                Point::new(0., -1.),
                Point::new(10., -1.),
                Point::new(10., 1.),
                Point::new(0., 1.),
            ])],
        );
        let gap = subtract(&outer, &inner).unwrap();
        assert_eq!(gap.polygons.len(), 2);
        assert_abs_diff_eq!(gap.area(), 20., epsilon = 1e-6);
    }
}
