//! Coplanar waveguide elements.
//!
//! Every cell here returns the negative mask of the waveguide: the
//! ground-plane cutout obtained by subtracting the bare trace from the
//! trace-plus-gap envelope.

use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentBuilder, Port};
use crate::error::{CpwgenError, Result};
use crate::geometry::boolean::subtract;
use crate::geometry::transform::Transformation;
use crate::geometry::{Layer, Point};
use crate::primitives::{straight, taper};

pub const WIDTH: f64 = 6.;
pub const GAP: f64 = 3.;
pub const WIDTH_PAD: f64 = 350.;
pub const GAP_PAD: f64 = 70.;
pub const SPACE_PAD: f64 = 10.;

fn check_cpw_dims(width: f64, gap: f64) -> Result<()> {
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

/// Negative mask of a CPW whose centerline cell is produced by `factory` at
/// a requested trace width.
///
/// The factory is invoked twice: once at `width + 2 * gap` for the outer
/// envelope and once at `width` for the bare trace; the mask is their
/// difference. Ports are taken from the outer cell, re-labeled with the
/// trace width.
pub fn cpw(
    factory: impl Fn(f64) -> Result<Component>,
    width: f64,
    gap: f64,
) -> Result<Component> {
    check_cpw_dims(width, gap)?;
    let outer = factory(width + 2. * gap)?;
    let inner = factory(width)?;
    let mask = subtract(&outer.merged(Layer::MASK), &inner.merged(Layer::MASK))?;

    let mut b = ComponentBuilder::new("cpw");
    b.add_shape(mask);
    for port in outer.ports() {
        let mut port = port.clone();
        port.width = width;
        b.add_port(port);
    }
    if let Some(length) = outer.info().get("length") {
        b.set_info("length", length);
    }
    b.set_info("width", width);
    b.set_info("gap", gap);
    Ok(b.finish())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedlineParams {
    pub length: f64,
    pub width: f64,
    pub gap: f64,
}

impl Default for FeedlineParams {
    fn default() -> Self {
        Self {
            length: 1000.,
            width: WIDTH,
            gap: GAP,
        }
    }
}

/// A straight CPW, the shared feedline of resonator arrays.
///
/// Records `cpw_length`, `width`, and `gap` metadata for the array placer.
pub fn feedline(params: &FeedlineParams) -> Result<Component> {
    let c = cpw(|w| straight(params.length, w), params.width, params.gap)?;
    let mut b = ComponentBuilder::new("feedline");
    b.add_shape(c.merged(Layer::MASK));
    b.add_ports(c.ports().iter().cloned());
    b.set_info("cpw_length", params.length);
    b.set_info("width", params.width);
    b.set_info("gap", params.gap);
    Ok(b.finish())
}

/// A straight section with a taper prepended at its `o1` side.
///
/// Port `o1` is the narrow taper tip at the origin facing 180, `o2` the far
/// end of the straight body.
pub fn straight_taper(
    len_rect: f64,
    len_taper: f64,
    width_tip: f64,
    width_body: f64,
) -> Result<Component> {
    let mut b = ComponentBuilder::new("straight_taper");
    let tp = Arc::new(taper(len_taper, width_tip, width_body)?);
    let st = Arc::new(straight(len_rect, width_body)?);
    b.place(tp, Transformation::identity());
    let body = b.place(st, Transformation::translate(len_taper, 0.));
    b.add_port(Port::new("o1", Point::zero(), 180., width_tip));
    b.add_port(body.port("o2")?.renamed("o2"));
    b.set_info("length", len_rect + len_taper);
    Ok(b.finish())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RfPortParams {
    /// Trace width at the connection to the cpw.
    pub width1: f64,
    /// Trace width of the bonding pad.
    pub width2: f64,
    /// Gap of the final cpw.
    pub gap1: f64,
    /// Gap of the bonding pad.
    pub gap2: f64,
    pub len_taper: f64,
    pub len_rect: f64,
    /// Gap behind the bonding pad.
    pub space_pad: f64,
}

impl Default for RfPortParams {
    fn default() -> Self {
        Self {
            width1: WIDTH,
            width2: WIDTH_PAD,
            gap1: GAP,
            gap2: GAP_PAD,
            len_taper: 200.,
            len_rect: 100.,
            space_pad: SPACE_PAD,
        }
    }
}

/// Launcher pad: a tapered CPW transition from a bonding pad down to the
/// line dimensions, as a negative mask closed behind the pad.
pub fn rf_port(params: &RfPortParams) -> Result<Component> {
    check_cpw_dims(params.width1, params.gap1)?;
    check_cpw_dims(params.width2, params.gap2)?;
    let outer = straight_taper(
        params.len_rect + params.space_pad,
        params.len_taper,
        params.width1 + 2. * params.gap1,
        params.width2 + 2. * params.gap2,
    )?;
    let inner = straight_taper(
        params.len_rect,
        params.len_taper,
        params.width1,
        params.width2,
    )?;
    let mask = subtract(&outer.merged(Layer::MASK), &inner.merged(Layer::MASK))?;

    let mut b = ComponentBuilder::new("rf_port");
    b.add_shape(mask);
    for port in outer.ports() {
        let mut port = port.clone();
        port.width = if port.name == "o1" {
            params.width1
        } else {
            params.width2
        };
        b.add_port(port);
    }
    Ok(b.finish())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CpwWithPortsParams {
    pub feedline: FeedlineParams,
    pub port: RfPortParams,
}

/// CPW with a launcher at each extremity.
pub fn cpw_with_ports(params: &CpwWithPortsParams) -> Result<Component> {
    let launcher = RfPortParams {
        width1: params.feedline.width,
        gap1: params.feedline.gap,
        ..params.port.clone()
    };
    let launch = Arc::new(rf_port(&launcher)?);
    let line = Arc::new(feedline(&params.feedline)?);

    let mut b = ComponentBuilder::new("cpw_with_ports");
    let line_ref = b.place(Arc::clone(&line), Transformation::identity());
    b.connect(Arc::clone(&launch), "o1", &line_ref.port("o1")?)?;
    b.connect(launch, "o1", &line_ref.port("o2")?)?;
    b.set_info("cpw_length", params.feedline.length);
    b.set_info("width", params.feedline.width);
    b.set_info("gap", params.feedline.gap);
    info!(
        "generated cpw_with_ports: length={} width={} gap={}",
        params.feedline.length, params.feedline.width, params.feedline.gap
    );
    Ok(b.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_straight_cpw_mask_is_two_gap_strips() {
        let c = feedline(&FeedlineParams {
            length: 100.,
            width: 6.,
            gap: 3.,
        })
        .unwrap();
        let mask = c.merged(Layer::MASK);
        // Two strips of 100 x 3 each.
        assert_abs_diff_eq!(mask.area(), 600., epsilon = 1e-6);
        let bbox = mask.bbox().unwrap();
        assert_abs_diff_eq!(bbox.height(), 12., epsilon = 1e-9);
        assert_eq!(c.info().get("cpw_length"), Some(100.));
    }

    #[test]
    fn test_cpw_ports_carry_trace_width() {
        let c = feedline(&FeedlineParams::default()).unwrap();
        assert_abs_diff_eq!(c.port("o1").unwrap().width, WIDTH);
        assert_abs_diff_eq!(c.port("o2").unwrap().orientation, 0.);
    }

    #[test]
    fn test_invalid_cpw_dims() {
        let err = feedline(&FeedlineParams {
            length: 100.,
            width: 0.,
            gap: 3.,
        })
        .unwrap_err();
        assert!(matches!(err, CpwgenError::InvalidDimension { param: "width", .. }));
        assert!(feedline(&FeedlineParams {
            length: 100.,
            width: 6.,
            gap: -1.,
        })
        .is_err());
    }

    #[test]
    fn test_rf_port_mask_area() {
        let p = RfPortParams::default();
        let c = rf_port(&p).unwrap();
        // Outer trapezoid+rect minus inner trapezoid+rect, computed in closed
        // form: trapezoid area = len * (w_a + w_b) / 2.
        let outer_area = p.len_taper
            * ((p.width1 + 2. * p.gap1) + (p.width2 + 2. * p.gap2))
            / 2.
            + (p.len_rect + p.space_pad) * (p.width2 + 2. * p.gap2);
        let inner_area =
            p.len_taper * (p.width1 + p.width2) / 2. + p.len_rect * p.width2;
        let mask = c.merged(Layer::MASK);
        assert_abs_diff_eq!(mask.area(), outer_area - inner_area, epsilon = 1e-3);
    }

    #[test]
    fn test_cpw_with_ports_extends_both_ends() {
        let params = CpwWithPortsParams::default();
        let c = cpw_with_ports(&params).unwrap();
        let bbox = c.bbox().unwrap();
        let launcher_len = params.port.len_taper + params.port.len_rect + params.port.space_pad;
        assert_abs_diff_eq!(
            bbox.width(),
            params.feedline.length + 2. * launcher_len,
            epsilon = 1e-6
        );
    }
}
