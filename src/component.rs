//! Components, ports, and reference placement.
//!
//! A [`Component`] is an immutable aggregate of shapes, placed child
//! references, named ports, and a metadata map. Components are assembled
//! through a [`ComponentBuilder`]; a half-built component is never visible to
//! callers. Children are held by reference placement (translate / rotate /
//! mirror), never by raw coordinate copy, so each placement's transform stays
//! inspectable after composition.

use std::collections::BTreeMap;
use std::sync::Arc;

use arcstr::ArcStr;
use serde::Serialize;

use crate::error::{CpwgenError, Result};
use crate::geometry::transform::Transformation;
use crate::geometry::{wrap_angle, Bbox, Point, Shape};

/// Semantic kind of a port.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub enum PortKind {
    /// Microwave/RF signal port.
    #[default]
    Rf,
    /// DC characterization port.
    Dc,
}

/// A named directional anchor on a component boundary.
///
/// Ports are the only legal attachment points between components.
#[derive(Debug, Clone, Serialize)]
pub struct Port {
    pub name: ArcStr,
    pub center: Point,
    /// Orientation in degrees, `[0, 360)`, pointing out of the component.
    pub orientation: f64,
    /// Trace width at the port.
    pub width: f64,
    pub kind: PortKind,
}

impl Port {
    pub fn new(name: impl Into<ArcStr>, center: Point, orientation: f64, width: f64) -> Self {
        Self {
            name: name.into(),
            center,
            orientation: wrap_angle(orientation),
            width,
            kind: PortKind::Rf,
        }
    }

    pub fn renamed(&self, name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn transformed(&self, trans: &Transformation) -> Self {
        Self {
            name: self.name.clone(),
            center: trans.apply(self.center),
            orientation: trans.apply_angle(self.orientation),
            width: self.width,
            kind: self.kind,
        }
    }
}

/// Numeric metadata attached to a component (`length`, `width`, `gap`, ...).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Info(BTreeMap<ArcStr, f64>);

impl Info {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn set(&mut self, key: impl Into<ArcStr>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, f64)> {
        self.0.iter().map(|(k, &v)| (k, v))
    }
}

/// A placed reference to a child component.
#[derive(Debug, Clone)]
pub struct Instance {
    cell: Arc<Component>,
    trans: Transformation,
}

impl Instance {
    pub fn cell(&self) -> &Arc<Component> {
        &self.cell
    }

    pub fn transformation(&self) -> &Transformation {
        &self.trans
    }

    /// The named port of the referenced cell, in parent coordinates.
    pub fn port(&self, name: &str) -> Result<Port> {
        Ok(self.cell.port(name)?.transformed(&self.trans))
    }

    pub fn flatten(&self) -> Vec<Shape> {
        self.cell
            .flatten()
            .iter()
            .map(|s| self.trans.apply_shape(s))
            .collect()
    }

    pub fn bbox(&self) -> Option<Bbox> {
        bbox_of(&self.flatten())
    }
}

fn bbox_of(shapes: &[Shape]) -> Option<Bbox> {
    shapes
        .iter()
        .filter_map(Shape::bbox)
        .reduce(|a, b| a.union(&b))
}

/// An immutable geometry aggregate.
#[derive(Debug, Clone, Default)]
pub struct Component {
    name: ArcStr,
    shapes: Vec<Shape>,
    children: Vec<Instance>,
    ports: Vec<Port>,
    info: Info,
}

impl Component {
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn children(&self) -> &[Instance] {
        &self.children
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    pub fn port(&self, name: &str) -> Result<&Port> {
        self.ports
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| CpwgenError::MissingPort {
                cell: self.name.clone(),
                port: arcstr::ArcStr::from(name),
            })
    }

    /// Metadata lookup that fails with a descriptive error.
    pub fn require_info(&self, key: &str) -> Result<f64> {
        self.info.get(key).ok_or_else(|| CpwgenError::MissingInfo {
            cell: self.name.clone(),
            key: ArcStr::from(key),
        })
    }

    /// Resolves all reference placements into plain shapes.
    pub fn flatten(&self) -> Vec<Shape> {
        let mut out = self.shapes.clone();
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }

    pub fn bbox(&self) -> Option<Bbox> {
        bbox_of(&self.flatten())
    }

    /// Flattens the component into a single shape on the given layer.
    ///
    /// Boolean operands are built this way: the backend unions overlapping
    /// contours, so slight overlaps at segment joints are harmless.
    pub fn merged(&self, layer: crate::geometry::Layer) -> Shape {
        Shape::new(
            layer,
            self.flatten().into_iter().flat_map(|s| s.polygons).collect(),
        )
    }
}

/// Accumulates shapes, references, and ports, finalized into an immutable
/// [`Component`] by [`ComponentBuilder::finish`].
#[derive(Debug, Default)]
pub struct ComponentBuilder {
    name: ArcStr,
    shapes: Vec<Shape>,
    children: Vec<Instance>,
    ports: Vec<Port>,
    info: Info,
}

impl ComponentBuilder {
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_shape(&mut self, shape: Shape) -> &mut Self {
        self.shapes.push(shape);
        self
    }

    /// Places a child reference with an explicit transform and returns it.
    pub fn place(&mut self, cell: Arc<Component>, trans: Transformation) -> Instance {
        let inst = Instance { cell, trans };
        self.children.push(inst.clone());
        inst
    }

    /// Places `cell` so that its port `port` coincides with `target`,
    /// facing it (positions aligned, orientations opposed).
    pub fn connect(&mut self, cell: Arc<Component>, port: &str, target: &Port) -> Result<Instance> {
        let p = cell.port(port)?.clone();
        let rotation = wrap_angle(target.orientation + 180. - p.orientation);
        let rotated = Transformation::rotate(rotation).apply(p.center);
        let trans = Transformation {
            translation: Point::new(target.center.x - rotated.x, target.center.y - rotated.y),
            rotation,
            reflect_vert: false,
        };
        Ok(self.place(cell, trans))
    }

    pub fn add_port(&mut self, port: Port) -> &mut Self {
        self.ports.push(port);
        self
    }

    pub fn add_ports(&mut self, ports: impl IntoIterator<Item = Port>) -> &mut Self {
        self.ports.extend(ports);
        self
    }

    pub fn set_info(&mut self, key: impl Into<ArcStr>, value: f64) -> &mut Self {
        self.info.set(key, value);
        self
    }

    pub fn finish(self) -> Component {
        Component {
            name: self.name,
            shapes: self.shapes,
            children: self.children,
            ports: self.ports,
            info: self.info,
        }
    }
}
