//! Named-cell registry.
//!
//! CAD frontends address cells by name with loosely-typed parameter maps.
//! The registry is an explicit value constructed at startup and passed by
//! reference to whoever needs it; cells whose inputs are other components
//! (array placement, chip centering) are not registered, since they cannot
//! be described by a parameter map alone.

use std::collections::BTreeMap;

use arcstr::ArcStr;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::blocks::chip::chip_title;
use crate::blocks::cpw::{cpw_with_ports, feedline, rf_port};
use crate::blocks::meander::meander_path;
use crate::blocks::resonator::resonator;
use crate::blocks::strips::{strip_with_pads, stripes_array};
use crate::blocks::termination::{termination_close, termination_open};
use crate::blocks::twpa::fingers_cell;
use crate::component::Component;
use crate::error::{CpwgenError, Result};

type CellFactory = Box<dyn Fn(Value) -> Result<Component> + Send + Sync>;

pub struct Pdk {
    cells: BTreeMap<ArcStr, CellFactory>,
}

impl Pdk {
    pub fn empty() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }

    /// The registry holding every parameter-only cell in this crate.
    pub fn standard() -> Self {
        let mut pdk = Self::empty();
        pdk.register("chip_title", chip_title);
        pdk.register("cpw_with_ports", cpw_with_ports);
        pdk.register("feedline", feedline);
        pdk.register("fingers_cell", fingers_cell);
        pdk.register("meander_path", meander_path);
        pdk.register("resonator", resonator);
        pdk.register("rf_port", rf_port);
        pdk.register("strip_with_pads", strip_with_pads);
        pdk.register("stripes_array", stripes_array);
        pdk.register("termination_close", termination_close);
        pdk.register("termination_open", termination_open);
        pdk
    }

    /// Registers a synthesis function under `name`. Parameters arrive as a
    /// JSON map; missing fields take the cell's defaults.
    pub fn register<P, F>(&mut self, name: impl Into<ArcStr>, f: F)
    where
        P: DeserializeOwned,
        F: Fn(&P) -> Result<Component> + Send + Sync + 'static,
    {
        self.cells.insert(
            name.into(),
            Box::new(move |value| {
                let params: P = serde_json::from_value(value)?;
                f(&params)
            }),
        );
    }

    pub fn names(&self) -> impl Iterator<Item = &ArcStr> {
        self.cells.keys()
    }

    pub fn generate(&self, name: &str, params: Value) -> Result<Component> {
        let factory = self
            .cells
            .get(name)
            .ok_or_else(|| CpwgenError::UnknownCell(ArcStr::from(name)))?;
        factory(params)
    }
}

impl Default for Pdk {
    fn default() -> Self {
        Self::standard()
    }
}
