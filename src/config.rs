use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::blocks::array::ResonatorArrayParams;
use crate::blocks::chip::ChipTitleParams;
use crate::blocks::cpw::{FeedlineParams, RfPortParams};
use crate::error::Result;

/// Chip-level job description, read from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipConfig {
    /// Chip outline in micrometers.
    pub size: (f64, f64),
    pub feedline: FeedlineParams,
    pub port: RfPortParams,
    pub array: ResonatorArrayParams,
    pub title: ChipTitleParams,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            size: (2e4, 2e4),
            feedline: FeedlineParams::default(),
            port: RfPortParams::default(),
            array: ResonatorArrayParams::default(),
            title: ChipTitleParams::default(),
        }
    }
}

pub fn parse_chip_config(path: impl AsRef<Path>) -> Result<ChipConfig> {
    let contents = fs::read_to_string(path)?;
    let data = toml::from_str(&contents)?;
    Ok(data)
}
