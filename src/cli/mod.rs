use std::collections::BTreeMap;
use std::fs::canonicalize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use crate::blocks::array::resonator_array;
use crate::blocks::chip::{centered_chip, chip_title, CenteredChipParams};
use crate::blocks::cpw::{cpw_with_ports, CpwWithPortsParams};
use crate::cli::args::Args;
use crate::component::Component;
use crate::config::parse_chip_config;
use crate::pdk::Pdk;
use crate::Result;

pub mod args;

pub const BANNER: &str = r"
  ________  ________  ___       __   ________  _______   ________
 |\   ____\|\   __  \|\  \     |\  \|\   ____\|\  ___ \ |\   ___  \
 \ \  \___|\ \  \|\  \ \  \    \ \  \ \  \___|\ \   __/|\ \  \\ \  \
  \ \  \    \ \   ____\ \  \  __\ \  \ \  \  __\ \  \_|/_\ \  \\ \  \
   \ \  \____\ \  \___|\ \  \|\__\_\  \ \  \|\  \ \  \_|\ \ \  \\ \  \
    \ \_______\ \__\    \ \____________\ \_______\ \_______\ \__\\ \__\
     \|_______|\|__|     \|____________|\|_______|\|_______|\|__| \|__|

CPWGEN v0.1
";

#[derive(Debug, Serialize)]
struct CellReport {
    name: String,
    polygons: usize,
    bbox: Option<[f64; 4]>,
    info: BTreeMap<String, f64>,
}

fn report(component: &Component) -> CellReport {
    CellReport {
        name: component.name().to_string(),
        polygons: component
            .flatten()
            .iter()
            .map(|s| s.polygons.len())
            .sum(),
        bbox: component
            .bbox()
            .map(|b| [b.x0, b.y0, b.x1, b.y1]),
        info: component
            .info()
            .iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    }
}

fn save_report(path: &Path, cells: &[&Component]) -> Result<()> {
    let reports: Vec<CellReport> = cells.iter().map(|c| report(c)).collect();
    let json = serde_json::to_string_pretty(&reports)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    if args.list_cells {
        for name in Pdk::standard().names() {
            println!("{name}");
        }
        return Ok(());
    }

    let config_path = canonicalize(&args.config)?;

    println!("{BANNER}");

    println!("Reading configuration file...\n");
    let config = parse_chip_config(&config_path)?;

    println!("Configuration file: {:?}", &config_path);
    println!("Chip parameters:");
    println!("\tSize: {} x {} um", config.size.0, config.size.1);
    println!("\tFeedline length: {} um", config.feedline.length);
    println!("\tResonators: {}", config.array.bank.lengths.len());
    println!("\tTitle: {}", config.title.title);

    let line = Arc::new(cpw_with_ports(&CpwWithPortsParams {
        feedline: config.feedline.clone(),
        port: config.port.clone(),
    })?);
    let array = Arc::new(resonator_array(line, &config.array)?);
    let chip = centered_chip(
        Arc::clone(&array),
        &CenteredChipParams {
            size: config.size,
            negative: false,
        },
    )?;
    let title = chip_title(&config.title)?;

    let work_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from("build"));
    std::fs::create_dir_all(&work_dir)?;
    let work_dir = canonicalize(work_dir)?;

    save_report(&work_dir.join("report.json"), &[&chip, &array, &title])?;
    println!("Artifacts saved to: {:?}\n", &work_dir);

    Ok(())
}
