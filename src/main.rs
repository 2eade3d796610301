//! Split a terrain into tiles and scatter grass from a JSON config.
//!
//! Usage: cargo run --release -- --config split.json [--backend cpu|gpu]
//!        [--output positions.json] [--overlay gizmos.json]

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use terrasplit::compute::{ComputeDevice, CpuDevice, GpuDevice};
use terrasplit::core::{Error, Result};
use terrasplit::debug::{DebugOverlay, GizmoRecorder};
use terrasplit::splitter::{Backend, SplitResult, SplitterConfig, TerrainSplitter};

const USAGE: &str =
    "Usage: terrasplit --config <file.json> [--backend cpu|gpu] [--output <file.json>] [--overlay <file.json>]";

struct Args {
    config: PathBuf,
    backend: Option<Backend>,
    output: Option<PathBuf>,
    overlay: Option<PathBuf>,
}

impl Args {
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let value = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };

        let config = value("--config")
            .map(PathBuf::from)
            .ok_or_else(|| Error::Configuration(USAGE.into()))?;
        let backend = value("--backend").map(|b| b.parse::<Backend>()).transpose()?;

        Ok(Self {
            config,
            backend,
            output: value("--output").map(PathBuf::from),
            overlay: value("--overlay").map(PathBuf::from),
        })
    }
}

fn split_on<D: ComputeDevice>(config: &SplitterConfig, device: &D) -> Result<SplitResult> {
    let terrain = config
        .terrain
        .ok_or_else(|| Error::Configuration("terrain is not assigned".into()))?;
    let mut splitter = TerrainSplitter::new(config.settings()).with_terrain(&terrain);
    if let Some(camera) = config.camera_position {
        splitter = splitter.with_viewpoint(camera);
    }
    splitter.split(device)
}

fn run() -> Result<()> {
    let args = Args::parse()?;
    let mut config = SplitterConfig::load(&args.config)?;
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    config.validate()?;

    let start = Instant::now();
    let result = match config.backend {
        Backend::Cpu => split_on(&config, &CpuDevice::new())?,
        Backend::Gpu => split_on(&config, &GpuDevice::new_blocking()?)?,
    };

    let grid = result.tiles.grid();
    println!("=== Terrain split ({:?}) ===", config.backend);
    println!("Grid: {} x {} tiles of {}m", grid.columns(), grid.rows(), grid.tile_size());
    println!("Tile anchors: {}", result.tiles.positions().len());
    if let Some(grass) = &result.grass {
        println!(
            "Grass blades: {} slots, {} visible ({} per tile)",
            grass.len(),
            grass.visible_count(),
            grass.blades_per_tile()
        );
    }
    println!("Elapsed: {:.2?}", start.elapsed());

    if let Some(path) = &args.output {
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &result)?;
        log::info!("Wrote positions to {}", path.display());
    }

    if let Some(path) = &args.overlay {
        let mut recorder = GizmoRecorder::new();
        DebugOverlay::default().draw(Some(&result.tiles), result.grass.as_ref(), &mut recorder);
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), recorder.primitives())?;
        log::info!(
            "Wrote {} lines and {} spheres to {}",
            recorder.line_count(),
            recorder.sphere_count(),
            path.display()
        );
    }

    Ok(())
}

fn main() {
    terrasplit::core::logging::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
