use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use voxcast_blocks::OccupancyTable;
use voxcast_trace::camera::pinhole_rays;
use voxcast_trace::{Scheduler, TraceConfig};

mod scene;

use scene::Scene;

#[derive(Parser, Debug)]
#[command(name = "voxcast", about = "Trace pinhole camera rays through a voxel scene")]
struct Args {
    /// Blocks TOML (`[[blocks]]` entries with name, id, solid)
    #[arg(long)]
    blocks: PathBuf,
    /// Scene TOML: extents, `[[fill]]` boxes and `[camera]`
    #[arg(long)]
    scene: PathBuf,
    /// Optional trace config TOML; defaults apply when omitted
    #[arg(long)]
    trace: Option<PathBuf>,
    #[arg(long, default_value_t = 640)]
    width: usize,
    #[arg(long, default_value_t = 480)]
    height: usize,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let table = OccupancyTable::from_path(&args.blocks)?;
    let scene = Scene::from_path(&args.scene)?;
    let config = match &args.trace {
        Some(p) => TraceConfig::from_path(p)?,
        None => TraceConfig::default(),
    };

    let scheduler = Scheduler::new(config)?;
    let t0 = Instant::now();
    let grid = scene.build_grid(&table)?;
    let mask = scheduler.build_mask(&grid, &table)?;
    log::info!(
        "scene {:?}: {} solid cells, mask in {:.1}ms",
        grid.extents(),
        mask.occupied_count(),
        t0.elapsed().as_secs_f64() * 1000.0
    );

    let rays = pinhole_rays(scene.position(), &scene.inverse_view()?, args.width, args.height);
    let t1 = Instant::now();
    let out = scheduler.traverse(&rays, &grid, &mask)?;
    let mean = out
        .mean_hit_depth()
        .map_or_else(|| "n/a".to_string(), |d| format!("{d:.3}"));
    log::info!(
        "{}x{}: {} hit, {} escaped, {} unresolved, mean depth {}, {} round(s), {:.1}ms",
        args.width,
        args.height,
        out.counts.hit,
        out.counts.escaped,
        out.counts.unresolved,
        mean,
        out.rounds,
        t1.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
