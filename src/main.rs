use anyhow::{Context, Result};
use std::path::Path;
use std::time::{Duration, Instant};
use voxel_smoke::{SimConfig, Simulation, StepParams};

const FRAME: Duration = Duration::from_micros(16_667);
const DEFAULT_FRAMES: u64 = 240;
const INJECT_FRAMES: u64 = 60;
const REPORT_EVERY: u64 = 30;

#[derive(Clone, Copy, Debug)]
struct RunConfig {
    frames: u64,
    inject_frames: u64,
}

impl RunConfig {
    fn from_arg(arg: Option<String>) -> Result<Self> {
        let frames = match arg {
            Some(value) => value
                .parse()
                .with_context(|| format!("invalid frame count {value:?}"))?,
            None => DEFAULT_FRAMES,
        };
        Ok(Self {
            frames,
            inject_frames: INJECT_FRAMES.min(frames),
        })
    }
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => SimConfig::default(),
    };
    let run = RunConfig::from_arg(args.next())?;

    let mut sim = Simulation::new(config).context("building simulation")?;
    let dims = sim.grid().dims();
    let start = Instant::now();
    for frame in 0..run.frames {
        let params = StepParams::from_duration(FRAME, dims, frame < run.inject_frames);
        let report = sim.step(&params)?;
        if frame % REPORT_EVERY == 0 || frame + 1 == run.frames {
            let (min, max) = sim.density().min_max();
            log::info!(
                "frame {:>4}: density total {:.3} range [{:.3}, {:.3}], max speed {:.3}",
                report.tick,
                report.total_density,
                min,
                max,
                report.max_speed
            );
        }
    }
    let elapsed = start.elapsed();
    log::info!(
        "{} frames in {:.2?} ({:.2?} per frame)",
        run.frames,
        elapsed,
        elapsed / run.frames.max(1) as u32
    );
    Ok(())
}
