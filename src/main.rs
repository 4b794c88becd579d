use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use argh::FromArgs;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use swarmsim::input::ScriptedInput;
use swarmsim::render::{PngRenderer, RenderError};
use swarmsim::{Frame, Renderer, Scenario, SimConfig, Simulation};

#[derive(FromArgs)]
/// run a swarm scenario headlessly
struct Args {
    /// one of: wander, coverage, avoidance, goal-seek, leader-chase, mixed
    #[argh(option, default = "Scenario::Mixed")]
    scenario: Scenario,

    /// number of ticks to simulate
    #[argh(option, default = "5000")]
    ticks: u64,

    /// rng seed, random when omitted
    #[argh(option)]
    seed: Option<u64>,

    /// path to a JSON config used instead of the scenario preset
    #[argh(option)]
    config: Option<PathBuf>,

    /// directory to write PNG frames into
    #[argh(option)]
    frames: Option<PathBuf>,

    /// only write every Nth frame
    #[argh(option, default = "1")]
    frame_every: u64,

    /// draw heading markers on agents
    #[argh(switch)]
    headings: bool,

    /// write the final frame as JSON to this path
    #[argh(option)]
    snapshot: Option<PathBuf>,

    /// enable debug logging
    #[argh(switch, short = 'v')]
    verbose: bool,
}

struct Progress {
    bar: ProgressBar,
    frames: Option<PngRenderer>,
}

impl Renderer for Progress {
    type Error = RenderError;

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        if let Some(frames) = self.frames.as_mut() {
            frames.present(frame)?;
        }
        self.bar.inc(1);
        Ok(())
    }
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => args.scenario.config(),
    };
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }
    Ok(config)
}

fn config_source(args: &Args) -> String {
    match &args.config {
        Some(path) => path.display().to_string(),
        None => format!("scenario {}", args.scenario),
    }
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(&args)?;
    let source = config_source(&args);
    let mut sim = Simulation::new(config).context("invalid simulation config")?;
    info!(config = %source, ticks = args.ticks, seed = sim.seed(), "starting run");

    let mut input = ScriptedInput::new(sim.config().world, sim.seed().wrapping_add(1));

    let frames = args
        .frames
        .as_ref()
        .map(|dir| PngRenderer::new(dir, args.frame_every).map(|r| r.with_headings(args.headings)))
        .transpose()?;

    let bar = ProgressBar::new(args.ticks);
    bar.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}/{eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
    )?);
    let mut progress = Progress { bar, frames };

    sim.run(args.ticks, &mut input, &mut progress)?;
    progress.bar.finish();

    if let Some(frames) = &progress.frames {
        info!(written = frames.frames_written(), "frames saved");
    }
    if let Some(grid) = sim.coverage() {
        let visited = grid.counts().iter().filter(|&&c| c > 0).count();
        info!(
            visited,
            cells = grid.counts().len(),
            cell_size = grid.cell_size(),
            max = grid.max_count(),
            "coverage"
        );
    }
    if let Some(path) = &args.snapshot {
        let file =
            File::create(path).with_context(|| format!("creating snapshot {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &sim.frame())
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}
