use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use descent_kernel::{DescentConfig, FixedStep, SimEvent, Simulation, TickTimer};
use descent_stream::SectionCatalog;
use glam::Vec2;
use tracing_subscriber::EnvFilter;

/// Catalog used when `--catalog` is not given.
const DEMO_CATALOG: &str = include_str!("../../../data/catalog.json");

#[derive(Parser)]
#[command(name = "descent-cli", about = "CLI tool for descent runtime operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default configuration
    Info,
    /// Run the simulation headless with a scripted climbing actor
    Run {
        /// YAML simulation config
        #[arg(long)]
        config: Option<PathBuf>,
        /// JSON section catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "1800")]
        ticks: u64,
        /// Override the config seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Fixed tick length in seconds
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
    },
    /// Check that a section catalog can always continue its chain
    Validate {
        /// JSON section catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// YAML config whose start tags are checked against the catalog
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = DescentConfig::default();
            println!("descent-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("stream: {}", descent_stream::crate_info());
            println!("camera: {}", descent_camera::crate_info());
            println!("min time scale: {}", descent_pacing::MIN_TIME_SCALE);
            println!("default config:\n{}", config.to_yaml_string()?);
        }
        Commands::Run {
            config,
            catalog,
            ticks,
            seed,
            dt,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(seed) = seed {
                config.seed = seed;
            }
            let catalog = load_catalog(catalog.as_deref())?;
            run(config, catalog, ticks, dt)?;
        }
        Commands::Validate { catalog, config } => {
            let config = load_config(config.as_deref())?;
            let catalog = load_catalog(catalog.as_deref())?;
            catalog.validate()?;
            if catalog.matching(&config.stream.start_tags).next().is_none() {
                anyhow::bail!(
                    "no template answers the start tags {:?}",
                    config.stream.start_tags
                );
            }
            println!("catalog OK: {} templates", catalog.len());
            for t in catalog.templates() {
                println!(
                    "  {:<16} height={:>7.1} tags={:?} -> {:?}",
                    t.name,
                    t.entry.y - t.exit.y,
                    t.tags,
                    t.continuations
                );
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DescentConfig> {
    Ok(match path {
        Some(path) => DescentConfig::load(path)?,
        None => DescentConfig::default(),
    })
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<SectionCatalog> {
    Ok(match path {
        Some(path) => SectionCatalog::load(path)?,
        None => SectionCatalog::from_json_str(DEMO_CATALOG)?,
    })
}

/// Climbs at a steady pace and rests for a moment every few seconds.
struct ClimbingActor {
    position: Vec2,
    speed: f32,
    clock: f32,
}

impl ClimbingActor {
    const CLIMB_TIME: f32 = 2.5;
    const REST_TIME: f32 = 0.75;

    fn new(position: Vec2) -> Self {
        Self {
            position,
            speed: 260.0,
            clock: 0.0,
        }
    }

    fn update(&mut self, dt: f32) {
        self.clock = (self.clock + dt) % (Self::CLIMB_TIME + Self::REST_TIME);
        if self.clock < Self::CLIMB_TIME {
            self.position.y -= self.speed * dt;
        }
    }
}

fn run(config: DescentConfig, catalog: SectionCatalog, ticks: u64, dt: f32) -> anyhow::Result<()> {
    println!("Headless run: seed={}, ticks={ticks}, dt={dt}", config.seed);

    let start = config.camera.center;
    let mut sim = Simulation::new(config, catalog)?;
    let mut actor = ClimbingActor::new(start);
    let mut stepper = FixedStep::new(f64::from(dt), 8);
    let mut timer = TickTimer::new(240);

    let (mut stitched, mut pruned, mut shifts) = (0usize, 0usize, 0usize);
    let mut engulfed = None;
    let mut frame = 0u64;

    'host: while sim.tick_count() < ticks {
        // Host frames jitter around the tick length; the stepper evens them out.
        let jitter = if frame % 3 == 0 { 1.6 } else { 0.7 };
        frame += 1;
        let steps = stepper.advance(f64::from(dt) * jitter);

        for _ in 0..steps {
            let scaled = sim.scaled(dt);
            actor.update(scaled);

            let tick_start = Instant::now();
            let mut actors = [actor.position];
            let report = sim.tick(scaled, &mut actors)?;
            actor.position = actors[0];
            timer.record(tick_start.elapsed());

            stitched += usize::from(report.stitched.is_some());
            pruned += report.pruned.len();
            shifts += usize::from(report.shift.is_some());

            for event in sim.drain_events() {
                match event {
                    SimEvent::HazardReleased => println!("tick {}: hazard released", report.tick),
                    SimEvent::PacingFinished { transition } => {
                        println!("tick {}: pacing reached {:?}", report.tick, transition.target)
                    }
                    _ => {}
                }
            }

            if sim.hazard().engulfs(actor.position.y) {
                engulfed = Some(report.tick);
                break 'host;
            }
            if sim.tick_count() >= ticks {
                break 'host;
            }
        }
    }

    println!("Ticks: {}", sim.tick_count());
    println!("Depth climbed: {:.1}", sim.depth());
    println!(
        "Sections: active={}, stitched={stitched}, pruned={pruned}, stitch failures={}",
        sim.streamer().len(),
        sim.streamer().stats().stitch_failures
    );
    println!("Origin shifts: {shifts}");
    println!(
        "Hazard: position={:.1}, speed={:.1}, distance to actor={:.1}",
        sim.hazard().position(),
        sim.hazard().speed(),
        sim.hazard_distance(actor.position.y)
    );
    println!("Time scale: {}", sim.pacing().scale());
    println!(
        "Tick time: avg={:?}, min={:?}, max={:?} (last {})",
        timer.average(),
        timer.min(),
        timer.max(),
        timer.count()
    );
    tracing::info!(ticks = sim.tick_count(), depth = sim.depth(), "headless run finished");
    match engulfed {
        Some(tick) => println!("Outcome: engulfed at tick {tick}"),
        None => println!("Outcome: survived"),
    }
    println!("State hash: {:#018x}", sim.state_hash());

    Ok(())
}
