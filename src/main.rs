//! Labyrinth demo driver
//!
//! Runs the simulation headless: an autopilot walks the solution path of
//! each maze, the world fades out and regenerates at the exit, and the run
//! is replayed from its input recording to verify determinism.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use labyrinth::{
    core::rng::clock_seed,
    maze::{minimap::EXPLORED_COLOR, Grid, Kind, TilePos},
    world::{replay, tick, World, WorldEventData},
    ControlInput, InputRecording, WorldConfig, TICK_RATE, VERSION,
};

/// Headless maze walker.
#[derive(Parser, Debug)]
#[command(name = "labyrinth", version, about = "Generate mazes and walk them headless")]
struct Cli {
    /// Rooms along X
    #[arg(long)]
    width: Option<u32>,

    /// Rooms along Y
    #[arg(long)]
    height: Option<u32>,

    /// Maze seed (defaults to a clock-derived seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to simulate
    #[arg(long, default_value_t = 3600)]
    ticks: u32,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let cli = Cli::parse();

    info!("Labyrinth v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let mut config = match &cli.config {
        Some(path) => WorldConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => WorldConfig::default(),
    };
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }
    // Pin the seed so the replay below regenerates the same mazes
    config.seed = Some(cli.seed.or(config.seed).unwrap_or_else(clock_seed));
    config.validate().context("invalid configuration")?;

    run(&config, cli.ticks)
}

/// Simulate, then verify the run by replaying its recording.
fn run(config: &WorldConfig, ticks: u32) -> anyhow::Result<()> {
    let mut world = World::new(config.clone()).context("failed to create world")?;
    let mut recording = InputRecording::new(world.seed());
    let mut pilot = Autopilot::default();

    info!("=== Walking {} ticks (seed {}) ===", ticks, world.seed());
    info!("Maze Fingerprint: {}", hex::encode(world.maze().fingerprint()));

    let mut total_events = 0;
    for t in 0..ticks {
        let mut input = pilot.next_input(&world);
        if t == 0 {
            // Show the solution overlay on the minimap
            input.set(ControlInput::TOGGLE_PATH, true);
        }
        recording.record(world.current_tick(), input);

        let result = tick(&mut world, &input);
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                WorldEventData::ExitReached { position } => {
                    info!("Tick {}: exit reached at ({:.2}, {:.2})", event.tick, position.x, position.y);
                }
                WorldEventData::MazeReset { generation, width, height } => {
                    info!(
                        "Tick {}: maze #{} ({}x{}) fingerprint {}",
                        event.tick,
                        generation,
                        width,
                        height,
                        hex::encode(world.maze().fingerprint())
                    );
                }
                _ => {}
            }
        }

        if t % (TICK_RATE * 10) == 0 {
            let pos = world.observer_position_2d();
            let explored = world
                .minimap_mut()
                .local_view()
                .pixels()
                .iter()
                .filter(|p| **p == EXPLORED_COLOR)
                .count();
            info!(
                "Tick {}: at ({:.2}, {:.2}), fade {:.2}, {} explored tiles in view",
                t,
                pos.x,
                pos.y,
                world.fade_level(),
                explored
            );
        }
    }

    info!("=== Run Results ===");
    let hash = world.compute_hash();
    info!("Mazes completed: {}", world.generation());
    info!("Total events: {}", total_events);
    info!("Input changes recorded: {}", recording.delta_count());
    info!("Final State Hash: {}", hex::encode(hash));

    info!("=== Verifying Determinism ===");
    let replayed = replay(config, &recording, ticks).context("replay failed")?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("determinism failure: replay hash differs");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}

/// Walks the solution overlay without turning (the observer faces +Y).
#[derive(Default)]
struct Autopilot {
    generation: Option<u32>,
    route: Vec<TilePos>,
    waypoint: usize,
}

impl Autopilot {
    fn next_input(&mut self, world: &World) -> ControlInput {
        if self.generation != Some(world.generation()) {
            self.generation = Some(world.generation());
            self.route = solution_route(world.maze().grid());
            self.waypoint = 0;
        }
        if world.reached_exit() {
            return ControlInput::new();
        }
        let Some(mut target) = self.route.get(self.waypoint).map(|t| t.center()) else {
            return ControlInput::new();
        };

        let here = world.observer_position_2d();
        if (target - here).length() < 0.03 && self.waypoint + 1 < self.route.len() {
            self.waypoint += 1;
            target = self.route[self.waypoint].center();
        }

        let delta = target - here;
        let mut input = ControlInput::new();
        input.set(ControlInput::FORWARD, delta.y > 0.01);
        input.set(ControlInput::BACK, delta.y < -0.01);
        input.set(ControlInput::STRAFE_RIGHT, delta.x > 0.01);
        input.set(ControlInput::STRAFE_LEFT, delta.x < -0.01);
        input
    }
}

/// Tiles from entrance to exit along the path overlay.
fn solution_route(grid: &Grid) -> Vec<TilePos> {
    let mut route = vec![grid.entrance()];
    let mut previous: Option<TilePos> = None;
    let mut current = grid.entrance();
    while current != grid.exit() {
        let next = grid.neighbors(current, 1).find(|n| {
            Some(*n) != previous && matches!(grid.get(*n), Some(Kind::Path | Kind::Exit))
        });
        let Some(next) = next else {
            break;
        };
        previous = Some(current);
        current = next;
        route.push(current);
    }
    route
}
