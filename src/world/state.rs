//! World State
//!
//! The top-level application object: one maze, the observer walking it, the
//! minimap and the exit fade, owned side by side. The presentation layer
//! holds a `World` and reads everything it draws through it.

use glam::Vec2;
use tracing::info;

use crate::config::WorldConfig;
use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::rng::{clock_seed, DeterministicRng};
use crate::error::{ConfigError, MazeError};
use crate::maze::generator::validate_dimensions;
use crate::maze::{Face, Kind, Maze, Minimap, TilePos};
use crate::observer::{ObserverController, ObserverPhase, ObserverPose};
use crate::world::fade::ExitFade;

/// Maze, observer, minimap and fade for one run.
#[derive(Clone, Debug)]
pub struct World {
    pub(crate) config: WorldConfig,
    seed: u64,
    pub(crate) rng: DeterministicRng,
    rooms: (u32, u32),
    pub(crate) maze: Maze,
    pub(crate) controller: ObserverController,
    pub(crate) minimap: Minimap,
    pub(crate) fade: ExitFade,
    pub(crate) tick: u32,
    pub(crate) generation: u32,
}

impl World {
    /// Validate the config, seed the RNG and generate the first maze.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(clock_seed);
        let mut rng = DeterministicRng::new(seed);
        let maze = Maze::generate(config.width, config.height, &mut rng)?;
        let minimap = Minimap::project(maze.grid());
        let controller = ObserverController::new(config.observer.clone());
        let fade = ExitFade::new(&config.fade);

        let (width, height) = maze.dimensions();
        info!(
            seed,
            width,
            height,
            fingerprint = %hex::encode(&maze.fingerprint()[..8]),
            "world created"
        );

        Ok(Self {
            rooms: (config.width, config.height),
            config,
            seed,
            rng,
            maze,
            controller,
            minimap,
            fade,
            tick: 0,
            generation: 0,
        })
    }

    /// Replace the maze with a fresh `width x height` one.
    ///
    /// The observer respawns and the minimap is re-projected. On error the
    /// current maze is kept.
    pub fn generate(&mut self, width: u32, height: u32) -> Result<(), MazeError> {
        validate_dimensions(width, height)?;
        let maze = Maze::generate(width, height, &mut self.rng)?;

        self.rooms = (width, height);
        self.maze = maze;
        self.controller.reset();
        self.minimap.reset(self.maze.grid());
        self.fade.fade_in();
        self.generation = self.generation.wrapping_add(1);

        let (grid_width, grid_height) = self.maze.dimensions();
        info!(
            generation = self.generation,
            width = grid_width,
            height = grid_height,
            fingerprint = %hex::encode(&self.maze.fingerprint()[..8]),
            "maze regenerated"
        );
        Ok(())
    }

    /// Regenerate a maze of the current size.
    pub fn reset(&mut self) -> Result<(), MazeError> {
        let (width, height) = self.rooms;
        self.generate(width, height)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Kind of tile `(x, y)`. Out-of-bounds queries are errors.
    pub fn tile_at(&self, x: i64, y: i64) -> Result<Kind, MazeError> {
        self.maze.tile_at(x, y)
    }

    /// Grid size in tiles.
    pub fn grid_dimensions(&self) -> (usize, usize) {
        self.maze.dimensions()
    }

    /// Faces bordering tile `(x, y)` from inside it.
    pub fn faces_near(&self, x: i64, y: i64) -> Result<Vec<Face>, MazeError> {
        self.maze.faces_near(x, y)
    }

    /// The exit tile.
    pub fn exit_tile(&self) -> TilePos {
        self.maze.exit_tile()
    }

    /// True once the observer has reached the exit of the current maze.
    pub fn reached_exit(&self) -> bool {
        self.controller.reached_exit()
    }

    /// Observer position and view transform.
    pub fn observer_pose(&self) -> ObserverPose {
        self.controller.pose()
    }

    /// Observer position on the ground plane.
    pub fn observer_position_2d(&self) -> Vec2 {
        self.controller.position_2d()
    }

    /// Current fade darkness (0 = clear, 1 = black).
    pub fn fade_level(&self) -> f32 {
        self.fade.fade_level()
    }

    /// The maze.
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// The observer controller.
    pub fn controller(&self) -> &ObserverController {
        &self.controller
    }

    /// The minimap.
    pub fn minimap(&self) -> &Minimap {
        &self.minimap
    }

    /// Mutable minimap, for refreshing the local view.
    pub fn minimap_mut(&mut self) -> &mut Minimap {
        &mut self.minimap
    }

    /// The exit fade.
    pub fn fade(&self) -> &ExitFade {
        &self.fade
    }

    /// Configuration in use.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Seed the world was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks simulated so far.
    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    /// Number of resets so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Hash of everything that affects future ticks.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.generation, |hasher| {
            hasher.update_bytes(&self.maze.fingerprint());
            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);

            let observer = self.controller.observer();
            hasher.update_vec3(observer.position());
            hasher.update_vec3(observer.look());
            hasher.update_bool(self.controller.collision_enabled());
            match *self.controller.phase() {
                ObserverPhase::Free => hasher.update_u8(0),
                ObserverPhase::Arrived { ticks, start, target } => {
                    hasher.update_u8(1);
                    hasher.update_u32(ticks);
                    hasher.update_vec2(start);
                    hasher.update_vec2(target);
                }
            }

            hasher.update_u8(self.fade.mode() as u8);
            hasher.update_u32(self.fade.elapsed());

            hasher.update_bool(self.minimap.is_visible());
            hasher.update_bool(self.minimap.path_shown());
            hasher.update_u32(self.minimap.visited().len() as u32);
            for tile in self.minimap.visited() {
                hasher.update_u32(tile.x as u32);
                hasher.update_u32(tile.y as u32);
            }
            let last = self.minimap.last_tile();
            hasher.update_u32(last.x as u32);
            hasher.update_u32(last.y as u32);
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
