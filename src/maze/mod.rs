//! Maze subsystem.
//!
//! Generation, collision geometry and the minimap projection. A [`Maze`]
//! bundles the grid with the mesh derived from it; both are immutable until
//! the maze is regenerated.

pub mod grid;
pub mod generator;
pub mod mesh;
pub mod minimap;

pub use grid::{Grid, Kind, TilePos};
pub use generator::{generate, MazeGenerator, MAX_ROOMS_PER_SIDE};
pub use mesh::{CollisionMesh, Direction, Face, TileFaceIndex};
pub use minimap::{Bitmap, Minimap, Rgba};

use crate::core::hash::StateHash;
use crate::core::rng::DeterministicRng;
use crate::error::MazeError;

/// A generated grid plus its collision mesh.
#[derive(Clone, Debug)]
pub struct Maze {
    grid: Grid,
    mesh: CollisionMesh,
}

impl Maze {
    /// Generate a `width x height` room maze and build its mesh.
    pub fn generate(width: u32, height: u32, rng: &mut DeterministicRng) -> Result<Self, MazeError> {
        let grid = generator::generate(width, height, rng)?;
        Ok(Self::from_grid(grid))
    }

    /// Build the mesh for an existing grid.
    pub fn from_grid(grid: Grid) -> Self {
        let mesh = CollisionMesh::build(&grid);
        Self { grid, mesh }
    }

    /// The tile grid.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The collision mesh.
    #[inline]
    pub fn mesh(&self) -> &CollisionMesh {
        &self.mesh
    }

    /// Kind of tile `(x, y)`.
    pub fn tile_at(&self, x: i64, y: i64) -> Result<Kind, MazeError> {
        self.grid.tile_at(x, y)
    }

    /// Grid size in tiles.
    pub fn dimensions(&self) -> (usize, usize) {
        self.grid.dimensions()
    }

    /// Faces bordering tile `(x, y)`.
    pub fn faces_near(&self, x: i64, y: i64) -> Result<Vec<Face>, MazeError> {
        let indices = self.mesh.faces_near(x, y)?;
        Ok(indices
            .iter()
            .filter_map(|i| self.mesh.face(*i).copied())
            .collect())
    }

    /// The exit tile.
    pub fn exit_tile(&self) -> TilePos {
        self.grid.exit()
    }

    /// Grid fingerprint.
    pub fn fingerprint(&self) -> StateHash {
        self.grid.fingerprint()
    }
}
