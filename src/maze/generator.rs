//! Maze Generation
//!
//! Randomized iterative depth-first search over room cells, followed by
//! reconstruction of the unique entrance-to-exit route.
//!
//! ## Carving
//!
//! ```text
//!   # # # # #        # # # # #        # # # # #
//!   # E # . #        # E . . #        # E * * #
//!   # # # # #   ->   # # # . #   ->   # # # * #
//!   # . # X #        # . . X #        # . . X #
//!   # # # # #        # # # # #        # # # # #
//!    walled           carved          path (*)
//! ```
//!
//! Rooms sit two cells apart, so every time the search steps from one room
//! to the next it also carves the connector cell between them. The search
//! only enters rooms that are still walls, which makes the carved structure a
//! spanning tree over all rooms.

use std::collections::BTreeMap;
use tracing::debug;

use crate::core::rng::DeterministicRng;
use crate::error::MazeError;
use crate::maze::grid::{Grid, Kind, TilePos};

/// Largest supported number of rooms along either axis.
pub const MAX_ROOMS_PER_SIDE: u32 = 4096;

/// Check requested room counts before anything is allocated.
pub fn validate_dimensions(width: u32, height: u32) -> Result<(usize, usize), MazeError> {
    if width < 1 || height < 1 {
        return Err(MazeError::InvalidDimensions { width, height });
    }
    if width > MAX_ROOMS_PER_SIDE || height > MAX_ROOMS_PER_SIDE {
        return Err(MazeError::DimensionsTooLarge {
            width,
            height,
            max: MAX_ROOMS_PER_SIDE,
        });
    }
    Ok((width as usize, height as usize))
}

/// Generate a `width x height` room maze.
///
/// The grid shape depends only on the dimensions; the carving depends on the
/// RNG state.
pub fn generate(width: u32, height: u32, rng: &mut DeterministicRng) -> Result<Grid, MazeError> {
    let (rooms_x, rooms_y) = validate_dimensions(width, height)?;
    let mut grid = Grid::walled(rooms_x, rooms_y);

    let mut parent = carve(&mut grid, rng);
    mark_solution(&mut grid, &parent);
    parent.clear();

    debug!(
        width = grid.width(),
        height = grid.height(),
        path_cells = grid.count(Kind::Path),
        "maze carved"
    );

    Ok(grid)
}

/// Run the randomized DFS from the entrance.
///
/// Returns the parent map: for every room pushed onto the stack, the room it
/// was most recently reached from.
fn carve(grid: &mut Grid, rng: &mut DeterministicRng) -> BTreeMap<TilePos, TilePos> {
    let mut parent: BTreeMap<TilePos, TilePos> = BTreeMap::new();
    let mut consider: Vec<TilePos> = vec![grid.entrance()];
    let mut bucket: Vec<TilePos> = Vec::with_capacity(4);

    while let Some(top) = consider.pop() {
        let kind = match grid.get(top) {
            Some(kind @ (Kind::Wall | Kind::Entrance)) => kind,
            _ => continue,
        };

        if kind == Kind::Wall {
            if let Some(from) = parent.get(&top) {
                blend(grid, top, *from, Kind::Floor);
            }
            grid.set(top, Kind::Floor);
        }

        bucket.clear();
        bucket.extend(grid.neighbors(top, 2));
        while let Some(next) = rng.take_random(&mut bucket) {
            if matches!(grid.get(next), Some(Kind::Wall | Kind::Exit)) {
                parent.insert(next, top);
                consider.push(next);
            }
        }
    }

    parent
}

/// Overlay the unique exit-to-entrance route as `Kind::Path`.
fn mark_solution(grid: &mut Grid, parent: &BTreeMap<TilePos, TilePos>) {
    let entrance = grid.entrance();
    let exit = grid.exit();
    if exit == entrance {
        return;
    }

    let Some(mut current) = parent.get(&exit).copied() else {
        debug_assert!(false, "exit was never reached");
        return;
    };
    blend(grid, exit, current, Kind::Path);

    while current != entrance {
        let Some(from) = parent.get(&current).copied() else {
            debug_assert!(false, "room {current:?} has no parent");
            return;
        };
        grid.set(current, Kind::Path);
        blend(grid, current, from, Kind::Path);
        current = from;
    }
}

/// Set the connector cell between two rooms.
fn blend(grid: &mut Grid, a: TilePos, b: TilePos, kind: Kind) {
    match a.connector(b) {
        Some(mid) => grid.set(mid, kind),
        None => debug_assert!(false, "{a:?} and {b:?} are not adjacent rooms"),
    }
}

/// Stateful generator owning its RNG, so consecutive mazes differ.
#[derive(Clone, Debug)]
pub struct MazeGenerator {
    rng: DeterministicRng,
}

impl MazeGenerator {
    /// Generator with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self { rng: DeterministicRng::new(seed) }
    }

    /// Generator seeded from the wall clock.
    pub fn from_clock() -> Self {
        Self { rng: DeterministicRng::from_clock() }
    }

    /// Generate the next maze.
    pub fn generate(&mut self, width: u32, height: u32) -> Result<Grid, MazeError> {
        generate(width, height, &mut self.rng)
    }
}

// =============================================================================
// TESTS
// =============================================================================
