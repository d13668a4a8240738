//! Tile Grid
//!
//! The `(2W+1) x (2H+1)` cell array produced by maze generation.
//! Cells with both coordinates odd are rooms; the cells between them are
//! walls or carved corridors.

use glam::Vec2;
use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, StateHasher};
use crate::error::MazeError;

/// Tile kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Kind {
    /// Solid wall
    #[default]
    Wall = 0,
    /// Carved, walkable floor
    Floor = 1,
    /// Start room (always at (1, 1))
    Entrance = 2,
    /// Goal room (always at the far corner)
    Exit = 3,
    /// Floor on the unique entrance-to-exit route
    Path = 4,
}

impl Kind {
    /// Number of kinds, for ordinal-indexed tables.
    pub const COUNT: usize = 5;

    /// Ordinal index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// True for every kind the observer can stand on.
    #[inline]
    pub const fn is_open(self) -> bool {
        !matches!(self, Kind::Wall)
    }
}

/// Integer tile coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilePos {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
}

impl TilePos {
    /// Create a tile position.
    #[inline]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Room cells have both coordinates odd.
    #[inline]
    pub const fn is_room(self) -> bool {
        self.x % 2 == 1 && self.y % 2 == 1
    }

    /// The cell exactly between two rooms two units apart on one axis.
    ///
    /// Returns None if the rooms are not aligned two cells apart.
    pub fn connector(self, other: TilePos) -> Option<TilePos> {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        match (dx, dy) {
            (2, 0) => Some(TilePos::new((self.x + other.x) / 2, self.y)),
            (0, 2) => Some(TilePos::new(self.x, (self.y + other.y) / 2)),
            _ => None,
        }
    }

    /// World-space centre of the tile on the ground plane.
    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

/// Rectangular grid of tile kinds, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Kind>,
    entrance: TilePos,
    exit: TilePos,
}

impl Grid {
    /// All-wall grid sized for `rooms_x * rooms_y` rooms, with entrance and
    /// exit marked. Dimensions must already be validated.
    pub(crate) fn walled(rooms_x: usize, rooms_y: usize) -> Self {
        let width = rooms_x * 2 + 1;
        let height = rooms_y * 2 + 1;
        let entrance = TilePos::new(1, 1);
        let exit = TilePos::new(width - 2, height - 2);

        let mut grid = Self {
            width,
            height,
            cells: vec![Kind::Wall; width * height],
            entrance,
            exit,
        };
        grid.set(entrance, Kind::Entrance);
        grid.set(exit, Kind::Exit);
        grid
    }

    /// Width in tiles (`2W+1`).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles (`2H+1`).
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)` in tiles.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Entrance tile, always (1, 1).
    #[inline]
    pub fn entrance(&self) -> TilePos {
        self.entrance
    }

    /// Exit tile, always `(width-2, height-2)`.
    #[inline]
    pub fn exit(&self) -> TilePos {
        self.exit
    }

    /// Number of room cells (`W * H`).
    pub fn room_count(&self) -> usize {
        (self.width / 2) * (self.height / 2)
    }

    /// Check signed coordinates against the grid.
    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    /// Validate signed coordinates into a tile position.
    pub fn checked_pos(&self, x: i64, y: i64) -> Result<TilePos, MazeError> {
        if self.in_bounds(x, y) {
            Ok(TilePos::new(x as usize, y as usize))
        } else {
            Err(MazeError::TileOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Kind at signed coordinates. Out-of-bounds queries are errors.
    pub fn tile_at(&self, x: i64, y: i64) -> Result<Kind, MazeError> {
        let pos = self.checked_pos(x, y)?;
        Ok(self.cells[self.offset(pos)])
    }

    /// Kind at a tile position, None outside the grid.
    #[inline]
    pub fn get(&self, pos: TilePos) -> Option<Kind> {
        if pos.x < self.width && pos.y < self.height {
            Some(self.cells[self.offset(pos)])
        } else {
            None
        }
    }

    /// True if the tile exists and is not a wall.
    #[inline]
    pub fn is_open(&self, pos: TilePos) -> bool {
        self.get(pos).is_some_and(Kind::is_open)
    }

    pub(crate) fn set(&mut self, pos: TilePos, kind: Kind) {
        let offset = self.offset(pos);
        self.cells[offset] = kind;
    }

    #[inline]
    fn offset(&self, pos: TilePos) -> usize {
        pos.y * self.width + pos.x
    }

    /// In-bounds axis neighbours at the given step distance, in
    /// +X, +Y, -X, -Y order.
    pub fn neighbors(&self, pos: TilePos, step: usize) -> impl Iterator<Item = TilePos> + '_ {
        let candidates = [
            (pos.x.checked_add(step), Some(pos.y)),
            (Some(pos.x), pos.y.checked_add(step)),
            (pos.x.checked_sub(step), Some(pos.y)),
            (Some(pos.x), pos.y.checked_sub(step)),
        ];
        candidates.into_iter().filter_map(move |c| match c {
            (Some(x), Some(y)) if x < self.width && y < self.height => Some(TilePos::new(x, y)),
            _ => None,
        })
    }

    /// Iterate every tile in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TilePos, Kind)> + '_ {
        self.cells.iter().enumerate().map(move |(i, kind)| {
            (TilePos::new(i % self.width, i / self.width), *kind)
        })
    }

    /// Count tiles of a kind.
    pub fn count(&self, kind: Kind) -> usize {
        self.cells.iter().filter(|k| **k == kind).count()
    }

    /// Tile containing a ground-plane point (floor of each coordinate).
    ///
    /// Returns None for points outside the grid.
    pub fn tile_containing(&self, point: Vec2) -> Option<TilePos> {
        let x = point.x.floor();
        let y = point.y.floor();
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let (x, y) = (x as i64, y as i64);
        self.in_bounds(x, y).then(|| TilePos::new(x as usize, y as usize))
    }

    /// SHA-256 over dimensions and every tile kind.
    pub fn fingerprint(&self) -> StateHash {
        let mut hasher = StateHasher::for_grid();
        hasher.update_u32(self.width as u32);
        hasher.update_u32(self.height as u32);
        for kind in &self.cells {
            hasher.update_u8(*kind as u8);
        }
        hasher.finalize()
    }
}

// =============================================================================
// TESTS
// =============================================================================
