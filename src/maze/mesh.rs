//! Collision Mesh
//!
//! Oriented wall faces derived from the grid, plus a tile-to-face lookup.
//!
//! A face is emitted on every boundary between a wall tile and an open
//! tile, with its normal pointing into the open tile. Faces live in a flat
//! arena; the index maps each tile to the faces bordering it from the
//! open side, so collision queries only touch the tiles around the observer.

use std::collections::BTreeSet;

use glam::{Vec2, Vec3};
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::error::MazeError;
use crate::maze::grid::{Grid, TilePos};

/// Direction a wall face is facing (the side its normal points to).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Normal +Y
    North = 0,
    /// Normal +X
    East = 1,
    /// Normal -Y
    South = 2,
    /// Normal -X
    West = 3,
}

impl Direction {
    /// Direction of a unit grid offset from a wall tile to its open neighbour.
    fn from_offset(dx: i32, dy: i32) -> Self {
        if dx > 0 {
            Direction::East
        } else if dy > 0 {
            Direction::North
        } else if dx < 0 {
            Direction::West
        } else {
            Direction::South
        }
    }

    /// Outward unit normal on the ground plane (z = 0).
    pub fn normal(self) -> Vec3 {
        match self {
            Direction::North => Vec3::Y,
            Direction::East => Vec3::X,
            Direction::South => Vec3::NEG_Y,
            Direction::West => Vec3::NEG_X,
        }
    }
}

/// One wall boundary segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Wall tile the face belongs to
    pub wall: TilePos,
    /// Open tile the face looks into
    pub open: TilePos,
    /// Segment endpoints at ground level
    pub points: [Vec3; 2],
    /// Unit normal pointing into `open`
    pub normal: Vec3,
    /// Facing
    pub direction: Direction,
}

impl Face {
    fn between(wall: TilePos, dx: i32, dy: i32) -> Self {
        let open = TilePos::new(
            (wall.x as i64 + dx as i64) as usize,
            (wall.y as i64 + dy as i64) as usize,
        );
        let sx = if dx > 0 { 1.0 } else { 0.0 };
        let sy = if dy > 0 { 1.0 } else { 0.0 };
        let start = Vec3::new(wall.x as f32 + sx, wall.y as f32 + sy, 0.0);
        let end = start + Vec3::new(dy.abs() as f32, dx.abs() as f32, 0.0);
        let direction = Direction::from_offset(dx, dy);

        Self {
            wall,
            open,
            points: [start, end],
            normal: direction.normal(),
            direction,
        }
    }

    /// Endpoints projected to the ground plane.
    #[inline]
    pub fn segment(&self) -> (Vec2, Vec2) {
        (self.points[0].truncate(), self.points[1].truncate())
    }

    /// Axis-aligned bounds of the projected segment.
    #[inline]
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let (a, b) = self.segment();
        (a.min(b), a.max(b))
    }

    /// Perpendicular distance from a point to the infinite line through
    /// the segment.
    pub fn line_distance(&self, point: Vec2) -> f32 {
        let (a, b) = self.segment();
        let along = b - a;
        let perp = Vec2::new(along.y, -along.x).normalize_or_zero();
        perp.dot(a - point).abs()
    }
}

/// Immutable multimap from tile to incident face indices.
///
/// Built once after all faces are known: `offsets[t]..offsets[t + 1]` is
/// the slice of `entries` belonging to tile `t` (row-major).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileFaceIndex {
    width: usize,
    height: usize,
    offsets: Vec<u32>,
    entries: Vec<u32>,
}

impl TileFaceIndex {
    fn build(width: usize, height: usize, faces: &[Face]) -> Self {
        let tiles = width * height;
        let mut offsets = vec![0u32; tiles + 1];

        // Count per tile, then prefix-sum into start offsets
        for face in faces {
            offsets[face.open.y * width + face.open.x + 1] += 1;
        }
        for t in 0..tiles {
            offsets[t + 1] += offsets[t];
        }

        let mut cursor: Vec<u32> = offsets[..tiles].to_vec();
        let mut entries = vec![0u32; faces.len()];
        for (index, face) in faces.iter().enumerate() {
            let slot = &mut cursor[face.open.y * width + face.open.x];
            entries[*slot as usize] = index as u32;
            *slot += 1;
        }

        Self { width, height, offsets, entries }
    }

    /// Face indices whose open side is `pos`. Empty outside the grid.
    pub fn faces_at(&self, pos: TilePos) -> &[u32] {
        if pos.x >= self.width || pos.y >= self.height {
            return &[];
        }
        let t = pos.y * self.width + pos.x;
        &self.entries[self.offsets[t] as usize..self.offsets[t + 1] as usize]
    }
}

/// Flat face arena plus its tile index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionMesh {
    faces: Vec<Face>,
    index: TileFaceIndex,
}

impl CollisionMesh {
    /// Derive faces from every wall tile of the grid.
    pub fn build(grid: &Grid) -> Self {
        let (width, height) = grid.dimensions();
        let mut faces = Vec::new();

        for x in 0..width {
            for y in 0..height {
                let wall = TilePos::new(x, y);
                if grid.is_open(wall) {
                    continue;
                }
                // -X, -Y, +X, +Y, bounds-checked before lookup
                if x > 0 {
                    push_face(grid, &mut faces, wall, -1, 0);
                }
                if y > 0 {
                    push_face(grid, &mut faces, wall, 0, -1);
                }
                if x + 1 < width {
                    push_face(grid, &mut faces, wall, 1, 0);
                }
                if y + 1 < height {
                    push_face(grid, &mut faces, wall, 0, 1);
                }
            }
        }

        let index = TileFaceIndex::build(width, height, &faces);
        debug!(faces = faces.len(), width, height, "collision mesh built");

        Self { faces, index }
    }

    /// All faces in emission order.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Face by index.
    #[inline]
    pub fn face(&self, index: u32) -> Option<&Face> {
        self.faces.get(index as usize)
    }

    /// The tile index.
    #[inline]
    pub fn index(&self) -> &TileFaceIndex {
        &self.index
    }

    /// Face indices bordering tile `(x, y)` from inside it.
    ///
    /// In-bounds tiles with no walls around them return an empty slice;
    /// out-of-bounds tiles are an error.
    pub fn faces_near(&self, x: i64, y: i64) -> Result<&[u32], MazeError> {
        let (width, height) = (self.index.width, self.index.height);
        if x < 0 || y < 0 || x as u64 >= width as u64 || y as u64 >= height as u64 {
            return Err(MazeError::TileOutOfBounds { x, y, width, height });
        }
        Ok(self.index.faces_at(TilePos::new(x as usize, y as usize)))
    }

    /// Unique face indices incident to the square of tiles within `radius`
    /// of `center`, clamped to the grid. Ordered by face index.
    pub fn faces_around(&self, center_x: i64, center_y: i64, radius: i64) -> BTreeSet<u32> {
        let mut found = BTreeSet::new();
        let (width, height) = (self.index.width as i64, self.index.height as i64);
        if width == 0 || height == 0 {
            return found;
        }

        let lower_x = (center_x - radius).max(0);
        let upper_x = (center_x + radius).min(width - 1);
        let lower_y = (center_y - radius).max(0);
        let upper_y = (center_y + radius).min(height - 1);

        for x in lower_x..=upper_x {
            for y in lower_y..=upper_y {
                let pos = TilePos::new(x as usize, y as usize);
                found.extend(self.index.faces_at(pos).iter().copied());
            }
        }
        found
    }
}

fn push_face(grid: &Grid, faces: &mut Vec<Face>, wall: TilePos, dx: i32, dy: i32) {
    let neighbor = TilePos::new(
        (wall.x as i64 + dx as i64) as usize,
        (wall.y as i64 + dy as i64) as usize,
    );
    if grid.is_open(neighbor) {
        faces.push(Face::between(wall, dx, dy));
    }
}

// =============================================================================
// TESTS
// =============================================================================
