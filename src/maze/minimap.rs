//! Minimap Projector
//!
//! Maps tile kinds to an RGBA bitmap for an external display, and tracks
//! which tiles the observer has walked through.
//!
//! ```text
//!   texture (power-of-two, whole maze)      local view (32x32)
//!   +-----------------------------+         +----------+
//!   |##########                   |         |  ####    |
//!   |#E..#...#                    |   -->   |  #..@    |
//!   |#.#.#.#.#     (transparent   |         |  #.##    |
//!   |#...#..X#      padding)      |         +----------+
//!   |##########                   |      scrolls with the
//!   +-----------------------------+      last visited tile
//! ```
//!
//! Wall pixels are transparent and are never recolored by marks.

use std::collections::BTreeSet;

use glam::Vec2;
use tracing::debug;

use crate::maze::grid::{Grid, Kind, TilePos};

/// One RGBA pixel.
pub type Rgba = [u8; 4];

/// Solution overlay, when shown.
pub const PATH_COLOR: Rgba = [150, 150, 150, 255];
/// Walls (transparent).
pub const WALL_COLOR: Rgba = [0, 0, 0, 0];
/// Walkable floor.
pub const FLOOR_COLOR: Rgba = [255, 255, 255, 255];
/// Entrance room.
pub const ENTRANCE_COLOR: Rgba = [0, 200, 50, 255];
/// Exit room.
pub const EXIT_COLOR: Rgba = [0, 255, 255, 255];
/// Tiles the observer has left behind.
pub const EXPLORED_COLOR: Rgba = [110, 20, 20, 255];
/// Tile the observer is standing on.
pub const CURRENT_COLOR: Rgba = [255, 0, 0, 255];

/// Side length of the scrolling local view, in tiles.
pub const LOCAL_VIEW_SIZE: usize = 32;

/// Palette with the path overlay hidden (path draws as floor).
const DEFAULT_PALETTE: [Rgba; Kind::COUNT] = [
    WALL_COLOR,
    FLOOR_COLOR,
    ENTRANCE_COLOR,
    EXIT_COLOR,
    FLOOR_COLOR,
];

/// Row-major RGBA image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Bitmap {
    /// Bitmap filled with one color.
    pub fn filled(width: usize, height: usize, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at `(x, y)`, None outside the image.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Flattened `RGBA8` bytes for upload.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    fn put(&mut self, x: usize, y: usize, color: Rgba) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }
}

/// Minimap state for one maze.
#[derive(Clone, Debug)]
pub struct Minimap {
    palette: [Rgba; Kind::COUNT],
    grid_width: usize,
    grid_height: usize,
    texture: Bitmap,
    local: Bitmap,
    path_cells: Vec<TilePos>,
    /// First-entry order, one entry per tile
    visited: Vec<TilePos>,
    explored: BTreeSet<TilePos>,
    last_tile: TilePos,
    path_shown: bool,
    hidden: bool,
    needs_update: bool,
}

impl Minimap {
    /// Project a grid into a fresh minimap.
    pub fn project(grid: &Grid) -> Self {
        let mut minimap = Self {
            palette: DEFAULT_PALETTE,
            grid_width: 0,
            grid_height: 0,
            texture: Bitmap::filled(0, 0, WALL_COLOR),
            local: Bitmap::filled(LOCAL_VIEW_SIZE, LOCAL_VIEW_SIZE, WALL_COLOR),
            path_cells: Vec::new(),
            visited: Vec::new(),
            explored: BTreeSet::new(),
            last_tile: grid.entrance(),
            path_shown: false,
            hidden: false,
            needs_update: true,
        };
        minimap.reproject(grid);
        minimap
    }

    /// Re-project after the maze was regenerated.
    ///
    /// Visited marks are cleared; visibility and path overlay settings carry
    /// over.
    pub fn reset(&mut self, grid: &Grid) {
        self.reproject(grid);
    }

    fn reproject(&mut self, grid: &Grid) {
        let (width, height) = grid.dimensions();
        self.grid_width = width;
        self.grid_height = height;
        self.texture = Bitmap::filled(
            width.next_power_of_two(),
            height.next_power_of_two(),
            WALL_COLOR,
        );
        self.path_cells.clear();
        self.visited.clear();
        self.explored.clear();
        self.last_tile = grid.entrance();

        for (pos, kind) in grid.iter() {
            if kind == Kind::Path {
                self.path_cells.push(pos);
            }
            self.texture.put(pos.x, pos.y, self.palette[kind.index()]);
        }
        self.needs_update = true;
    }

    /// Record the observer's ground position.
    ///
    /// Returns true if the observer entered a new tile. Positions outside
    /// the grid are ignored.
    pub fn mark_visited(&mut self, position: Vec2) -> bool {
        let Some(tile) = self.tile_containing(position) else {
            return false;
        };
        if tile == self.last_tile {
            return false;
        }

        if self.explored.insert(tile) {
            self.visited.push(tile);
        }
        self.paint(self.last_tile, EXPLORED_COLOR);
        self.paint(tile, CURRENT_COLOR);
        self.last_tile = tile;
        self.needs_update = true;
        true
    }

    /// Show or hide the solution overlay. Returns the new state.
    pub fn toggle_path_overlay(&mut self) -> bool {
        self.path_shown = !self.path_shown;
        let color = if self.path_shown { PATH_COLOR } else { FLOOR_COLOR };
        self.palette[Kind::Path.index()] = color;

        for i in 0..self.path_cells.len() {
            self.paint(self.path_cells[i], color);
        }
        // Visited marks stay on top of the overlay
        for i in 0..self.visited.len() {
            self.paint(self.visited[i], EXPLORED_COLOR);
        }
        if !self.visited.is_empty() {
            self.paint(self.last_tile, CURRENT_COLOR);
        }

        debug!(shown = self.path_shown, cells = self.path_cells.len(), "path overlay toggled");
        self.needs_update = true;
        self.path_shown
    }

    /// Hide or show the minimap. Returns true if now visible.
    pub fn toggle_visibility(&mut self) -> bool {
        self.hidden = !self.hidden;
        debug!(visible = !self.hidden, "minimap toggled");
        !self.hidden
    }

    /// Whether the minimap should be drawn.
    #[inline]
    pub fn is_visible(&self) -> bool {
        !self.hidden
    }

    /// Whether the solution overlay is shown.
    #[inline]
    pub fn path_shown(&self) -> bool {
        self.path_shown
    }

    /// True when pixels changed since the local view was last taken.
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Whole-maze texture (power-of-two dimensions, transparent padding).
    pub fn texture(&self) -> &Bitmap {
        &self.texture
    }

    /// Distinct tiles entered since the last projection, in first-visit order.
    pub fn visited(&self) -> &[TilePos] {
        &self.visited
    }

    /// Tile the observer was last seen on.
    pub fn last_tile(&self) -> TilePos {
        self.last_tile
    }

    /// The 32x32 window following the last visited tile.
    ///
    /// The window is clamped to stay inside the maze; areas beyond the maze
    /// (small mazes) are transparent.
    pub fn local_view(&mut self) -> &Bitmap {
        if self.needs_update {
            let origin_x = window_origin(self.last_tile.x, self.grid_width);
            let origin_y = window_origin(self.last_tile.y, self.grid_height);

            for y in 0..LOCAL_VIEW_SIZE {
                for x in 0..LOCAL_VIEW_SIZE {
                    let (tx, ty) = (origin_x + x, origin_y + y);
                    let color = if tx < self.grid_width && ty < self.grid_height {
                        self.texture.get(tx, ty).unwrap_or(WALL_COLOR)
                    } else {
                        WALL_COLOR
                    };
                    self.local.put(x, y, color);
                }
            }
            self.needs_update = false;
        }
        &self.local
    }

    fn tile_containing(&self, position: Vec2) -> Option<TilePos> {
        let x = position.x.floor();
        let y = position.y.floor();
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.grid_width && y < self.grid_height).then_some(TilePos::new(x, y))
    }

    /// Paint a tile unless it is a transparent (wall) pixel.
    fn paint(&mut self, pos: TilePos, color: Rgba) {
        if self.texture.get(pos.x, pos.y).is_some_and(|c| c[3] != 0) {
            self.texture.put(pos.x, pos.y, color);
        }
    }
}

/// First tile of the local window along one axis.
#[inline]
fn window_origin(center: usize, extent: usize) -> usize {
    let max_origin = extent.saturating_sub(LOCAL_VIEW_SIZE);
    (center + 1).saturating_sub(LOCAL_VIEW_SIZE / 2).min(max_origin)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::DeterministicRng;
    use crate::maze::generator::generate;

    fn maze(width: u32, height: u32, seed: u64) -> Grid {
        generate(width, height, &mut DeterministicRng::new(seed)).unwrap()
    }

    #[test]
    fn test_projection_colors() {
        let grid = maze(5, 3, 7);
        let minimap = Minimap::project(&grid);
        let texture = minimap.texture();

        assert_eq!(texture.width(), 16);
        assert_eq!(texture.height(), 8);
        for (pos, kind) in grid.iter() {
            let expected = match kind {
                Kind::Wall => WALL_COLOR,
                Kind::Floor | Kind::Path => FLOOR_COLOR,
                Kind::Entrance => ENTRANCE_COLOR,
                Kind::Exit => EXIT_COLOR,
            };
            assert_eq!(texture.get(pos.x, pos.y), Some(expected), "{pos:?}");
        }
        // Padding beyond the maze is transparent
        assert_eq!(texture.get(15, 7), Some(WALL_COLOR));
        assert_eq!(texture.to_bytes().len(), 16 * 8 * 4);
    }

    #[test]
    fn test_mark_visited() {
        let grid = maze(3, 3, 11);
        let mut minimap = Minimap::project(&grid);

        // Spawn tile is the entrance: no change
        assert!(!minimap.mark_visited(Vec2::new(1.5, 1.5)));
        assert!(minimap.visited().is_empty());

        let next = grid
            .neighbors(grid.entrance(), 1)
            .find(|p| grid.is_open(*p))
            .unwrap();
        assert!(minimap.mark_visited(next.center()));
        assert!(!minimap.mark_visited(next.center() + Vec2::splat(0.2)));

        assert_eq!(minimap.visited(), &[next]);
        assert_eq!(minimap.last_tile(), next);
        assert_eq!(minimap.texture().get(1, 1), Some(EXPLORED_COLOR));
        assert_eq!(minimap.texture().get(next.x, next.y), Some(CURRENT_COLOR));
    }

    #[test]
    fn test_positions_outside_grid_ignored() {
        let grid = maze(2, 2, 3);
        let mut minimap = Minimap::project(&grid);
        let before = minimap.texture().clone();

        assert!(!minimap.mark_visited(Vec2::new(-0.5, 1.5)));
        assert!(!minimap.mark_visited(Vec2::new(1.5, 99.0)));
        assert!(!minimap.mark_visited(Vec2::new(f32::NAN, 1.5)));
        assert_eq!(minimap.texture(), &before);
    }

    #[test]
    fn test_walls_never_recolored() {
        let grid = maze(2, 2, 3);
        let mut minimap = Minimap::project(&grid);

        // Observer clipped into the corner wall with collision off
        assert!(minimap.mark_visited(Vec2::new(0.5, 0.5)));
        assert_eq!(minimap.texture().get(0, 0), Some(WALL_COLOR));
        assert_eq!(minimap.texture().get(1, 1), Some(EXPLORED_COLOR));
    }

    #[test]
    fn test_path_overlay_toggle() {
        let grid = maze(4, 4, 21);
        let mut minimap = Minimap::project(&grid);
        let path: Vec<TilePos> = grid
            .iter()
            .filter(|(_, k)| *k == Kind::Path)
            .map(|(p, _)| p)
            .collect();
        assert!(!path.is_empty());

        assert!(minimap.toggle_path_overlay());
        for p in &path {
            assert_eq!(minimap.texture().get(p.x, p.y), Some(PATH_COLOR));
        }

        // Visited marks are re-applied over the overlay
        minimap.mark_visited(path[0].center());
        minimap.mark_visited(grid.entrance().center());
        assert!(!minimap.toggle_path_overlay());
        assert!(minimap.toggle_path_overlay());
        assert_eq!(minimap.texture().get(path[0].x, path[0].y), Some(EXPLORED_COLOR));

        assert!(!minimap.toggle_path_overlay());
        let untouched = path.iter().find(|p| **p != path[0]).unwrap();
        assert_eq!(minimap.texture().get(untouched.x, untouched.y), Some(FLOOR_COLOR));
    }

    #[test]
    fn test_reset_keeps_settings() {
        let grid = maze(4, 4, 21);
        let mut minimap = Minimap::project(&grid);
        minimap.toggle_path_overlay();
        assert!(!minimap.toggle_visibility());
        minimap.mark_visited(Vec2::new(1.5, 2.5));

        let next = maze(4, 4, 22);
        minimap.reset(&next);
        assert!(minimap.visited().is_empty());
        assert!(!minimap.is_visible());
        assert!(minimap.path_shown());
        for (pos, kind) in next.iter().filter(|(_, k)| *k == Kind::Path) {
            assert_eq!(minimap.texture().get(pos.x, pos.y), Some(PATH_COLOR), "{kind:?}");
        }
    }

    #[test]
    fn test_local_view_small_maze() {
        let grid = maze(3, 3, 5);
        let mut minimap = Minimap::project(&grid);
        assert!(minimap.needs_update());

        let view = minimap.local_view().clone();
        assert!(!minimap.needs_update());
        assert_eq!((view.width(), view.height()), (LOCAL_VIEW_SIZE, LOCAL_VIEW_SIZE));
        assert_eq!(view.get(1, 1), Some(ENTRANCE_COLOR));
        assert_eq!(view.get(5, 5), Some(EXIT_COLOR));
        assert_eq!(view.get(20, 20), Some(WALL_COLOR));
    }

    #[test]
    fn test_local_view_scrolls() {
        assert_eq!(window_origin(1, 81), 0);
        assert_eq!(window_origin(40, 81), 25);
        assert_eq!(window_origin(79, 81), 49);
        assert_eq!(window_origin(79, 11), 0);

        let grid = maze(40, 40, 9);
        let mut minimap = Minimap::project(&grid);
        let exit = grid.exit();
        minimap.mark_visited(exit.center());

        let view = minimap.local_view();
        let origin = window_origin(exit.x, grid.width());
        assert_eq!(view.get(exit.x - origin, exit.y - origin), Some(CURRENT_COLOR));
    }

    #[test]
    fn test_revisits_recorded_once() {
        let grid = maze(3, 3, 11);
        let mut minimap = Minimap::project(&grid);
        let entrance = grid.entrance();
        let next = grid
            .neighbors(entrance, 1)
            .find(|p| grid.is_open(*p))
            .unwrap();

        for _ in 0..100 {
            assert!(minimap.mark_visited(next.center()));
            assert!(minimap.mark_visited(entrance.center()));
        }

        assert_eq!(minimap.visited(), &[next, entrance]);
        assert_eq!(minimap.last_tile(), entrance);
        assert_eq!(minimap.texture().get(next.x, next.y), Some(EXPLORED_COLOR));
        assert_eq!(minimap.texture().get(entrance.x, entrance.y), Some(CURRENT_COLOR));
    }
}
