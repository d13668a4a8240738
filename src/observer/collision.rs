//! Collision Resolution
//!
//! Sliding collision of the observer against nearby wall faces.
//!
//! The observer is an axis-aligned square of half-extent `clearance`
//! centred on the proposed position. Each face whose bounds overlap that
//! square pushes the proposed displacement back out along its normal until
//! the proposed position sits exactly `clearance` from the wall line:
//!
//! ```text
//!            wall line
//!               |
//!   normal <----|            proposed  o---.
//!               |                          |  push along normal
//!               |<- clearance ->o <--------'
//!               |             resolved
//! ```
//!
//! Corrections from every overlapping face are summed in face-index order,
//! each face seeing the displacement as already corrected by the faces
//! before it. In a concave corner both walls push, which can over-correct
//! slightly on odd angles.

use glam::{Vec2, Vec3};

#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::config::ObserverConfig;
use crate::maze::mesh::{CollisionMesh, Face};

/// Resolve a proposed displacement from `position` against the mesh.
///
/// Returns the corrected displacement. Only the ground-plane components
/// are ever changed.
pub fn resolve(
    mesh: &CollisionMesh,
    position: Vec3,
    proposed: Vec3,
    config: &ObserverConfig,
) -> Vec3 {
    let current = position.truncate();
    let tile_x = current.x.floor() as i64;
    let tile_y = current.y.floor() as i64;
    let candidates = mesh.faces_around(tile_x, tile_y, config.query_radius as i64);

    let mut movement = proposed;
    for index in candidates {
        let Some(face) = mesh.face(index) else {
            continue;
        };

        let next = (position + movement).truncate();
        if !overlaps(next, config.clearance, face) {
            continue;
        }

        // Already flush against this wall: leave it alone
        let current_distance = face.line_distance(current);
        if current_distance < config.flush_epsilon {
            continue;
        }

        let depth = (face.line_distance(next) - config.clearance).abs();
        movement += face.normal * depth;

        #[cfg(feature = "debug-tracing")]
        trace!(face = index, ?face.direction, depth, "collision correction");
    }

    movement
}

/// Bounding-box overlap between the observer square and a face segment.
#[inline]
fn overlaps(center: Vec2, half_extent: f32, face: &Face) -> bool {
    let (face_min, face_max) = face.bounds();
    let min = center - Vec2::splat(half_extent);
    let max = center + Vec2::splat(half_extent);
    min.x <= face_max.x && max.x >= face_min.x && min.y <= face_max.y && max.y >= face_min.y
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::grid::{Grid, Kind, TilePos};

    /// Two rooms joined by a corridor along X.
    ///
    /// ```text
    ///   # # # # #
    ///   # E . X #
    ///   # # # # #
    /// ```
    fn corridor() -> CollisionMesh {
        let mut grid = Grid::walled(2, 1);
        grid.set(TilePos::new(2, 1), Kind::Path);
        CollisionMesh::build(&grid)
    }

    fn config() -> ObserverConfig {
        ObserverConfig::default()
    }

    #[test]
    fn test_free_movement_passes_through() {
        let mesh = corridor();
        let position = Vec3::new(1.5, 1.5, 1.7);
        let proposed = Vec3::new(0.025, 0.0, 0.0);
        assert_eq!(resolve(&mesh, position, proposed, &config()), proposed);
    }

    #[test]
    fn test_head_on_wall_stops_at_clearance() {
        let mesh = corridor();
        let position = Vec3::new(1.2, 1.5, 1.7);
        let proposed = Vec3::new(-0.2, 0.0, 0.0);

        let resolved = resolve(&mesh, position, proposed, &config());
        let landed = position + resolved;
        assert!((landed.x - 1.05).abs() < 1e-5, "landed at {landed}");
        assert_eq!(landed.y, 1.5);
        assert_eq!(landed.z, 1.7);
    }

    #[test]
    fn test_approach_from_outside_clearance() {
        let mesh = corridor();
        let mut position = Vec3::new(1.5, 1.5, 1.7);
        let step = Vec3::new(-0.025, 0.0, 0.0);

        for _ in 0..100 {
            position += resolve(&mesh, position, step, &config());
            assert!(position.x >= 1.05 - 1e-4, "penetrated: {position}");
        }
        assert!((position.x - 1.05).abs() < 1e-4);
    }

    #[test]
    fn test_flush_wall_is_skipped() {
        let mesh = corridor();
        // Already inside the flush epsilon of the west wall
        let position = Vec3::new(1.03, 1.5, 1.7);
        let proposed = Vec3::new(-0.01, 0.0, 0.0);
        assert_eq!(resolve(&mesh, position, proposed, &config()), proposed);
    }

    #[test]
    fn test_sliding_along_wall() {
        let mesh = corridor();
        // Moving diagonally into the north wall (y = 2) keeps the X motion
        let position = Vec3::new(2.5, 1.94, 1.7);
        let proposed = Vec3::new(0.02, 0.02, 0.0);

        let landed = position + resolve(&mesh, position, proposed, &config());
        assert!((landed.x - 2.52).abs() < 1e-5);
        assert!((landed.y - 1.95).abs() < 1e-5, "landed at {landed}");
    }

    #[test]
    fn test_corner_corrections_sum() {
        let mesh = corridor();
        // Into the south-west corner of the entrance room
        let position = Vec3::new(1.1, 1.1, 1.7);
        let proposed = Vec3::new(-0.08, -0.08, 0.0);

        let landed = position + resolve(&mesh, position, proposed, &config());
        assert!((landed.x - 1.05).abs() < 1e-5, "landed at {landed}");
        assert!((landed.y - 1.05).abs() < 1e-5, "landed at {landed}");
    }

    #[test]
    fn test_outside_grid_has_no_faces() {
        let mesh = corridor();
        let position = Vec3::new(-10.0, -10.0, 1.7);
        let proposed = Vec3::new(0.3, 0.0, 0.0);
        assert_eq!(resolve(&mesh, position, proposed, &config()), proposed);
    }
}
