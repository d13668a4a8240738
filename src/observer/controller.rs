//! Observer Controller
//!
//! Per-tick state machine driving the observer.
//!
//! ```text
//!            floor(pos) == exit
//!   +------+ ----------------> +---------+
//!   | Free |                   | Arrived |  glide to exit centre,
//!   +------+ <---------------- +---------+  rise and roll
//!                  reset()
//! ```
//!
//! ## Free tick
//!
//! 1. Rotate from pointer deltas and rotate keys, pitch clamped
//! 2. Propose a planar displacement from the movement keys
//! 3. Resolve it against nearby faces (when collision is on)
//! 4. Apply, rebuild the view transform
//! 5. Enter `Arrived` if the observer now stands on the exit tile
//!
//! The controller never regenerates the maze; whoever owns it decides when
//! to call [`ObserverController::reset`].

use glam::{Quat, Vec2, Vec3};
use tracing::{debug, info};

use crate::config::ObserverConfig;
use crate::maze::Maze;
use crate::observer::collision;
use crate::observer::input::ControlInput;
use crate::observer::state::{Observer, ObserverPhase, ObserverPose};

/// What happened during one controller tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// New collision state, if it was toggled this tick
    pub collision_toggled: Option<bool>,
    /// The exit tile was entered this tick
    pub reached_exit: bool,
    /// The arrival glide finished this tick
    pub arrival_complete: bool,
}

/// Owns the observer and advances it one tick at a time.
#[derive(Clone, Debug)]
pub struct ObserverController {
    config: ObserverConfig,
    observer: Observer,
    phase: ObserverPhase,
    collision: bool,
}

impl ObserverController {
    /// Controller with the observer at its spawn point.
    pub fn new(config: ObserverConfig) -> Self {
        let observer = Observer::spawn(&config);
        Self {
            config,
            observer,
            phase: ObserverPhase::Free,
            collision: true,
        }
    }

    /// Respawn the observer, re-enable collision and return to `Free`.
    pub fn reset(&mut self) {
        self.observer = Observer::spawn(&self.config);
        self.phase = ObserverPhase::Free;
        self.collision = true;
    }

    /// Advance one tick.
    pub fn advance(&mut self, input: &ControlInput, maze: &Maze) -> StepOutcome {
        match self.phase {
            ObserverPhase::Free => self.advance_free(input, maze),
            ObserverPhase::Arrived { .. } => self.advance_arrived(input),
        }
    }

    fn advance_free(&mut self, input: &ControlInput, maze: &Maze) -> StepOutcome {
        let mut outcome = StepOutcome::default();

        self.rotate(input);

        let mut movement = self.proposed_movement(input);
        if input.pressed(ControlInput::TOGGLE_COLLISION) {
            self.collision = !self.collision;
            outcome.collision_toggled = Some(self.collision);
            debug!(enabled = self.collision, "collision toggled");
        }
        if self.collision {
            movement = collision::resolve(maze.mesh(), self.observer.position, movement, &self.config);
        }

        self.observer.position += movement;
        self.observer.refresh_view();

        let grid = maze.grid();
        let here = self.observer.position_2d();
        if grid.tile_containing(here) == Some(grid.exit()) {
            self.phase = ObserverPhase::Arrived {
                ticks: 0,
                start: here,
                target: grid.exit().center(),
            };
            outcome.reached_exit = true;
            info!(x = here.x, y = here.y, "exit reached");
        }

        outcome
    }

    fn advance_arrived(&mut self, input: &ControlInput) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        let ObserverPhase::Arrived { ticks, start, target } = &mut self.phase else {
            return outcome;
        };

        let elapsed = *ticks;
        let duration = self.config.arrival_ticks.max(1);
        if elapsed < duration {
            let t = (elapsed + 1) as f32 / duration as f32;
            let glide = start.lerp(*target, t);
            self.observer.position.x = glide.x;
            self.observer.position.y = glide.y;
            outcome.arrival_complete = elapsed + 1 == duration;
        }

        // Roll and rise speed up the longer the observer stands here
        let roll = Quat::from_axis_angle(self.observer.up, elapsed as f32 * self.config.arrival_roll);
        self.observer.look = roll * self.observer.look;
        self.observer.position.z += elapsed as f32 * self.config.arrival_rise;
        *ticks = elapsed.saturating_add(1);

        self.rotate(input);
        self.observer.refresh_view();
        outcome
    }

    /// Apply yaw and pitch input.
    fn rotate(&mut self, input: &ControlInput) {
        let up = self.observer.up;

        if input.pressed(ControlInput::ROTATE_RIGHT) {
            self.yaw(-self.config.key_rotation);
        }
        if input.pressed(ControlInput::ROTATE_LEFT) {
            self.yaw(self.config.key_rotation);
        }
        if input.pointer_dx != 0.0 {
            self.yaw(-self.config.pointer_rotation * input.pointer_dx);
        }

        if input.pointer_dy != 0.0 {
            let look = self.observer.look;
            let Some(axis) = up.cross(look).try_normalize() else {
                return;
            };
            let horizontal = Vec3::new(look.x, look.y, 0.0).normalize_or_zero();
            let limit = self.config.pitch_limit;

            let proposed = Quat::from_axis_angle(axis, self.config.pointer_rotation * input.pointer_dy) * look;
            let elevation = proposed.dot(up);
            self.observer.look = if elevation.abs() < limit {
                proposed
            } else if elevation <= -limit {
                Quat::from_axis_angle(axis, limit.asin()) * horizontal
            } else {
                Quat::from_axis_angle(axis, -limit.asin()) * horizontal
            };
        }
    }

    #[inline]
    fn yaw(&mut self, angle: f32) {
        self.observer.look = Quat::from_axis_angle(self.observer.up, angle) * self.observer.look;
    }

    /// Planar displacement requested by the movement keys.
    ///
    /// Forward and strafe are each unit length times the speed; holding
    /// both adds them, so diagonal movement is faster.
    fn proposed_movement(&self, input: &ControlInput) -> Vec3 {
        let look = self.observer.look;
        let speed = self.config.move_speed;
        let forward = Vec3::new(look.x, look.y, 0.0).normalize_or_zero() * speed;
        let sideways = look.cross(self.observer.up).normalize_or_zero() * speed;

        let mut movement = Vec3::ZERO;
        if input.pressed(ControlInput::FORWARD) {
            movement += forward;
        }
        if input.pressed(ControlInput::BACK) {
            movement -= forward;
        }
        if input.pressed(ControlInput::STRAFE_LEFT) {
            movement -= sideways;
        }
        if input.pressed(ControlInput::STRAFE_RIGHT) {
            movement += sideways;
        }
        movement
    }

    /// The observer.
    #[inline]
    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Position and view transform.
    #[inline]
    pub fn pose(&self) -> ObserverPose {
        self.observer.pose()
    }

    /// Ground-plane position.
    #[inline]
    pub fn position_2d(&self) -> Vec2 {
        self.observer.position_2d()
    }

    /// Current state machine phase.
    #[inline]
    pub fn phase(&self) -> &ObserverPhase {
        &self.phase
    }

    /// Whether collision resolution is on.
    #[inline]
    pub fn collision_enabled(&self) -> bool {
        self.collision
    }

    /// True from the tick the exit was entered until reset.
    #[inline]
    pub fn reached_exit(&self) -> bool {
        self.phase.is_arrived()
    }

    /// True once the arrival glide has run its full duration.
    pub fn arrival_complete(&self) -> bool {
        match self.phase {
            ObserverPhase::Arrived { ticks, .. } => ticks >= self.config.arrival_ticks.max(1),
            ObserverPhase::Free => false,
        }
    }

    /// Tuning in use.
    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    /// Teleport the observer (tests only).
    #[cfg(test)]
    pub(crate) fn place(&mut self, ground: Vec2, look: Vec3) {
        self.observer.position = ground.extend(self.config.eye_height);
        self.observer.look = look.normalize();
        self.observer.refresh_view();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::DeterministicRng;
    use crate::maze::grid::{Grid, Kind, TilePos};

    fn maze(width: u32, height: u32, seed: u64) -> Maze {
        Maze::generate(width, height, &mut DeterministicRng::new(seed)).unwrap()
    }

    fn corridor() -> Maze {
        let mut grid = Grid::walled(2, 1);
        grid.set(TilePos::new(2, 1), Kind::Path);
        Maze::from_grid(grid)
    }

    fn forward() -> ControlInput {
        ControlInput::with_buttons(ControlInput::FORWARD)
    }

    #[test]
    fn test_initial_state() {
        let controller = ObserverController::new(ObserverConfig::default());
        assert!(controller.collision_enabled());
        assert!(!controller.reached_exit());
        assert_eq!(controller.pose().position, Vec3::new(1.5, 1.5, 1.7));
        assert_eq!(controller.observer().look(), Vec3::Y);
    }

    #[test]
    fn test_walk_into_west_wall_converges() {
        let maze = maze(3, 3, 17);
        let mut controller = ObserverController::new(ObserverConfig::default());
        controller.place(Vec2::new(1.5, 1.5), Vec3::NEG_X);

        for _ in 0..100 {
            controller.advance(&forward(), &maze);
            let p = controller.position_2d();
            assert!(p.x >= 1.05 - 1e-4, "penetrated the wall: {p}");
            assert_eq!(p.y, 1.5);
        }
        assert!((controller.position_2d().x - 1.05).abs() < 1e-4);
        assert!(!controller.reached_exit());
    }

    #[test]
    fn test_walk_into_corner_converges() {
        let maze = maze(3, 3, 17);
        let mut controller = ObserverController::new(ObserverConfig::default());
        controller.place(Vec2::new(1.5, 1.5), Vec3::new(-1.0, -1.0, 0.0));

        for _ in 0..100 {
            controller.advance(&forward(), &maze);
        }
        let p = controller.position_2d();
        assert!((p.x - 1.05).abs() < 1e-4, "{p}");
        assert!((p.y - 1.05).abs() < 1e-4, "{p}");
    }

    #[test]
    fn test_collision_toggle_lets_observer_through() {
        let maze = corridor();
        let mut controller = ObserverController::new(ObserverConfig::default());
        controller.place(Vec2::new(1.5, 1.5), Vec3::NEG_X);

        let toggle = forward().with(ControlInput::TOGGLE_COLLISION);
        let outcome = controller.advance(&toggle, &maze);
        assert_eq!(outcome.collision_toggled, Some(false));
        assert!(!controller.collision_enabled());

        for _ in 0..40 {
            controller.advance(&forward(), &maze);
        }
        assert!(controller.position_2d().x < 1.0);
    }

    #[test]
    fn test_rotation_keys() {
        let maze = corridor();
        let mut controller = ObserverController::new(ObserverConfig::default());
        let left = ControlInput::with_buttons(ControlInput::ROTATE_LEFT);

        controller.advance(&left, &maze);
        let look = controller.observer().look();
        // Turning left from +Y swings toward -X
        assert!(look.x < 0.0);
        assert!((look.length() - 1.0).abs() < 1e-5);
        assert!((look.x + 0.03f32.sin()).abs() < 1e-5);

        let right = ControlInput::with_buttons(ControlInput::ROTATE_RIGHT);
        controller.advance(&right, &maze);
        assert!((controller.observer().look() - Vec3::Y).length() < 1e-5);

        // Both keys cancel
        controller.advance(&left.with(ControlInput::ROTATE_RIGHT), &maze);
        assert!((controller.observer().look() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let maze = corridor();
        let mut controller = ObserverController::new(ObserverConfig::default());

        // Far more pointer motion than the limit allows
        for _ in 0..50 {
            controller.advance(&ControlInput::with_pointer(0.0, 500.0), &maze);
            let look = controller.observer().look();
            assert!(look.dot(Vec3::Z).abs() <= 0.9 + 1e-4, "{look}");
        }
        let down = controller.observer().look();
        assert!((down.z + 0.9).abs() < 1e-4);
        assert!(down.y > 0.0);

        for _ in 0..50 {
            controller.advance(&ControlInput::with_pointer(0.0, -500.0), &maze);
        }
        let up = controller.observer().look();
        assert!((up.z - 0.9).abs() < 1e-4);
        assert!(up.y > 0.0);
    }

    #[test]
    fn test_pitch_does_not_change_speed() {
        let maze = corridor();
        let mut controller = ObserverController::new(ObserverConfig::default());
        controller.place(Vec2::new(1.5, 1.5), Vec3::X);
        controller.advance(&ControlInput::with_pointer(0.0, 400.0), &maze);

        let before = controller.position_2d();
        controller.advance(&forward(), &maze);
        let step = controller.position_2d() - before;
        assert!((step.length() - 0.025).abs() < 1e-5);
    }

    #[test]
    fn test_strafe_and_diagonal_speed() {
        let maze = corridor();
        let mut controller = ObserverController::new(ObserverConfig::default());
        controller.place(Vec2::new(2.5, 1.5), Vec3::X);

        let right = ControlInput::with_buttons(ControlInput::STRAFE_RIGHT);
        controller.advance(&right, &maze);
        // Facing +X, right is -Y
        let p = controller.position_2d();
        assert!((p - Vec2::new(2.5, 1.475)).length() < 1e-5, "{p}");

        controller.place(Vec2::new(2.5, 1.5), Vec3::X);
        controller.advance(&forward().with(ControlInput::STRAFE_LEFT), &maze);
        let step = controller.position_2d() - Vec2::new(2.5, 1.5);
        assert!((step.length() - 0.025 * 2f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_reaching_exit_and_arrival() {
        let maze = corridor();
        let config = ObserverConfig::default();
        let mut controller = ObserverController::new(config.clone());
        controller.place(Vec2::new(2.96, 1.5), Vec3::X);

        let outcome = controller.advance(&forward(), &maze);
        assert!(!outcome.reached_exit);
        let outcome = controller.advance(&forward(), &maze);
        assert!(outcome.reached_exit);
        assert!(controller.reached_exit());
        assert!(!controller.arrival_complete());

        // Movement and the collision toggle are ignored from now on
        let mut completions = 0;
        for _ in 0..config.arrival_ticks + 30 {
            let outcome = controller.advance(&forward().with(ControlInput::TOGGLE_COLLISION), &maze);
            assert_eq!(outcome.collision_toggled, None);
            assert!(!outcome.reached_exit);
            if outcome.arrival_complete {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert!(controller.arrival_complete());
        assert!(controller.collision_enabled());

        let p = controller.pose().position;
        assert!((p.truncate() - Vec2::new(3.5, 1.5)).length() < 1e-5);
        assert!(p.z > config.eye_height);
    }

    #[test]
    fn test_rotation_still_applies_after_arrival() {
        let maze = corridor();
        let mut controller = ObserverController::new(ObserverConfig::default());
        controller.place(Vec2::new(3.2, 1.5), Vec3::X);
        assert!(controller.advance(&ControlInput::new(), &maze).reached_exit);

        let before = controller.observer().look();
        controller.advance(&ControlInput::with_buttons(ControlInput::ROTATE_LEFT), &maze);
        let after = controller.observer().look();
        // First arrival tick has no roll, so the change is the key turn alone
        assert!((before.angle_between(after) - 0.03).abs() < 1e-4);
    }

    #[test]
    fn test_reset() {
        let maze = corridor();
        let mut controller = ObserverController::new(ObserverConfig::default());
        controller.place(Vec2::new(3.2, 1.5), Vec3::X);
        controller.advance(&ControlInput::with_buttons(ControlInput::TOGGLE_COLLISION), &maze);
        assert!(controller.reached_exit());
        assert!(!controller.collision_enabled());

        controller.reset();
        assert!(!controller.reached_exit());
        assert!(controller.collision_enabled());
        assert_eq!(controller.pose().position, Vec3::new(1.5, 1.5, 1.7));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// Every held movement and rotation key, but never the collision toggle.
        const HELD: u16 = ControlInput::FORWARD
            | ControlInput::BACK
            | ControlInput::STRAFE_LEFT
            | ControlInput::STRAFE_RIGHT
            | ControlInput::ROTATE_LEFT
            | ControlInput::ROTATE_RIGHT;

        fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
            let ab = b - a;
            let t = ((p - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
            (p - (a + ab * t)).length()
        }

        fn held_input() -> impl Strategy<Value = (ControlInput, u32)> {
            (any::<u16>(), -40.0f32..40.0, -40.0f32..40.0, 1u32..30).prop_map(
                |(buttons, dx, dy, hold)| {
                    let input = ControlInput {
                        buttons: buttons & HELD,
                        pointer_dx: dx,
                        pointer_dy: dy,
                    };
                    (input, hold)
                },
            )
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// Property: with collision on, no input sequence brings the
            /// observer closer than the clearance radius to any wall face
            #[test]
            fn prop_clearance_holds(
                width in 1u32..6,
                height in 1u32..6,
                seed in any::<u64>(),
                inputs in prop::collection::vec(held_input(), 1..40),
            ) {
                let maze = maze(width, height, seed);
                let config = ObserverConfig::default();
                let min = config.clearance - 1e-4;
                let mut controller = ObserverController::new(config);

                for (input, hold) in inputs {
                    for _ in 0..hold {
                        controller.advance(&input, &maze);
                        let p = controller.position_2d();
                        for face in maze.mesh().faces() {
                            let (a, b) = face.segment();
                            let d = segment_distance(p, a, b);
                            prop_assert!(d >= min, "{p} is {d} from {:?}", face.wall);
                        }
                    }
                }
            }
        }
    }
}
