//! # Labyrinth
//!
//! Procedural maze generation, wall collision geometry and a first-person
//! observer that walks the maze with sliding collision.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        LABYRINTH                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                 │
//! │  ├── rng.rs      - Seeded Xorshift128+ PRNG                 │
//! │  └── hash.rs     - SHA-256 fingerprints and state hashes    │
//! │                                                             │
//! │  maze/           - Maze subsystem                           │
//! │  ├── grid.rs     - Tile kinds and the (2W+1)x(2H+1) grid    │
//! │  ├── generator.rs- Randomized DFS carving + solution path   │
//! │  ├── mesh.rs     - Wall faces and tile -> face index        │
//! │  └── minimap.rs  - RGBA projection and visited marks        │
//! │                                                             │
//! │  observer/       - First-person observer                    │
//! │  ├── input.rs    - Control input and recordings             │
//! │  ├── state.rs    - Pose and Free/Arrived phase              │
//! │  ├── collision.rs- Sliding segment-vs-box resolution        │
//! │  └── controller.rs - Per-tick state machine                 │
//! │                                                             │
//! │  world/          - Application object                       │
//! │  ├── state.rs    - World (maze + observer + minimap + fade) │
//! │  ├── tick.rs     - Simulation step and replay               │
//! │  ├── fade.rs     - Exit fade sequencer                      │
//! │  └── events.rs   - Tick events                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frame Flow
//!
//! ```text
//!   ControlInput ──> ObserverController ──> collision::resolve ──> pose
//!                                              │                    │
//!                                  CollisionMesh::faces_around     ├──> renderer
//!                                                                  └──> Minimap
//! ```
//!
//! Everything is single-threaded and stepped once per rendered frame.
//! All randomness comes from a seeded [`DeterministicRng`], so a seed plus
//! an [`InputRecording`] reproduces a run exactly.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod config;
pub mod error;
pub mod maze;
pub mod observer;
pub mod world;

// Re-export commonly used types
pub use crate::core::rng::DeterministicRng;
pub use crate::core::hash::StateHash;
pub use config::{FadeConfig, ObserverConfig, WorldConfig};
pub use error::{ConfigError, MazeError};
pub use maze::{CollisionMesh, Direction, Face, Grid, Kind, Maze, MazeGenerator, Minimap, TilePos};
pub use observer::{ControlInput, InputRecording, ObserverController, ObserverPose};
pub use world::{tick, replay, TickResult, World, WorldEvent, WorldEventData};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
