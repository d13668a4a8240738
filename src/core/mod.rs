//! Core deterministic primitives.
//!
//! Seeded randomness and state hashing shared by the maze and world modules.

pub mod rng;
pub mod hash;

// Re-export core types
pub use rng::DeterministicRng;
pub use hash::{StateHash, StateHasher, compute_state_hash};
