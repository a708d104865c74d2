//! Core deterministic primitives.
//!
//! Grid vocabulary, the seeded RNG, and state fingerprinting. Nothing in
//! here knows about players, enemies, or pickups.

pub mod grid;
pub mod rng;
pub mod hash;

// Re-export core types
pub use grid::{Cell, Direction};
pub use rng::DeterministicRng;
pub use hash::{StateHash, StateHasher, compute_state_hash};
