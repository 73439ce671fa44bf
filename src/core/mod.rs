//! Core deterministic primitives.
//!
//! Everything the engine needs to be reproducible: a seedable RNG, a
//! state hasher and integer grid math.

pub mod rng;
pub mod hash;
pub mod position;

// Re-export core types
pub use rng::DeterministicRng;
pub use hash::{StateHash, compute_state_hash};
pub use position::{Direction, Offset, Position};
