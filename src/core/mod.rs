//! Core deterministic primitives.
//!
//! Seeded randomness for level layouts and state hashing for replay checks.

pub mod rng;
pub mod hash;

// Re-export core types
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash, StateHasher};
