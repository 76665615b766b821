//! Expansion of group operands into concrete, deduplicated derivations.
pub mod engine;
pub mod materialize;
pub mod permutations;

pub use engine::ExpansionEngine;
pub use materialize::{Materializer, ResolvedDerivation};
pub use permutations::{permutations, PermutedSignature};
