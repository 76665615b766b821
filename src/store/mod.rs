//! Quantity names, their classifications, and the population that classifies them.
pub mod registry;
pub mod types;

pub use registry::{GroupEntry, OperandClassifier, QuantityPopulation, VectorEntry};
pub use types::{Classification, Dimension, DimensionSet, QuantityType, ResultKind};
