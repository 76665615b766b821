// Derivation resolution core: parses derivation expressions over quantity
// placeholders, infers scalar/vector kinds and dimensions, and expands group
// operands into every concrete, verified derivation.

pub mod config;
pub mod diagnostics;
pub mod expansion;
pub mod expression;
pub mod operators;
pub mod resolver;
pub mod store;
pub mod type_system;
pub mod validation;

#[cfg(feature = "python")]
mod bindings {
    pub mod python;
}

pub use config::{ConfigError, ResolverConfig};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticsSink, SilentSink};
pub use expansion::ResolvedDerivation;
pub use operators::{OperatorDerivation, OperatorImplementation, OperatorPolicyError};
pub use resolver::{resolve, DerivationDefinition, DerivationResult, ResolutionFailure, Resolver};
pub use store::{Classification, Dimension, OperandClassifier, QuantityPopulation, QuantityType, ResultKind};
pub use validation::{DiagnosticCode, ResolutionError};
