//! Defines the error types for resolving a derivation.
use crate::expression::ParseError;
use crate::store::QuantityType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The stable category of a resolution failure. Sinks filter on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    MalformedExpression,
    IncompatibleQuantities,
    DerivationUnexpectedlyResultsInScalar,
    DerivationUnexpectedlyResultsInVector,
    DerivationResultsInUnexpectedDimension,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The expression does not reduce to an operator tree over known placeholders.
    #[error("Malformed derivation expression '{expression}': {source}")]
    MalformedExpression {
        expression: String,
        #[source]
        source: ParseError,
    },
    /// The algebra rejects the operand kinds, or no dimension assignment survives.
    #[error("Derivation '{expression}' combines incompatible quantities")]
    IncompatibleQuantities { expression: String },
    #[error("Derivation '{expression}' results in a scalar, but the target is a vector")]
    UnexpectedlyResultsInScalar { expression: String },
    #[error("Derivation '{expression}' results in a vector, but the target is a scalar")]
    UnexpectedlyResultsInVector { expression: String },
    #[error("Derivation '{expression}' never results in a dimension of '{target}'")]
    UnexpectedDimension { expression: String, target: QuantityType },
}

impl ResolutionError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            ResolutionError::MalformedExpression { .. } => DiagnosticCode::MalformedExpression,
            ResolutionError::IncompatibleQuantities { .. } => DiagnosticCode::IncompatibleQuantities,
            ResolutionError::UnexpectedlyResultsInScalar { .. } => DiagnosticCode::DerivationUnexpectedlyResultsInScalar,
            ResolutionError::UnexpectedlyResultsInVector { .. } => DiagnosticCode::DerivationUnexpectedlyResultsInVector,
            ResolutionError::UnexpectedDimension { .. } => DiagnosticCode::DerivationResultsInUnexpectedDimension,
        }
    }

    pub fn expression(&self) -> &str {
        match self {
            ResolutionError::MalformedExpression { expression, .. }
            | ResolutionError::IncompatibleQuantities { expression }
            | ResolutionError::UnexpectedlyResultsInScalar { expression }
            | ResolutionError::UnexpectedlyResultsInVector { expression }
            | ResolutionError::UnexpectedDimension { expression, .. } => expression,
        }
    }
}
