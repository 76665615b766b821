//! Rule checking resolved derivations against the quantity they are declared on.
use crate::expansion::ResolvedDerivation;
use crate::store::{Classification, Dimension, QuantityType, ResultKind};
use crate::validation::error::ResolutionError;
use std::collections::BTreeMap;

/// Ensures the derivation produces what its target expects: the right kind,
/// and for vector targets at least one derivation of an accepted dimension.
pub(crate) fn validate_target(
    target: &QuantityType,
    classification: &Classification,
    kind: ResultKind,
    derivations: &[ResolvedDerivation],
    expression: &str,
) -> Result<(), ResolutionError> {
    let expression = expression.to_string();

    let Some(accepted) = classification.vector_dimensions() else {
        return match kind {
            ResultKind::Vector => Err(ResolutionError::UnexpectedlyResultsInVector { expression }),
            _ => Ok(()),
        };
    };

    if kind == ResultKind::Scalar {
        return Err(ResolutionError::UnexpectedlyResultsInScalar { expression });
    }

    let matched = derivations
        .iter()
        .filter_map(|d| d.dimension)
        .any(|dimension| accepted.contains(dimension));

    if matched {
        Ok(())
    } else {
        Err(ResolutionError::UnexpectedDimension { expression, target: target.clone() })
    }
}

/// Splits derivations into scalar results and vector results per dimension.
pub(crate) fn partition(
    derivations: Vec<ResolvedDerivation>,
) -> (Vec<ResolvedDerivation>, BTreeMap<Dimension, Vec<ResolvedDerivation>>) {
    let mut scalars = Vec::new();
    let mut vectors: BTreeMap<Dimension, Vec<ResolvedDerivation>> = BTreeMap::new();

    for derivation in derivations {
        match (derivation.kind, derivation.dimension) {
            (ResultKind::Vector, Some(dimension)) => vectors.entry(dimension).or_default().push(derivation),
            _ => scalars.push(derivation),
        }
    }

    (scalars, vectors)
}
