//! The entry point: resolves one derivation declared on one target quantity.
use crate::config::ResolverConfig;
use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::expansion::{ExpansionEngine, Materializer, PermutedSignature, ResolvedDerivation};
use crate::expression::{parse, BinaryOp, Expr, OperandTable};
use crate::operators::{self, OperatorDerivation, OperatorImplementation, OperatorPolicyError};
use crate::store::{Dimension, OperandClassifier, QuantityType, ResultKind};
use crate::type_system::TypeChecker;
use crate::validation::rules::target;
use crate::validation::ResolutionError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// A derivation as declared: an expression over `signature`'s slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationDefinition {
    pub expression: String,
    pub signature: Vec<QuantityType>,
    #[serde(default)]
    pub operator_implementation: OperatorImplementation,
    #[serde(default)]
    pub permutations: bool,
}

impl DerivationDefinition {
    pub fn new(expression: impl Into<String>, signature: impl IntoIterator<Item = QuantityType>) -> Self {
        Self {
            expression: expression.into(),
            signature: signature.into_iter().collect(),
            operator_implementation: OperatorImplementation::None,
            permutations: false,
        }
    }

    pub fn with_operators(mut self, policy: OperatorImplementation) -> Self {
        self.operator_implementation = policy;
        self
    }

    pub fn with_permutations(mut self, permutations: bool) -> Self {
        self.permutations = permutations;
        self
    }

    /// Whether the expression uses a numeric constant anywhere other than a `1`
    /// as the dividend of a division. Advisory: resolution accepts `1` anywhere.
    ///
    /// Literals other than `1` are reported before parsing, since the parser
    /// rejects them.
    pub fn has_misplaced_constant(&self) -> Result<bool, ResolutionError> {
        if has_foreign_literal(&self.expression) {
            return Ok(true);
        }
        let expr = parse(&self.expression, self.signature.len()).map_err(|source| {
            ResolutionError::MalformedExpression { expression: self.expression.clone(), source }
        })?;
        Ok(misplaced_constant(&expr))
    }
}

/// Whether a digit run outside `{...}` is anything but `1`.
fn has_foreign_literal(expression: &str) -> bool {
    let mut in_placeholder = false;
    let mut literal = String::new();

    for c in expression.chars().chain(std::iter::once(' ')) {
        match c {
            '{' => in_placeholder = true,
            '}' => in_placeholder = false,
            d if d.is_ascii_digit() && !in_placeholder => {
                literal.push(d);
                continue;
            }
            _ => {}
        }
        if !literal.is_empty() {
            if literal != "1" {
                return true;
            }
            literal.clear();
        }
    }
    false
}

fn misplaced_constant(expr: &Expr) -> bool {
    match expr {
        Expr::Leaf(_) => false,
        Expr::Constant => true,
        Expr::Binary(BinaryOp::Div, lhs, rhs) if **lhs == Expr::Constant => misplaced_constant(rhs),
        Expr::Binary(_, lhs, rhs) => misplaced_constant(lhs) || misplaced_constant(rhs),
    }
}

/// Every resolved form of one derivation, split by result kind and dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationResult {
    pub definition: DerivationDefinition,
    pub scalar: Vec<ResolvedDerivation>,
    pub vector: BTreeMap<Dimension, Vec<ResolvedDerivation>>,
}

impl DerivationResult {
    /// All resolved derivations, scalars first, then vectors by ascending dimension.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedDerivation> {
        self.scalar.iter().chain(self.vector.values().flatten())
    }

    /// Each resolved derivation with the signatures it should be emitted for:
    /// its own, plus every distinct reordering when the definition asks for permutations.
    pub fn signatures(&self) -> impl Iterator<Item = (&ResolvedDerivation, Vec<PermutedSignature>)> + '_ {
        let permutations = self.definition.permutations;
        self.iter().map(move |derivation| (derivation, derivation.signatures(permutations)))
    }

    pub fn len(&self) -> usize {
        self.scalar.len() + self.vector.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A failed resolution: the error, and whatever the sink made of it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error}")]
pub struct ResolutionFailure {
    pub error: ResolutionError,
    pub diagnostic: Option<Diagnostic>,
}

/// Resolves derivations against one population of quantities.
pub struct Resolver<'a, C: OperandClassifier> {
    classifier: &'a C,
    config: &'a ResolverConfig,
}

impl<'a, C: OperandClassifier> Resolver<'a, C> {
    pub fn new(classifier: &'a C, config: &'a ResolverConfig) -> Self {
        Self { classifier, config }
    }

    /// Resolves `definition` declared on `target`, reporting any failure to `sink`.
    ///
    /// All-or-nothing: on failure no partial result is returned.
    pub fn resolve(
        &self,
        target: &QuantityType,
        definition: &DerivationDefinition,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<DerivationResult, ResolutionFailure> {
        debug!(quantity = %target, expression = %definition.expression, operands = definition.signature.len(), "resolving derivation");

        match self.try_resolve(target, definition) {
            Ok(result) => {
                debug!(quantity = %target, scalar = result.scalar.len(), vector = result.vector.len(), "derivation resolved");
                Ok(result)
            }
            Err(error) => {
                debug!(quantity = %target, code = ?error.code(), "derivation rejected");
                let diagnostic = sink.report(&error);
                Err(ResolutionFailure { error, diagnostic })
            }
        }
    }

    /// The operator overloads the definition's policy asks for, across every
    /// resolved form of `result`, in order and without duplicates.
    pub fn operator_derivations(
        &self,
        target: &QuantityType,
        result: &DerivationResult,
    ) -> Result<Vec<OperatorDerivation>, OperatorPolicyError> {
        let definition = &result.definition;
        operators::validate(definition)?;

        let mut seen = HashSet::new();
        let mut derivations = Vec::new();
        for resolved in result.iter() {
            for derivation in operators::search(target, resolved, definition.operator_implementation, self.classifier)? {
                if seen.insert(derivation.clone()) {
                    derivations.push(derivation);
                }
            }
        }
        Ok(derivations)
    }

    fn try_resolve(&self, target: &QuantityType, definition: &DerivationDefinition) -> Result<DerivationResult, ResolutionError> {
        let expression = &definition.expression;
        let expr = parse(expression, definition.signature.len())
            .map_err(|source| ResolutionError::MalformedExpression { expression: expression.clone(), source })?;

        let checker = TypeChecker::new(&expr);
        let mut operands = OperandTable::classify(&definition.signature, self.classifier);
        checker.reduce_choices(&mut operands);

        let kind = checker.kind(&operands);
        if kind == ResultKind::Invalid {
            return Err(ResolutionError::IncompatibleQuantities { expression: expression.clone() });
        }

        let resolved = ExpansionEngine::new(&checker).expand(&operands);
        let derivations = Materializer::new(&checker, self.config).materialize_all(&resolved);
        if derivations.is_empty() {
            return Err(ResolutionError::IncompatibleQuantities { expression: expression.clone() });
        }

        let classification = self.classifier.classify(target);
        target::validate_target(target, &classification, kind, &derivations, expression)?;

        let (scalar, vector) = target::partition(derivations);
        Ok(DerivationResult { definition: definition.clone(), scalar, vector })
    }
}

/// Resolves `expression` over `signature` for `target` with the default configuration.
pub fn resolve(
    target: &QuantityType,
    expression: &str,
    signature: &[QuantityType],
    classifier: &impl OperandClassifier,
    sink: &mut dyn DiagnosticsSink,
) -> Result<DerivationResult, ResolutionFailure> {
    let config = ResolverConfig::default();
    let definition = DerivationDefinition::new(expression, signature.iter().cloned());
    Resolver::new(classifier, &config).resolve(target, &definition, sink)
}
